//! Owner-keyed subscription disposer
//!
//! Tracks every cancelable handle a logical owner (a UI element, a request
//! scope) has acquired, and cancels them all when the owner goes away.
//! Cancellation within an owner runs in reverse-registration order so
//! acquire/release stay symmetric; a failing cancel function is logged and
//! never blocks the teardown of its siblings.

use std::sync::Mutex;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::Result;

type CancelFn = Box<dyn FnOnce() -> Result<()> + Send>;

/// A cancelable handle tracked by the [`Disposer`]
///
/// Wraps a one-shot cancel function with an optional diagnostic label so
/// swallowed failures stay attributable in logs.
pub struct DisposerHandle {
    label: Option<String>,
    cancel: CancelFn,
}

impl DisposerHandle {
    /// Create a handle from a cancel function
    pub fn new(cancel: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        Self {
            label: None,
            cancel: Box::new(cancel),
        }
    }

    /// Create a labeled handle
    pub fn named(label: impl Into<String>, cancel: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        Self {
            label: Some(label.into()),
            cancel: Box::new(cancel),
        }
    }

    /// Diagnostic label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn run_cancel(self) -> Result<()> {
        (self.cancel)()
    }
}

impl std::fmt::Debug for DisposerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposerHandle")
            .field("label", &self.label)
            .finish()
    }
}

/// Keyed registry of cancelable handles with ordered bulk teardown
///
/// Owners are plain strings chosen by the caller; the only convention is
/// that the same string is used for [`add`](Disposer::add) and
/// [`dispose_owner`](Disposer::dispose_owner). An owner may hold any number
/// of handles, and a disposed owner may start a fresh handle set by simply
/// adding again.
#[derive(Default)]
pub struct Disposer {
    // Vec per owner keeps registration order; the set is only locked for
    // mutation, never while a cancel function runs.
    owners: DashMap<String, Mutex<Vec<DisposerHandle>>>,
}

impl Disposer {
    /// Create an empty disposer
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a handle under an owner key
    pub fn add(&self, owner: impl Into<String>, handle: impl Into<DisposerHandle>) {
        let owner = owner.into();
        let handle = handle.into();
        self.owners
            .entry(owner)
            .or_default()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(handle);
    }

    /// Cancel and remove every handle under an owner
    ///
    /// Handles are canceled in reverse-registration order. A cancel failure
    /// is logged and the remaining siblings are still canceled.
    pub fn dispose_owner(&self, owner: &str) {
        let Some((_, handles)) = self.owners.remove(owner) else {
            return;
        };
        let handles = handles
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(owner, count = handles.len(), "disposing owner handles");
        for handle in handles.into_iter().rev() {
            let label = handle.label.clone();
            if let Err(err) = handle.run_cancel() {
                warn!(
                    owner,
                    handle = label.as_deref().unwrap_or("<unnamed>"),
                    error = %err,
                    "cancel failed during owner disposal"
                );
            }
        }
    }

    /// Dispose every owner
    ///
    /// Order across owners is unspecified; within an owner, cancellation is
    /// reverse-registration order as in [`dispose_owner`](Disposer::dispose_owner).
    pub fn dispose_all(&self) {
        let owners: Vec<String> = self.owners.iter().map(|e| e.key().clone()).collect();
        for owner in owners {
            self.dispose_owner(&owner);
        }
    }

    /// Number of handles currently tracked under an owner
    pub fn handle_count(&self, owner: &str) -> usize {
        self.owners
            .get(owner)
            .map(|handles| {
                handles
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .len()
            })
            .unwrap_or(0)
    }

    /// Number of owners with at least one tracked handle
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("owners", &self.owners.len())
            .finish()
    }
}
