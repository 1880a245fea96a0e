//! Scoped provider view
//!
//! The per-element facade over the runtime: one UI element (or request
//! scope) gets a child registry for its transient components and an owner
//! key under which every subscription it starts is tracked. Destroying the
//! element releases subscriptions first, then the child registry, so
//! nothing the element acquired can outlive it.

use std::sync::Arc;

use tracing::debug;

use tether_reactive::{Disposer, DisposerHandle};
use tether_registry::{Registry, Result};

/// A child registry bound to a disposer owner key
///
/// Thin by design: the view owns the child registry reference, the owner
/// key, and a disposer - nothing else. Component state lives in the
/// registries; subscription state lives in the disposer.
pub struct ScopedProvider {
    owner: String,
    registry: Arc<Registry>,
    disposer: Arc<Disposer>,
    disposed: bool,
}

impl ScopedProvider {
    /// Create a scope over `parent` with its own private disposer
    pub fn new(owner: impl Into<String>, parent: &Arc<Registry>) -> Self {
        Self::with_disposer(owner, parent, Arc::new(Disposer::new()))
    }

    /// Create a scope over `parent` sharing an existing disposer
    ///
    /// Useful when one disposer tracks many elements; this scope only ever
    /// disposes handles under its own owner key.
    pub fn with_disposer(
        owner: impl Into<String>,
        parent: &Arc<Registry>,
        disposer: Arc<Disposer>,
    ) -> Self {
        let owner = owner.into();
        debug!(owner = %owner, "created scoped provider");
        Self {
            registry: parent.create_scope(),
            owner,
            disposer,
            disposed: false,
        }
    }

    /// Owner key identifying this scope
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The child registry backing this scope
    ///
    /// Use it to register transient, element-local components.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The disposer tracking this scope's subscriptions
    pub fn disposer(&self) -> &Arc<Disposer> {
        &self.disposer
    }

    /// Resolve a component through the child registry
    ///
    /// Falls back to the parent chain for anything not registered locally.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.registry.resolve::<T>()
    }

    /// Track a cancelable handle under this scope's owner key
    pub fn track(&self, handle: impl Into<DisposerHandle>) {
        self.disposer.add(self.owner.as_str(), handle);
    }

    /// Dispose the scope: subscriptions first, then the child registry
    pub fn dispose(mut self) {
        self.dispose_in_place();
    }

    fn dispose_in_place(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        debug!(owner = %self.owner, "disposing scoped provider");
        self.disposer.dispose_owner(&self.owner);
        self.registry.dispose();
    }
}

impl Drop for ScopedProvider {
    fn drop(&mut self) {
        self.dispose_in_place();
    }
}

impl std::fmt::Debug for ScopedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedProvider")
            .field("owner", &self.owner)
            .field("registry", &self.registry)
            .finish()
    }
}
