//! Replay-of-one event subject
//!
//! A small, explicit broadcast primitive: one latest-value slot, a set of
//! observers, synchronous delivery. New subscribers immediately see the most
//! recent value; they never see history. Emitting `v2` before anyone
//! consumed `v1` means `v1` is gone - last value wins, this is not a queue.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::disposer::DisposerHandle;

type ObserverFn<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Observer<T> {
    id: u64,
    callback: ObserverFn<T>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Inner<T> {
    latest: Option<T>,
    observers: Vec<Observer<T>>,
    next_id: u64,
}

/// Single-slot latest-value broadcast to multiple observers
///
/// Shared by the publisher and all subscribers; cloning is cheap and every
/// clone refers to the same slot. The internal lock is held only for slot
/// and set mutation, never across an observer callback, so observers may
/// re-enter `subscribe`/`unsubscribe` (including canceling themselves)
/// during delivery.
pub struct ReplaySubject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ReplaySubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReplaySubject<T> {
    /// Create a subject with an empty value slot
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                latest: None,
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of currently subscribed observers
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl<T: Clone + Send + 'static> ReplaySubject<T> {
    /// Store `value` as the latest value and deliver it to every observer
    ///
    /// Delivery is synchronous, on the emitting thread, in subscription
    /// order. Emission never blocks on the subject's own lock while a
    /// callback runs.
    pub fn emit(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let mut inner = self.lock();
            inner.latest = Some(value.clone());
            inner.observers.clone()
        };
        trace!(observers = observers.len(), "emitting value");
        for observer in observers {
            (observer.callback)(value.clone());
        }
    }

    /// Subscribe an observer, replaying the latest value if one exists
    ///
    /// The replay is delivered before this call returns. The returned
    /// [`Subscription`] cancels the observer and converts into a
    /// [`DisposerHandle`] for owner-keyed teardown.
    pub fn subscribe(&self, observer: impl Fn(T) + Send + Sync + 'static) -> Subscription<T> {
        let callback: ObserverFn<T> = Arc::new(observer);
        let (id, replay) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push(Observer {
                id,
                callback: Arc::clone(&callback),
            });
            (id, inner.latest.clone())
        };
        if let Some(value) = replay {
            callback(value);
        }
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Remove an observer; idempotent
    pub fn unsubscribe(&self, subscription: &Subscription<T>) {
        subscription.cancel();
    }

    /// Non-blocking snapshot of the latest value
    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }
}

impl<T> std::fmt::Debug for ReplaySubject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ReplaySubject")
            .field("has_value", &inner.latest.is_some())
            .field("observers", &inner.observers.len())
            .finish()
    }
}

/// Cancelable handle for one observer of a [`ReplaySubject`]
///
/// Holds only a weak reference to the subject: a dangling subscription
/// cannot keep a dropped subject alive, and canceling it is a no-op.
pub struct Subscription<T> {
    id: u64,
    inner: Weak<Mutex<Inner<T>>>,
}

impl<T> Subscription<T> {
    /// Remove the observer from the subject; idempotent
    pub fn cancel(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .observers
                .retain(|observer| observer.id != self.id);
        }
    }

    /// Whether the observer is still subscribed
    pub fn is_active(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| {
                inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observers
                    .iter()
                    .any(|observer| observer.id == self.id)
            })
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<T: Send + 'static> From<Subscription<T>> for DisposerHandle {
    fn from(subscription: Subscription<T>) -> Self {
        DisposerHandle::new(move || {
            subscription.cancel();
            Ok(())
        })
    }
}
