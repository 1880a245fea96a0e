//! Registration entries and the per-entry resolution state machine
//!
//! Each registered component owns one [`Entry`]. The entry serializes state
//! transitions behind its own mutex so unrelated components can resolve in
//! parallel, and a condvar lets concurrent callers join an in-flight
//! resolution instead of re-invoking the factory.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::key::ComponentKey;
use crate::registry::{Registry, Strategy};

/// Type-erased component instance owned by a registry
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased component factory
pub(crate) type Factory = Box<dyn Fn(&Registry) -> Result<Instance> + Send + Sync>;

/// Type-erased teardown callback invoked at disposal
pub(crate) type Teardown = Box<dyn Fn(&Instance) -> Result<()> + Send + Sync>;

/// Why a resolution attempt failed
///
/// Kept apart from the plain message so waiters can re-surface the original
/// error kind instead of flattening everything into `Resolution`.
enum Failure {
    Circular,
    Factory(String),
}

impl Failure {
    fn classify(err: &Error) -> Self {
        match err {
            Error::CircularDependency { .. } => Failure::Circular,
            other => Failure::Factory(other.to_string()),
        }
    }
}

enum State {
    /// Factory registered, not yet invoked
    Registered,
    /// Factory running; `thread` is the invoking thread once known
    Resolving { thread: Option<ThreadId> },
    /// Construction succeeded, instance cached for the registry's lifetime
    Resolved(Instance),
    /// Construction failed; Lazy/Async entries retry on the next resolve
    Failed(Failure),
    /// Entry torn down by registry disposal
    Disposed,
}

pub(crate) struct Entry {
    key: ComponentKey,
    strategy: Strategy,
    factory: Factory,
    teardown: Option<Teardown>,
    state: Mutex<State>,
    ready: Condvar,
}

impl Entry {
    pub(crate) fn new(
        key: ComponentKey,
        strategy: Strategy,
        factory: Factory,
        teardown: Option<Teardown>,
        resolved: Option<Instance>,
    ) -> Self {
        let state = match resolved {
            Some(instance) => State::Resolved(instance),
            None => State::Registered,
        };
        Self {
            key,
            strategy,
            factory,
            teardown,
            state: Mutex::new(state),
            ready: Condvar::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_ready<'a>(&self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.ready.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    fn failure_error(&self, failure: &Failure) -> Error {
        match failure {
            Failure::Circular => Error::circular(self.key),
            Failure::Factory(message) => Error::resolution(self.key, message.clone()),
        }
    }

    /// Resolve this entry, invoking the factory if no instance is cached.
    ///
    /// Exactly one caller runs the factory; everyone else blocks on the
    /// condvar until the transition out of `Resolving`. A caller that finds
    /// its own thread already resolving this key fails with
    /// `CircularDependency` instead of deadlocking.
    pub(crate) fn resolve(self: &Arc<Self>, registry: &Registry) -> Result<Instance> {
        let mut waited = false;
        let mut state = self.lock_state();
        loop {
            match &*state {
                State::Resolved(instance) => return Ok(Arc::clone(instance)),
                State::Disposed => return Err(Error::unresolved(self.key)),
                State::Failed(failure) => {
                    // A caller that waited out this attempt propagates its
                    // failure; a fresh call retries since nothing was cached.
                    if waited {
                        return Err(self.failure_error(failure));
                    }
                    break;
                }
                State::Resolving { thread } => {
                    if *thread == Some(thread::current().id()) {
                        return Err(Error::circular(self.key));
                    }
                    waited = true;
                    state = self.wait_ready(state);
                }
                State::Registered => break,
            }
        }

        match self.strategy {
            // Eager entries are cached at registration time; an uncached
            // eager entry cannot be observed through the registry.
            Strategy::Eager => Err(Error::resolution(self.key, "eager entry was never constructed")),
            Strategy::Lazy => self.run_factory(state, registry),
            Strategy::Async => self.spawn_factory(state, registry),
        }
    }

    /// Invoke the factory, converting an unwinding panic into a failed
    /// result. Without the catch a panic mid-`Resolving` would strand
    /// waiters on the condvar with no transition ever coming.
    fn invoke_factory(&self, registry: &Registry) -> Result<Instance> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.factory)(registry)))
            .unwrap_or_else(|payload| Err(Error::resolution(self.key, panic_message(payload.as_ref()))))
    }

    /// Lazy path: invoke the factory synchronously on the requesting thread.
    fn run_factory(&self, mut state: MutexGuard<'_, State>, registry: &Registry) -> Result<Instance> {
        *state = State::Resolving {
            thread: Some(thread::current().id()),
        };
        drop(state);

        debug!(component = %self.key, "invoking lazy factory");
        let result = self.invoke_factory(registry);

        let mut state = self.lock_state();
        if matches!(&*state, State::Disposed) {
            // Registry was disposed while the factory ran; the fresh
            // instance never becomes resolvable.
            drop(state);
            if let Ok(instance) = result {
                self.teardown_instance(&instance);
            }
            return Err(Error::unresolved(self.key));
        }
        match result {
            Ok(instance) => {
                *state = State::Resolved(Arc::clone(&instance));
                drop(state);
                self.ready.notify_all();
                Ok(instance)
            }
            Err(err) => {
                let failure = Failure::classify(&err);
                let surfaced = self.failure_error(&failure);
                *state = State::Failed(failure);
                drop(state);
                self.ready.notify_all();
                Err(surfaced)
            }
        }
    }

    /// Async path: invoke the factory off the requesting thread, then join
    /// the in-flight resolution like any other waiter.
    fn spawn_factory(
        self: &Arc<Self>,
        mut state: MutexGuard<'_, State>,
        registry: &Registry,
    ) -> Result<Instance> {
        *state = State::Resolving { thread: None };
        drop(state);

        let Some(registry) = registry.shared() else {
            return self.fail_in_place(Failure::Factory("registry dropped during resolution".into()));
        };
        let entry = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("tether-{}", short_type_name(self.key.type_name())))
            .spawn(move || {
                {
                    let mut state = entry.lock_state();
                    if let State::Resolving { thread } = &mut *state {
                        *thread = Some(thread::current().id());
                    }
                }
                debug!(component = %entry.key, "invoking async factory");
                let result = entry.invoke_factory(&registry);
                entry.complete_async(result);
            });
        if let Err(err) = spawned {
            return self.fail_in_place(Failure::Factory(err.to_string()));
        }

        let mut state = self.lock_state();
        loop {
            match &*state {
                State::Resolved(instance) => return Ok(Arc::clone(instance)),
                State::Failed(failure) => return Err(self.failure_error(failure)),
                State::Disposed => return Err(Error::unresolved(self.key)),
                State::Resolving { .. } | State::Registered => state = self.wait_ready(state),
            }
        }
    }

    /// Record the outcome of an async factory run.
    ///
    /// Once started, an async factory runs to completion; if the entry was
    /// disposed in the meantime the result is torn down instead of cached.
    fn complete_async(&self, result: Result<Instance>) {
        let mut state = self.lock_state();
        if matches!(&*state, State::Disposed) {
            drop(state);
            if let Ok(instance) = result {
                debug!(component = %self.key, "async factory completed after disposal");
                self.teardown_instance(&instance);
            }
            return;
        }
        *state = match result {
            Ok(instance) => State::Resolved(instance),
            Err(err) => State::Failed(Failure::classify(&err)),
        };
        drop(state);
        self.ready.notify_all();
    }

    fn fail_in_place(&self, failure: Failure) -> Result<Instance> {
        let surfaced = self.failure_error(&failure);
        let mut state = self.lock_state();
        *state = State::Failed(failure);
        drop(state);
        self.ready.notify_all();
        Err(surfaced)
    }

    /// Transition to `Disposed`, running the teardown callback if an
    /// instance was cached. Waiters are woken and observe the disposal.
    pub(crate) fn dispose(&self) {
        let previous = {
            let mut state = self.lock_state();
            std::mem::replace(&mut *state, State::Disposed)
        };
        self.ready.notify_all();
        if let State::Resolved(instance) = previous {
            self.teardown_instance(&instance);
        }
    }

    fn teardown_instance(&self, instance: &Instance) {
        if let Some(teardown) = &self.teardown {
            if let Err(err) = teardown(instance) {
                let err = Error::disposal(self.key.type_name(), err.to_string());
                warn!(component = %self.key, error = %err, "teardown callback failed");
            }
        }
    }
}

/// Last path segment of a type name, for thread naming
fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

/// Best-effort panic payload rendering for the surfaced error
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("factory panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("factory panicked: {message}")
    } else {
        "factory panicked".to_string()
    }
}
