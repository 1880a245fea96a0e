//! The component registry
//!
//! Owns the key-to-entry mapping, resolves components on demand, chains
//! scoped lookups to a parent registry, and tears everything down in
//! reverse-registration order on disposal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tracing::{debug, warn};

use crate::entry::{Entry, Factory, Instance, Teardown};
use crate::error::{Error, Result};
use crate::key::ComponentKey;
use crate::module::ProviderModule;

/// Timing policy for factory invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Factory runs at registration time, on the registering thread
    Eager,
    /// Factory runs on first resolution, on the requesting thread
    Lazy,
    /// Factory runs on first resolution, off the requesting thread; the
    /// caller blocks until it completes
    Async,
}

/// Typed component registry with scoped lookup chaining
///
/// A registry maps component types to factories and exclusively owns every
/// instance it resolves. Factories run at most once for a successful
/// construction regardless of strategy; concurrent `resolve` calls for the
/// same key join the in-flight resolution instead of re-invoking.
///
/// Registries are handled through `Arc`: the root is built by the entry
/// point with [`Registry::new`] and threaded through the system, child
/// scopes come from [`Registry::create_scope`]. There is no process-wide
/// singleton.
pub struct Registry {
    /// Registered entries; unrelated keys resolve in parallel
    entries: DashMap<ComponentKey, Arc<Entry>>,
    /// Registration order, for reverse-order teardown
    order: Mutex<Vec<ComponentKey>>,
    /// Installed modules, disposed in reverse install order
    modules: Mutex<Vec<Box<dyn ProviderModule>>>,
    /// Parent registry for scoped lookup chaining
    parent: Option<Weak<Registry>>,
    /// Back-reference handed to async factory threads
    weak_self: Weak<Registry>,
    disposed: AtomicBool,
}

impl Registry {
    /// Create a root registry
    pub fn new() -> Arc<Self> {
        debug!("created root registry");
        Arc::new_cyclic(|weak| Self {
            entries: DashMap::new(),
            order: Mutex::new(Vec::new()),
            modules: Mutex::new(Vec::new()),
            parent: None,
            weak_self: weak.clone(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Create a child scope layered over this registry
    ///
    /// O(1): no parent entries are copied. Lookups that miss in the child
    /// delegate to the parent; registrations stay in the child. The child
    /// holds only a weak parent reference, so a leaked scope cannot keep a
    /// disposed parent alive.
    pub fn create_scope(self: &Arc<Self>) -> Arc<Registry> {
        debug!("created child scope");
        Arc::new_cyclic(|weak| Self {
            entries: DashMap::new(),
            order: Mutex::new(Vec::new()),
            modules: Mutex::new(Vec::new()),
            parent: Some(Arc::downgrade(self)),
            weak_self: weak.clone(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Register a component factory under the given strategy
    ///
    /// Fails with `DuplicateKey` if `T` is already registered in this
    /// registry (a parent registration does not collide). With
    /// `Strategy::Eager` the factory is invoked before returning and a
    /// factory error surfaces as `Registration`, leaving no partial
    /// registration behind.
    pub fn register<T, F>(&self, strategy: Strategy, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    {
        self.register_entry::<T>(strategy, erase_factory(factory), None)
    }

    /// Register a component factory together with a teardown callback
    ///
    /// The teardown runs against the cached instance when the registry is
    /// disposed; a teardown error is logged and swallowed.
    pub fn register_with_teardown<T, F, D>(
        &self,
        strategy: Strategy,
        factory: F,
        teardown: D,
    ) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
        D: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.register_entry::<T>(strategy, erase_factory(factory), Some(erase_teardown(teardown)))
    }

    /// Register with `Strategy::Eager`
    pub fn register_eager<T, F>(&self, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    {
        self.register::<T, F>(Strategy::Eager, factory)
    }

    /// Register with `Strategy::Lazy`
    pub fn register_lazy<T, F>(&self, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    {
        self.register::<T, F>(Strategy::Lazy, factory)
    }

    /// Register with `Strategy::Async`
    pub fn register_async<T, F>(&self, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    {
        self.register::<T, F>(Strategy::Async, factory)
    }

    /// Install a provider module
    ///
    /// Invokes the module's `provides` hook against this registry and, on
    /// success, retains the module so its `dispose` hook runs at registry
    /// disposal, in reverse install order.
    pub fn install<M: ProviderModule + 'static>(&self, module: M) -> Result<()> {
        module.provides(self)?;
        self.lock_modules().push(Box::new(module));
        Ok(())
    }

    /// Resolve a component, constructing it if necessary
    ///
    /// Delegates to the parent registry when the key is not registered
    /// here. Blocks while another thread resolves the same key; fails with
    /// `CircularDependency` when the resolving thread is this one.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = ComponentKey::of::<T>();
        let instance = self.resolve_key(key)?;
        instance
            .downcast::<T>()
            .map_err(|_| Error::resolution(key, "cached instance has unexpected type"))
    }

    /// Whether `T` is registered in this registry or any parent
    pub fn is_registered<T: Send + Sync + 'static>(&self) -> bool {
        let key = ComponentKey::of::<T>();
        if self.entries.contains_key(&key) {
            return true;
        }
        match self.parent.as_ref().and_then(Weak::upgrade) {
            Some(parent) => parent.is_registered::<T>(),
            None => false,
        }
    }

    /// Number of registrations in this registry (parents excluded)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this registry has no registrations of its own
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys registered in this registry, in registration order
    pub fn keys(&self) -> Vec<ComponentKey> {
        self.lock_order().clone()
    }

    /// Dispose the registry
    ///
    /// Runs module `dispose` hooks in reverse install order, then entry
    /// teardowns in reverse registration order, dropping every cached
    /// instance. Idempotent: the second call is a no-op. Disposal errors
    /// are logged, never propagated.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(registrations = self.entries.len(), "disposing registry");

        let modules = std::mem::take(&mut *self.lock_modules());
        for module in modules.iter().rev() {
            if let Err(err) = module.dispose(self) {
                warn!(error = %err, "module dispose hook failed");
            }
        }

        let order = std::mem::take(&mut *self.lock_order());
        for key in order.iter().rev() {
            if let Some((_, entry)) = self.entries.remove(key) {
                entry.dispose();
            }
        }
    }

    /// Upgradeable self-reference for async factory threads
    pub(crate) fn shared(&self) -> Option<Arc<Registry>> {
        self.weak_self.upgrade()
    }

    fn register_entry<T: Send + Sync + 'static>(
        &self,
        strategy: Strategy,
        factory: Factory,
        teardown: Option<Teardown>,
    ) -> Result<()> {
        let key = ComponentKey::of::<T>();
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::registration(key, "registry already disposed"));
        }
        if self.entries.contains_key(&key) {
            return Err(Error::duplicate_key(key));
        }

        // Eager construction happens before the entry exists, so a factory
        // error leaves the key unregistered.
        let resolved = match strategy {
            Strategy::Eager => Some(
                factory(self).map_err(|err| Error::registration(key, err.to_string()))?,
            ),
            Strategy::Lazy | Strategy::Async => None,
        };

        let entry = Arc::new(Entry::new(key, strategy, factory, teardown, resolved));
        match self.entries.entry(key) {
            MapEntry::Occupied(_) => return Err(Error::duplicate_key(key)),
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
        self.lock_order().push(key);
        debug!(component = %key, strategy = ?strategy, "component registered");
        Ok(())
    }

    pub(crate) fn resolve_key(&self, key: ComponentKey) -> Result<Instance> {
        let entry = self.entries.get(&key).map(|e| Arc::clone(e.value()));
        match entry {
            Some(entry) => entry.resolve(self),
            None => match self.parent.as_ref().and_then(Weak::upgrade) {
                Some(parent) => parent.resolve_key(key),
                None => Err(Error::unresolved(key)),
            },
        }
    }

    fn lock_order(&self) -> std::sync::MutexGuard<'_, Vec<ComponentKey>> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_modules(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn ProviderModule>>> {
        self.modules.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("registrations", &self.entries.len())
            .field("scoped", &self.parent.is_some())
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}

/// Wrap a typed factory into the erased form stored by the entry
fn erase_factory<T, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(&Registry) -> Result<T> + Send + Sync + 'static,
{
    Box::new(move |registry| factory(registry).map(|value| Arc::new(value) as Instance))
}

/// Wrap a typed teardown into the erased form stored by the entry
fn erase_teardown<T, D>(teardown: D) -> Teardown
where
    T: Send + Sync + 'static,
    D: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    Box::new(move |instance| match instance.downcast_ref::<T>() {
        Some(value) => teardown(value),
        // Unreachable by construction: the entry only ever caches a `T`.
        None => Ok(()),
    })
}
