//! Provider modules
//!
//! A module groups the registrations for one subsystem behind a single
//! `provides` hook, with a matching `dispose` hook at shutdown. Modules are
//! the unit in which collaborators contribute components to a registry:
//!
//! ```
//! use std::sync::Arc;
//! use tether_registry::{ProviderModule, Registry, Result};
//!
//! struct Settings {
//!     cache_dir: String,
//! }
//!
//! struct SettingsModule;
//!
//! impl ProviderModule for SettingsModule {
//!     fn provides(&self, registry: &Registry) -> Result<()> {
//!         registry.register_lazy::<Settings, _>(|_| {
//!             Ok(Settings { cache_dir: "/tmp".to_string() })
//!         })
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.install(SettingsModule).unwrap();
//! let settings: Arc<Settings> = registry.resolve().unwrap();
//! assert_eq!(settings.cache_dir, "/tmp");
//! ```

use crate::error::Result;
use crate::registry::Registry;

/// A group of component registrations installed as one unit
///
/// `provides` runs once when the module is installed; `dispose` runs once
/// when the owning registry is disposed, in reverse install order. Both are
/// side-effect hooks: success or error is their whole contract.
pub trait ProviderModule: Send + Sync {
    /// Register this module's components against the registry
    fn provides(&self, registry: &Registry) -> Result<()>;

    /// Shutdown hook invoked during registry disposal
    ///
    /// Runs before entry teardowns, so cached components are still
    /// resolvable here. Errors are logged and swallowed by the registry.
    fn dispose(&self, registry: &Registry) -> Result<()> {
        let _ = registry;
        Ok(())
    }
}
