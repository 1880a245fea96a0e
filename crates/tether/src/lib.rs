//! # tether
//!
//! A component provider runtime: typed registries that decide when a
//! component is constructed and who owns it, paired with a subscription
//! lifecycle layer that decides when a reactive stream started by that
//! component is torn down. Both exist to prevent resource and subscription
//! leaks in systems where components are created lazily, asynchronously,
//! and on threads that can discard their owners at any time.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tether::{Registry, ReplaySubject, ScopedProvider};
//!
//! struct Clock;
//!
//! let root = Registry::new();
//! root.register_lazy::<Clock, _>(|_| Ok(Clock)).unwrap();
//! root.register_eager::<ReplaySubject<u32>, _>(|_| Ok(ReplaySubject::new()))
//!     .unwrap();
//!
//! // A UI element gets its own scope layered over the root.
//! let scope = ScopedProvider::new("settings-screen", &root);
//! let _clock: Arc<Clock> = scope.resolve().unwrap();
//!
//! // Subscriptions started by the element are tracked under its owner key.
//! let ticks: Arc<ReplaySubject<u32>> = scope.resolve().unwrap();
//! scope.track(ticks.subscribe(|tick| println!("tick {tick}")));
//!
//! // Destroying the element cancels its subscriptions, then drops its scope.
//! scope.dispose();
//! ```
//!
//! ## Layers
//!
//! - `registry` - component registry, resolution strategies, provider
//!   modules, error taxonomy
//! - `reactive` - owner-keyed disposer and replay-of-one event subject
//! - [`ScopedProvider`] - the per-element view binding a child registry to
//!   a disposer owner key

/// Registry layer - re-exports from the registry crate for convenience
pub mod registry {
    pub use tether_registry::*;
}

/// Reactive layer - re-exports from the reactive crate for convenience
pub mod reactive {
    pub use tether_reactive::*;
}

pub mod logging;

mod scope;

// Re-export the commonly used registry types at the crate root
pub use registry::{ComponentKey, Error, ProviderModule, Registry, Result, Strategy};

// Re-export the reactive primitives at the crate root
pub use reactive::{Disposer, DisposerHandle, ReplaySubject, Subscription};

pub use scope::ScopedProvider;
