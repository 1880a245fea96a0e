//! Component Registry - tether
//!
//! The provider core of tether: a typed component registry that decides
//! *when* a component is constructed and *who owns it*.
//!
//! ## Model
//!
//! A root [`Registry`] is built once at process start by installing
//! [`ProviderModule`]s, each of which registers typed factories under one of
//! three resolution strategies:
//!
//! - **Eager**: the factory runs at registration time, on the registering
//!   thread.
//! - **Lazy**: the factory runs on the first `resolve` call, on the
//!   requesting thread; the result is cached.
//! - **Async**: the factory runs on the first `resolve` call, on a spawned
//!   background thread; the first caller blocks until it completes and
//!   concurrent callers join the same in-flight resolution.
//!
//! Whatever the strategy, a factory for a given key runs at most once for a
//! successful construction, and the registry exclusively owns every cached
//! instance until it is disposed.
//!
//! ## Scopes
//!
//! [`Registry::create_scope`] layers a child registry over a parent for
//! transient components; lookups that miss in the child delegate upward.
//! Dropping the child never touches the parent.

pub mod error;
pub mod key;
pub mod module;
pub mod registry;

mod entry;

pub use error::{Error, Result};
pub use key::ComponentKey;
pub use module::ProviderModule;
pub use registry::{Registry, Strategy};
