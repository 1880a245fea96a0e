//! Reactive lifecycle primitives - tether
//!
//! Companion layer to the component registry: where the registry decides
//! when a component is constructed, this crate decides when a reactive
//! subscription started by that component is torn down.
//!
//! - [`Disposer`]: an owner-keyed registry of cancelable handles. UI-bound
//!   components register every subscription under their owner key and cancel
//!   them all in one call when the owning element goes away.
//! - [`ReplaySubject`]: a single-slot latest-value broadcast. Emissions are
//!   delivered synchronously to every observer in subscription order, and a
//!   late subscriber immediately receives the most recent value.
//!
//! Both guarantee exactly-once disposal; neither implements retry or
//! backpressure.

pub mod disposer;
pub mod error;
pub mod subject;

pub use disposer::{Disposer, DisposerHandle};
pub use error::{Error, Result};
pub use subject::{ReplaySubject, Subscription};
