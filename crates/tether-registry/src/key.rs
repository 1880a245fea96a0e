//! Typed component keys
//!
//! A [`ComponentKey`] maps a Rust type to a registry slot. Keys are derived
//! from [`TypeId`] at compile time, so the type-to-instance mapping needs no
//! runtime reflection and no string naming convention.

use std::any::TypeId;
use std::fmt;

/// Identity of a component registration
///
/// Unique per registry; registering the same key twice is a configuration
/// error surfaced at registration time, not at resolution time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ComponentKey {
    /// Key for the component type `T`
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Full type name behind this key, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentKey").field(&self.type_name).finish()
    }
}
