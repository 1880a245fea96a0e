//! Error handling types

use thiserror::Error;

use crate::key::ComponentKey;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tether runtime
#[derive(Error, Debug)]
pub enum Error {
    /// A component key was registered twice in the same registry
    #[error("component already registered: {component}")]
    DuplicateKey {
        /// Type name of the colliding component
        component: String,
    },

    /// No registration for the requested key in this registry or any parent
    #[error("unresolved dependency: {component}")]
    UnresolvedDependency {
        /// Type name of the missing component
        component: String,
    },

    /// A factory requested its own key while it was being resolved
    #[error("circular dependency detected while resolving: {component}")]
    CircularDependency {
        /// Type name of the self-referential component
        component: String,
    },

    /// A factory failed during eager, registration-time construction
    #[error("registration failed for {component}: {message}")]
    Registration {
        /// Type name of the component that failed to register
        component: String,
        /// Description of the factory failure
        message: String,
    },

    /// A factory failed during lazy or async construction (retryable)
    #[error("resolution failed for {component}: {message}")]
    Resolution {
        /// Type name of the component that failed to resolve
        component: String,
        /// Description of the factory failure
        message: String,
    },

    /// A teardown callback or cancelable failed during disposal
    ///
    /// Never propagated by the runtime itself; surfaced only through logs.
    #[error("disposal failure for {owner}: {message}")]
    Disposal {
        /// Owner key or component whose teardown failed
        owner: String,
        /// Description of the teardown failure
        message: String,
    },

    /// Generic error from collaborator factories
    #[error("{0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Generic string-based error
    #[error("{0}")]
    String(String),
}

impl Error {
    /// Create a `DuplicateKey` error for a component key
    pub fn duplicate_key(key: ComponentKey) -> Self {
        Error::DuplicateKey {
            component: key.type_name().to_string(),
        }
    }

    /// Create an `UnresolvedDependency` error for a component key
    pub fn unresolved(key: ComponentKey) -> Self {
        Error::UnresolvedDependency {
            component: key.type_name().to_string(),
        }
    }

    /// Create a `CircularDependency` error for a component key
    pub fn circular(key: ComponentKey) -> Self {
        Error::CircularDependency {
            component: key.type_name().to_string(),
        }
    }

    /// Create a `Registration` error for a component key
    pub fn registration(key: ComponentKey, message: impl Into<String>) -> Self {
        Error::Registration {
            component: key.type_name().to_string(),
            message: message.into(),
        }
    }

    /// Create a `Resolution` error for a component key
    pub fn resolution(key: ComponentKey, message: impl Into<String>) -> Self {
        Error::Resolution {
            component: key.type_name().to_string(),
            message: message.into(),
        }
    }

    /// Create a `Disposal` error for an owner
    pub fn disposal(owner: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Disposal {
            owner: owner.into(),
            message: message.into(),
        }
    }

    /// Create a generic error from a message
    pub fn generic(message: impl Into<String>) -> Self {
        Error::String(message.into())
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::String(message.to_string())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::String(message)
    }
}
