//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for subscription lifecycle operations
///
/// Cancellation errors are caught and logged by the [`Disposer`]; they never
/// abort the teardown of sibling handles.
///
/// [`Disposer`]: crate::Disposer
#[derive(Error, Debug)]
pub enum Error {
    /// A handle's cancel function failed during disposal
    #[error("cancel failed for {handle}: {message}")]
    Cancel {
        /// Label of the failing handle
        handle: String,
        /// Description of the failure
        message: String,
    },

    /// Generic error from collaborator cancel functions
    #[error("{0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Generic string-based error
    #[error("{0}")]
    String(String),
}

impl Error {
    /// Create a `Cancel` error for a labeled handle
    pub fn cancel(handle: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Cancel {
            handle: handle.into(),
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
