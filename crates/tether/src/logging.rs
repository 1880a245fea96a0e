//! Structured logging with tracing
//!
//! Optional bootstrap for binaries embedding the runtime. The library
//! itself only emits `tracing` events; installing a subscriber is the
//! host's choice, and this helper covers the common case.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use tether_registry::{Error, Result};

/// Environment variable consulted for filter directives
pub const LOG_ENV_VAR: &str = "TETHER_LOG";

/// Initialize a formatted stderr subscriber
///
/// Filter directives come from `TETHER_LOG` when set, falling back to the
/// given default level. Fails if a global subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<()> {
    let level = parse_log_level(default_level)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| Error::generic(format!("failed to install subscriber: {err}")))
}

/// Parse a log level string to a tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::generic(format!(
            "invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}
