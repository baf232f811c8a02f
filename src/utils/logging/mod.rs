//! Logging initialisation
//!
//! Installs a `tracing-subscriber` fmt subscriber. `RUST_LOG` wins over the
//! configured level so operators can raise verbosity without a config change.

use crate::config::LoggingSettings;
use crate::utils::error::{ResilienceError, Result};
use tracing_subscriber::EnvFilter;

/// Filter built from `RUST_LOG`, falling back to the configured level
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| {
            ResilienceError::config(format!("Invalid log level '{}': {}", settings.level, e))
        }),
    }
}

/// Install the global subscriber
///
/// Returns `Ok(false)` when a subscriber was already installed, so embedders
/// and tests may call this repeatedly.
pub fn init_tracing(settings: &LoggingSettings) -> Result<bool> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let installed = if settings.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    Ok(installed)
}
