//! Logging setup

use crate::config::LoggingConfig;
use crate::errors::{CredentialError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the level filter; `RUST_LOG` wins over the configured level
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            CredentialError::Config(format!("Invalid log level {:?}: {}", config.level, e))
        }),
    }
}

/// Install the global subscriber.
///
/// Meant for binaries embedding the library. Fails if a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        _ => registry.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| CredentialError::Config(format!("Failed to initialize logging: {}", e)))
}
