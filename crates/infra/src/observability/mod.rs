//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber. `RUST_LOG` takes
//! precedence over the configured level so operators can raise verbosity
//! without touching the config file.

use metricspace_domain::{LoggingConfig, MetricspaceError, Result};
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` if set and valid, else `config.level`.
///
/// # Errors
/// Returns `MetricspaceError::Config` if the configured level is not a
/// valid filter directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        MetricspaceError::Config(format!("Invalid log level '{}': {}", config.level, e))
    })
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns `MetricspaceError::Config` for an invalid level and
/// `MetricspaceError::Internal` if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|e| {
        MetricspaceError::Internal(format!("Failed to install tracing subscriber: {}", e))
    })?;

    tracing::info!(level = %config.level, json = config.json, "tracing initialized");
    Ok(())
}
