//! Wiring of configuration into a ready-to-use index

use std::sync::Arc;

use metricspace_core::namespace::MetricIndex;
use metricspace_domain::{Config, Result};

use crate::retention::RegexRetentionProvider;

/// Builds the validating index described by `config`, with regex retention
/// rules.
///
/// # Errors
/// Returns `MetricspaceError::InvalidPattern` if the name pattern or a
/// retention pattern does not compile.
pub fn build_index(config: &Config) -> Result<MetricIndex> {
    let retention = RegexRetentionProvider::from_config(&config.retention)?;
    MetricIndex::from_config(config, Arc::new(retention))
}
