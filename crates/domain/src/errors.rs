//! Error types used throughout the namespace index

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Metricspace
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MetricspaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Metricspace operations
pub type Result<T> = std::result::Result<T, MetricspaceError>;
