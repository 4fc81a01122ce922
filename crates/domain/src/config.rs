//! Configuration management
//!
//! All sections are optional in configuration files; missing sections and
//! fields fall back to the defaults in [`crate::constants`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_DOTS, DEFAULT_MAX_METRICS_PER_DIR, DEFAULT_MAX_NAME_LENGTH,
    DEFAULT_MAX_SUBDIRS_PER_DIR, DEFAULT_MIN_DOTS, DEFAULT_MIN_NAME_LENGTH, DEFAULT_NAME_PATTERN,
};
use crate::status::{StatusPolicy, StatusRestriction};
use crate::types::RetentionRule;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub limits: LimitsConfig,
    pub retention: RetentionConfig,
    pub logging: LoggingConfig,
    /// Restriction graph edges; see [`StatusPolicy`].
    pub status_policy: Vec<StatusRestriction>,
}

impl Config {
    /// Builds the restriction graph described by this configuration.
    pub fn status_policy(&self) -> StatusPolicy {
        StatusPolicy::from_edges(self.status_policy.iter().cloned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            limits: LimitsConfig::default(),
            retention: RetentionConfig::default(),
            logging: LoggingConfig::default(),
            status_policy: StatusPolicy::default().edges(),
        }
    }
}

/// Name validation rules applied before names reach the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Regular expression the whole name must match.
    pub pattern: String,
    pub min_length: usize,
    pub max_length: usize,
    pub min_dots: usize,
    pub max_dots: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_NAME_PATTERN.to_string(),
            min_length: DEFAULT_MIN_NAME_LENGTH,
            max_length: DEFAULT_MAX_NAME_LENGTH,
            min_dots: DEFAULT_MIN_DOTS,
            max_dots: DEFAULT_MAX_DOTS,
        }
    }
}

/// Per-directory capacity limits (0 = unlimited)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_subdirs_per_dir: usize,
    pub max_metrics_per_dir: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_subdirs_per_dir: DEFAULT_MAX_SUBDIRS_PER_DIR,
            max_metrics_per_dir: DEFAULT_MAX_METRICS_PER_DIR,
        }
    }
}

/// Retention rule selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetentionConfig {
    /// Rule applied when no pattern matches.
    pub default: RetentionRule,
    /// Ordered pattern rules; the first matching pattern wins.
    pub rules: Vec<RetentionPatternConfig>,
}

/// Retention rule bound to a metric-name regular expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPatternConfig {
    pub pattern: String,
    #[serde(flatten)]
    pub rule: RetentionRule,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}
