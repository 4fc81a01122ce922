//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! namespace index.

// Name syntax
pub const LEVEL_SEPARATOR: char = '.';
pub const MATCH_ALL_PATTERN: &str = "*";
pub const GLOB_METACHARACTERS: &[char] = &['*', '?', '[', ']', '{', '}'];

// Name validation defaults
pub const DEFAULT_NAME_PATTERN: &str = r"^[-_0-9a-zA-Z.]+$";
pub const DEFAULT_MIN_NAME_LENGTH: usize = 10;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 200;
pub const DEFAULT_MIN_DOTS: usize = 1;
pub const DEFAULT_MAX_DOTS: usize = 14;

// Per-directory capacity defaults (0 = unlimited)
pub const DEFAULT_MAX_SUBDIRS_PER_DIR: usize = 0;
pub const DEFAULT_MAX_METRICS_PER_DIR: usize = 0;

// Limit notification markers, suffixed with the configured cap
pub const SUBDIRS_LIMIT_NOTICE_PREFIX: &str = "_SUBDIRS_LIMIT_REACHED_MAX_";
pub const METRICS_LIMIT_NOTICE_PREFIX: &str = "_METRICS_LIMIT_REACHED_MAX_";

// Retention defaults
pub const DEFAULT_RETENTION_NAME: &str = "default";
pub const DEFAULT_RETENTION_FUNCTION: &str = "avg";
pub const DEFAULT_RETENTION_PRECISION_SECS: u64 = 60;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
