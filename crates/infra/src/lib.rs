//! # Metricspace Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (files and environment)
//! - Regex-based retention rule lookup
//! - Logging setup
//!
//! ## Architecture
//! - Implements traits defined in `metricspace-core`
//! - Depends on `metricspace-common`, `metricspace-domain` and
//!   `metricspace-core`
//! - Contains all "impure" code (file I/O, environment, global subscriber)

pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod retention;

// Re-export commonly used items
pub use bootstrap::build_index;
pub use observability::init_tracing;
pub use retention::RegexRetentionProvider;
