//! # Metricspace Domain
//!
//! Domain types for the metric namespace index.
//!
//! This crate contains:
//! - Access statuses and the restriction graph that governs transitions
//! - Level helpers for dot-delimited names
//! - Retention rule types handed out by retention providers
//! - Domain error types and Result definitions
//! - Configuration structures and their defaults
//!
//! ## Architecture
//! - No dependencies on other Metricspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod status;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use status::{MetricStatus, StatusPolicy, StatusRestriction};
pub use types::*;
pub use utils::levels::{is_dir, join_levels, split_to_levels};
