//! # Metricspace Core
//!
//! In-memory metric namespace - no infrastructure dependencies.
//!
//! This crate contains:
//! - The concurrent namespace tree and its nodes
//! - Glob search with streaming result sinks
//! - Port interfaces (traits) for retention lookup and result delivery
//!
//! ## Architecture Principles
//! - Only depends on `metricspace-common` and `metricspace-domain`
//! - No file, network or platform code
//! - External collaborators via traits
//! - No global lock: per-directory maps and atomics only

pub mod namespace;

// Re-export the namespace surface
pub use namespace::{
    FixedRetention, LevelPattern, MetricDir, MetricIndex, MetricLeaf, MetricTree, NamespaceNode,
    ResultSink, RetentionProvider, SearchEntry, SearchOutcome, VecSink, WriterSink,
};
