//! Metric namespace: the tree, its nodes, glob search and the ports it
//! depends on.

pub mod index;
pub mod node;
pub mod pattern;
pub mod ports;
pub mod search;
pub mod tree;

pub use index::MetricIndex;
pub use node::{MetricDir, MetricLeaf, NamespaceNode};
pub use pattern::LevelPattern;
pub use ports::{FixedRetention, ResultSink, RetentionProvider};
pub use search::{SearchEntry, SearchOutcome, VecSink, WriterSink};
pub use tree::MetricTree;
