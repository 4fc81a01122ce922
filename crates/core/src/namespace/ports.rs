//! Port interfaces for the namespace tree

use std::ops::ControlFlow;
use std::sync::Arc;

use metricspace_domain::RetentionRule;

use super::search::SearchEntry;

/// Trait for resolving the retention rule of a new metric
///
/// Called exactly once per leaf, when the leaf is created, with the metric's
/// full dotted name. Implementations run while the parent directory's shard
/// is locked and must not call back into the tree.
pub trait RetentionProvider: Send + Sync {
    /// Retention rule for `metric_name`.
    fn retention_for(&self, metric_name: &str) -> Arc<RetentionRule>;
}

/// Provider that hands every metric the same rule.
#[derive(Debug, Clone, Default)]
pub struct FixedRetention {
    rule: Arc<RetentionRule>,
}

impl FixedRetention {
    pub fn new(rule: RetentionRule) -> Self {
        Self { rule: Arc::new(rule) }
    }
}

impl RetentionProvider for FixedRetention {
    fn retention_for(&self, _metric_name: &str) -> Arc<RetentionRule> {
        Arc::clone(&self.rule)
    }
}

/// Trait for consuming search results
///
/// Entries are borrowed from the tree for the duration of the call. Return
/// `ControlFlow::Break(())` to end the search early; errors abort the search
/// and are handed back to the caller unchanged.
///
/// No tree locks are held while `append` runs: a slow sink delays only its
/// own search, and it may insert into the tree being searched.
pub trait ResultSink {
    /// Error produced by the sink.
    type Error;

    /// Consume one entry.
    fn append(&mut self, entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, Self::Error>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    type Error = S::Error;

    fn append(&mut self, entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, Self::Error> {
        (**self).append(entry)
    }
}
