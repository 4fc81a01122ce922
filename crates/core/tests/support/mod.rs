//! Shared test helpers for `metricspace-core` integration tests.
//!
//! Provides a recording retention provider and a sink that keeps entry kinds
//! so tests can focus on behaviour instead of boilerplate.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::ops::ControlFlow;
use std::sync::Arc;

use metricspace_core::namespace::{ResultSink, RetentionProvider, SearchEntry};
use metricspace_domain::{RetentionPoint, RetentionRule};
use parking_lot::Mutex;

/// Retention provider that assigns rules by prefix and records every lookup.
#[derive(Default)]
pub struct RecordingRetention {
    lookups: Mutex<Vec<String>>,
}

impl RecordingRetention {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

impl RetentionProvider for RecordingRetention {
    fn retention_for(&self, metric_name: &str) -> Arc<RetentionRule> {
        self.lookups.lock().push(metric_name.to_string());
        let rule = if metric_name.starts_with("one_sec.") {
            RetentionRule::new(
                "one_sec",
                "avg",
                vec![
                    RetentionPoint { age_secs: 0, precision_secs: 1 },
                    RetentionPoint { age_secs: 86_400, precision_secs: 60 },
                ],
            )
        } else {
            RetentionRule::default()
        };
        Arc::new(rule)
    }
}

/// What kind of entry the sink saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Dir,
    Metric,
    Notice,
}

/// Sink keeping `(kind, full name)` pairs.
#[derive(Default)]
pub struct KindSink {
    pub entries: BTreeSet<(Kind, String)>,
}

impl ResultSink for KindSink {
    type Error = Infallible;

    fn append(&mut self, entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, Infallible> {
        let kind = match entry {
            SearchEntry::Dir(_) => Kind::Dir,
            SearchEntry::Metric(_) => Kind::Metric,
            SearchEntry::LimitNotice { .. } => Kind::Notice,
        };
        self.entries.insert((kind, entry.full_name()));
        Ok(ControlFlow::Continue(()))
    }
}

/// Builds the expected `(kind, name)` set.
pub fn expect(entries: &[(Kind, &str)]) -> BTreeSet<(Kind, String)> {
    entries.iter().map(|(kind, name)| (*kind, (*name).to_string())).collect()
}
