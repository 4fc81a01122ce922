//! Retention rules attached to leaf metrics
//!
//! A retention rule describes how a metric's points are rolled up over time:
//! an aggregation function plus a ladder of `(age, precision)` steps. The tree
//! resolves one rule per metric when the metric is first created and keeps it
//! for the metric's lifetime.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RETENTION_FUNCTION, DEFAULT_RETENTION_NAME, DEFAULT_RETENTION_PRECISION_SECS,
};

/// One step of a retention ladder: points older than `age_secs` are stored
/// with `precision_secs` resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPoint {
    pub age_secs: u64,
    pub precision_secs: u64,
}

/// Named retention rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRule {
    pub name: String,
    pub function: String,
    #[serde(default)]
    pub points: Vec<RetentionPoint>,
}

impl RetentionRule {
    /// Creates a rule with its steps sorted by age.
    pub fn new(
        name: impl Into<String>,
        function: impl Into<String>,
        mut points: Vec<RetentionPoint>,
    ) -> Self {
        points.sort_by_key(|point| point.age_secs);
        Self { name: name.into(), function: function.into(), points }
    }

    /// Precision applied to points of the given age.
    pub fn precision_for_age(&self, age_secs: u64) -> Option<u64> {
        self.points
            .iter()
            .take_while(|point| point.age_secs <= age_secs)
            .last()
            .map(|point| point.precision_secs)
    }
}

impl Default for RetentionRule {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETENTION_NAME,
            DEFAULT_RETENTION_FUNCTION,
            vec![RetentionPoint { age_secs: 0, precision_secs: DEFAULT_RETENTION_PRECISION_SECS }],
        )
    }
}
