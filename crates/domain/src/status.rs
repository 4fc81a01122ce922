//! Access statuses and the restriction graph
//!
//! Every namespace node carries a [`MetricStatus`]. Re-observing a name may
//! propose a different status; [`StatusPolicy::select`] decides whether the
//! proposal is adopted or suppressed. A status listed as restricted from the
//! current one never overwrites it, so a banned directory is not silently
//! un-banned by routine ingestion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Access-control status of a directory or metric.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricStatus {
    /// Default status of a freshly observed name.
    #[default]
    Simple,
    /// Invisible; nothing may be inserted beneath a banned directory.
    Ban,
    /// Explicitly approved by an operator.
    Approved,
    /// Hidden by an operator.
    Hidden,
    /// Hidden automatically (e.g. stale data).
    AutoHidden,
}

impl_domain_status_conversions!(MetricStatus {
    Simple => "SIMPLE",
    Ban => "BAN",
    Approved => "APPROVED",
    Hidden => "HIDDEN",
    AutoHidden => "AUTO_HIDDEN",
});

impl MetricStatus {
    /// All statuses, ordered by code.
    pub const ALL: [Self; 5] = [Self::Simple, Self::Ban, Self::Approved, Self::Hidden, Self::AutoHidden];

    /// Whether nodes with this status appear in search results.
    pub const fn visible(self) -> bool {
        matches!(self, Self::Simple | Self::Approved)
    }

    /// Stable numeric code, used for atomic storage.
    pub const fn code(self) -> u8 {
        match self {
            Self::Simple => 0,
            Self::Ban => 1,
            Self::Approved => 2,
            Self::Hidden => 3,
            Self::AutoHidden => 4,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Simple),
            1 => Some(Self::Ban),
            2 => Some(Self::Approved),
            3 => Some(Self::Hidden),
            4 => Some(Self::AutoHidden),
            _ => None,
        }
    }
}

/// One edge set of the restriction graph, as it appears in configuration.
///
/// ```toml
/// [[status_policy]]
/// status = "BAN"
/// restricted = ["SIMPLE", "AUTO_HIDDEN"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRestriction {
    pub status: MetricStatus,
    #[serde(default)]
    pub restricted: Vec<MetricStatus>,
}

/// Restriction graph over [`MetricStatus`].
///
/// Maps a current status to the statuses that must not overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    restricted: HashMap<MetricStatus, Vec<MetricStatus>>,
}

impl StatusPolicy {
    /// Policy without any restriction: every proposal is adopted.
    pub fn permissive() -> Self {
        Self { restricted: HashMap::new() }
    }

    /// Builds a policy from configured edge sets. Repeated entries for the
    /// same status are merged.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = StatusRestriction>,
    {
        let mut restricted: HashMap<MetricStatus, Vec<MetricStatus>> = HashMap::new();
        for edge in edges {
            let targets = restricted.entry(edge.status).or_default();
            for status in edge.restricted {
                if status != edge.status && !targets.contains(&status) {
                    targets.push(status);
                }
            }
        }
        Self { restricted }
    }

    /// Statuses that may not overwrite `status`.
    pub fn restricted_from(&self, status: MetricStatus) -> &[MetricStatus] {
        self.restricted.get(&status).map_or(&[], Vec::as_slice)
    }

    /// Returns the status a node ends up with when `new` is proposed while it
    /// currently holds `old`.
    ///
    /// Total and infallible: pairs absent from the graph adopt `new`.
    pub fn select(&self, old: MetricStatus, new: MetricStatus) -> MetricStatus {
        if old == new || self.restricted_from(old).contains(&new) {
            old
        } else {
            new
        }
    }

    /// Edge sets of this policy, sorted by status, suitable for serializing
    /// back into configuration.
    pub fn edges(&self) -> Vec<StatusRestriction> {
        let mut edges: Vec<StatusRestriction> = self
            .restricted
            .iter()
            .map(|(status, restricted)| StatusRestriction {
                status: *status,
                restricted: restricted.clone(),
            })
            .collect();
        edges.sort_by_key(|edge| edge.status);
        edges
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        let operator_set = [MetricStatus::Simple, MetricStatus::AutoHidden];
        Self::from_edges([
            StatusRestriction { status: MetricStatus::Ban, restricted: operator_set.to_vec() },
            StatusRestriction { status: MetricStatus::Hidden, restricted: operator_set.to_vec() },
            StatusRestriction { status: MetricStatus::Approved, restricted: operator_set.to_vec() },
        ])
    }
}
