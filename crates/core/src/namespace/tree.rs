//! The metric namespace tree
//!
//! Concurrent index of dot-delimited metric names. Insertions walk from the
//! root creating missing directories; each directory serializes creation per
//! key, so there is no global lock and no node is ever created twice.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use metricspace_domain::{is_dir, split_to_levels, LimitsConfig, MetricStatus, StatusPolicy};

use super::node::{Fetched, MetricDir, MetricLeaf, NamespaceNode};
use super::ports::{FixedRetention, RetentionProvider, ResultSink};
use super::search::{self, LimitNotices, SearchOutcome};

/// Why an insertion was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    BannedAncestor,
    SubdirLimit,
    MetricLimit,
}

impl Rejection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::BannedAncestor => "banned_ancestor",
            Self::SubdirLimit => "subdir_limit",
            Self::MetricLimit => "metric_limit",
        }
    }
}

/// In-memory namespace of metrics and directories.
///
/// Names are expected to be validated before they reach the tree; see
/// [`MetricIndex`](super::MetricIndex) for the validating entry point.
///
/// # Example
/// ```
/// use metricspace_core::namespace::{MetricTree, VecSink};
/// use metricspace_domain::MetricStatus;
///
/// let tree = MetricTree::default();
/// tree.add("one_min.host-1.cpu");
/// tree.add("one_min.host-2.cpu");
/// tree.modify("one_min.host-2.", MetricStatus::Hidden);
///
/// let mut sink = VecSink::new();
/// tree.search("one_min.*.cpu", &mut sink).unwrap();
/// assert_eq!(sink.names(), ["one_min.host-1.cpu"]);
/// ```
pub struct MetricTree {
    root: Arc<MetricDir>,
    retention: Arc<dyn RetentionProvider>,
    policy: StatusPolicy,
    limits: LimitsConfig,
    notices: LimitNotices,
    dirs_created: AtomicUsize,
    metrics_created: AtomicUsize,
}

impl MetricTree {
    /// Creates an empty tree whose root is `Approved`.
    pub fn new(
        retention: Arc<dyn RetentionProvider>,
        policy: StatusPolicy,
        limits: LimitsConfig,
    ) -> Self {
        tracing::info!(
            max_subdirs_per_dir = limits.max_subdirs_per_dir,
            max_metrics_per_dir = limits.max_metrics_per_dir,
            "metric tree created"
        );
        Self {
            root: MetricDir::root(),
            retention,
            policy,
            limits,
            notices: LimitNotices::new(limits),
            dirs_created: AtomicUsize::new(0),
            metrics_created: AtomicUsize::new(0),
        }
    }

    /// Registers `name` with the `Simple` status.
    pub fn add(&self, name: &str) -> Option<NamespaceNode> {
        self.modify(name, MetricStatus::Simple)
    }

    /// Inserts `name` if needed and proposes `status` for it.
    ///
    /// A trailing dot addresses a directory. Missing intermediate directories
    /// are created `Simple`; a newly created terminal node starts with
    /// `status`, an existing one goes through the status policy.
    ///
    /// Returns `None` when an ancestor is banned or a capacity limit stops
    /// the creation of a missing node.
    ///
    /// The ban check and the child creation are separate steps. A ban that
    /// lands between them lets each in-flight insertion create at most one
    /// node per level under the banned directory. Such nodes sit behind the
    /// ban: searches and lookups never reach them, and later insertions are
    /// refused.
    pub fn modify(&self, name: &str, status: MetricStatus) -> Option<NamespaceNode> {
        let levels = split_to_levels(name);
        let (terminal, path) = levels.split_last()?;

        let mut dir = Arc::clone(&self.root);
        for level in path {
            self.ensure_not_banned(&dir, name)?;
            dir = self.fetch_or_create_dir(&dir, level, MetricStatus::Simple, name)?.0;
        }
        self.ensure_not_banned(&dir, name)?;

        let (node, created) = if is_dir(name) {
            let (child, created) = self.fetch_or_create_dir(&dir, terminal, status, name)?;
            (NamespaceNode::Dir(child), created)
        } else {
            let (metric, created) = self.fetch_or_create_metric(&dir, terminal, status, name)?;
            (NamespaceNode::Metric(metric), created)
        };

        if !created {
            let previous = node.status();
            let current = node.apply_status(&self.policy, status);
            if previous != current {
                tracing::debug!(
                    name,
                    from = previous.as_str(),
                    to = current.as_str(),
                    "status changed"
                );
            }
        }
        Some(node)
    }

    /// Finds a loaded metric without modifying the tree.
    ///
    /// Returns `None` when a directory on the way is missing or banned. The
    /// metric itself is returned whatever its status.
    ///
    /// # Panics
    /// Panics if `levels` is empty.
    pub fn maybe_find_metric<S: AsRef<str>>(&self, levels: &[S]) -> Option<Arc<MetricLeaf>> {
        let (terminal, path) = split_query(levels);
        self.descend(path, true)?.metric(terminal.as_ref())
    }

    /// Directory counterpart of [`maybe_find_metric`](Self::maybe_find_metric).
    ///
    /// # Panics
    /// Panics if `levels` is empty.
    pub fn maybe_find_dir<S: AsRef<str>>(&self, levels: &[S]) -> Option<Arc<MetricDir>> {
        let (terminal, path) = split_query(levels);
        self.descend(path, true)?.dir(terminal.as_ref())
    }

    /// Finds the directory that would hold the last level, ignoring bans.
    ///
    /// # Panics
    /// Panics if `levels` is empty.
    pub fn maybe_find_parent<S: AsRef<str>>(&self, levels: &[S]) -> Option<Arc<MetricDir>> {
        let (_, path) = split_query(levels);
        self.descend(path, false)
    }

    /// Streams every visible node matching `query` into `sink`.
    ///
    /// # Errors
    /// Returns the sink's error unchanged; entries already delivered stay
    /// delivered.
    pub fn search<S>(&self, query: &str, sink: &mut S) -> Result<SearchOutcome, S::Error>
    where
        S: ResultSink + ?Sized,
    {
        search::run(&self.root, query, &self.notices, sink)
    }

    /// Number of metrics created so far.
    pub fn metric_count(&self) -> usize {
        self.metrics_created.load(Ordering::Relaxed)
    }

    /// Number of directories created so far, root excluded.
    pub fn dir_count(&self) -> usize {
        self.dirs_created.load(Ordering::Relaxed)
    }

    pub fn root(&self) -> &Arc<MetricDir> {
        &self.root
    }

    pub const fn limits(&self) -> LimitsConfig {
        self.limits
    }

    pub const fn status_policy(&self) -> &StatusPolicy {
        &self.policy
    }

    fn descend<S: AsRef<str>>(&self, path: &[S], stop_at_ban: bool) -> Option<Arc<MetricDir>> {
        let mut dir = Arc::clone(&self.root);
        for level in path {
            if stop_at_ban && dir.status() == MetricStatus::Ban {
                return None;
            }
            dir = dir.dir(level.as_ref())?;
        }
        if stop_at_ban && dir.status() == MetricStatus::Ban {
            return None;
        }
        Some(dir)
    }

    fn ensure_not_banned(&self, dir: &MetricDir, name: &str) -> Option<()> {
        if dir.status() == MetricStatus::Ban {
            Self::reject(name, Rejection::BannedAncestor);
            return None;
        }
        Some(())
    }

    fn fetch_or_create_dir(
        &self,
        parent: &Arc<MetricDir>,
        level: &str,
        status: MetricStatus,
        name: &str,
    ) -> Option<(Arc<MetricDir>, bool)> {
        match parent.fetch_or_create_dir(level, status, self.limits.max_subdirs_per_dir) {
            Fetched::Existing(dir) => Some((dir, false)),
            Fetched::Created(dir) => {
                self.dirs_created.fetch_add(1, Ordering::Relaxed);
                Some((dir, true))
            }
            Fetched::LimitReached => {
                Self::reject(name, Rejection::SubdirLimit);
                None
            }
        }
    }

    fn fetch_or_create_metric(
        &self,
        parent: &Arc<MetricDir>,
        level: &str,
        status: MetricStatus,
        name: &str,
    ) -> Option<(Arc<MetricLeaf>, bool)> {
        let retention = || self.retention.retention_for(name);
        match parent.fetch_or_create_metric(level, status, self.limits.max_metrics_per_dir, retention) {
            Fetched::Existing(metric) => Some((metric, false)),
            Fetched::Created(metric) => {
                self.metrics_created.fetch_add(1, Ordering::Relaxed);
                Some((metric, true))
            }
            Fetched::LimitReached => {
                Self::reject(name, Rejection::MetricLimit);
                None
            }
        }
    }

    fn reject(name: &str, reason: Rejection) {
        tracing::debug!(name, reason = reason.as_str(), "namespace insertion rejected");
    }
}

impl Default for MetricTree {
    /// Tree with the default retention rule, the default status policy and no
    /// capacity limits.
    fn default() -> Self {
        Self::new(Arc::new(FixedRetention::default()), StatusPolicy::default(), LimitsConfig::default())
    }
}

impl std::fmt::Debug for MetricTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricTree")
            .field("dirs", &self.dir_count())
            .field("metrics", &self.metric_count())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

fn split_query<S>(levels: &[S]) -> (&S, &[S]) {
    assert!(!levels.is_empty(), "lookup requires at least one level");
    let last = levels.len() - 1;
    (&levels[last], &levels[..last])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::VecSink;
    use metricspace_domain::RetentionRule;
    use std::collections::BTreeSet;
    use std::convert::Infallible;
    use std::io;
    use std::ops::ControlFlow;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use crate::namespace::{SearchEntry, WriterSink};

    fn tree_with_limits(max_subdirs_per_dir: usize, max_metrics_per_dir: usize) -> MetricTree {
        MetricTree::new(
            Arc::new(FixedRetention::default()),
            StatusPolicy::default(),
            LimitsConfig { max_subdirs_per_dir, max_metrics_per_dir },
        )
    }

    fn search(tree: &MetricTree, query: &str) -> BTreeSet<String> {
        let mut sink = VecSink::new();
        let outcome = tree.search(query, &mut sink).unwrap();
        assert_eq!(outcome, SearchOutcome::Completed);
        sink.into_names().into_iter().collect()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    /// Validates that repeated insertion returns the same node.
    ///
    /// Assertions:
    /// - Ensures both calls hand back the same leaf.
    /// - Ensures counters only move on the first insertion.
    #[test]
    fn test_add_is_idempotent() {
        let tree = MetricTree::default();

        let first = tree.add("one_min.host.cpu").unwrap();
        let second = tree.add("one_min.host.cpu").unwrap();

        assert!(Arc::ptr_eq(first.as_metric().unwrap(), second.as_metric().unwrap()));
        assert_eq!(first.full_name(), "one_min.host.cpu");
        assert_eq!(tree.metric_count(), 1);
        assert_eq!(tree.dir_count(), 2);
    }

    /// Validates that a trailing dot addresses a directory.
    #[test]
    fn test_add_directory() {
        let tree = MetricTree::default();

        let node = tree.add("one_min.host.").unwrap();

        assert!(node.is_dir());
        assert_eq!(node.full_name(), "one_min.host.");
        assert!(tree.maybe_find_dir(&["one_min", "host"]).is_some());
        assert!(tree.maybe_find_metric(&["one_min", "host"]).is_none());
        assert_eq!(tree.metric_count(), 0);
    }

    /// Validates that a banned directory blocks everything beneath it.
    ///
    /// Assertions:
    /// - Ensures new names under the ban are refused.
    /// - Ensures lookups stop at the ban while parent lookup does not.
    /// - Ensures a plain re-add cannot lift the ban.
    #[test]
    fn test_ban_blocks_descendants() {
        let tree = MetricTree::default();
        tree.add("one_min.host.cpu").unwrap();

        let banned = tree.modify("one_min.host.", MetricStatus::Ban).unwrap();
        assert_eq!(banned.status(), MetricStatus::Ban);

        assert!(tree.add("one_min.host.mem").is_none());
        assert!(tree.maybe_find_metric(&["one_min", "host", "cpu"]).is_none());
        assert!(tree.maybe_find_parent(&["one_min", "host", "cpu"]).is_some());

        let readded = tree.add("one_min.host.").unwrap();
        assert_eq!(readded.status(), MetricStatus::Ban);
        assert!(search(&tree, "one_min.*").is_empty());
    }

    /// Validates that an operator can lift a ban with an explicit status.
    #[test]
    fn test_approve_lifts_ban() {
        let tree = MetricTree::default();
        tree.modify("one_min.host.", MetricStatus::Ban).unwrap();

        let approved = tree.modify("one_min.host.", MetricStatus::Approved).unwrap();

        assert_eq!(approved.status(), MetricStatus::Approved);
        assert!(tree.add("one_min.host.cpu").is_some());
    }

    /// Validates that a new terminal node starts with the requested status.
    #[test]
    fn test_new_node_takes_requested_status() {
        let tree = MetricTree::default();

        let hidden = tree.modify("one_min.host.cpu", MetricStatus::Hidden).unwrap();

        assert_eq!(hidden.status(), MetricStatus::Hidden);
        let parent = tree.maybe_find_dir(&["one_min", "host"]).unwrap();
        assert_eq!(parent.status(), MetricStatus::Simple);
    }

    /// Validates that the tree root cannot be banned through a name.
    #[test]
    fn test_root_is_approved() {
        let tree = MetricTree::default();
        assert_eq!(tree.root().status(), MetricStatus::Approved);
        assert_eq!(tree.root().full_name(), "");
    }

    /// Validates the subdirectory cap and its notice.
    ///
    /// Assertions:
    /// - Confirms K subdirectories are accepted and the (K+1)th refused.
    /// - Confirms existing keys are still reachable at the cap.
    /// - Confirms a `*` listing carries the limit notice.
    #[test]
    fn test_subdir_limit() {
        let tree = tree_with_limits(2, 0);
        assert!(tree.add("one_min.a.cpu").is_some());
        assert!(tree.add("one_min.b.cpu").is_some());
        assert!(tree.add("one_min.c.cpu").is_none());
        assert!(tree.add("one_min.a.mem").is_some());

        assert_eq!(
            search(&tree, "one_min.*"),
            names(&["one_min._SUBDIRS_LIMIT_REACHED_MAX_2", "one_min.a.", "one_min.b."])
        );
    }

    /// Validates the metric cap and its notice.
    #[test]
    fn test_metric_limit() {
        let tree = tree_with_limits(0, 2);
        assert!(tree.add("one_min.host.cpu").is_some());
        assert!(tree.add("one_min.host.mem").is_some());
        assert!(tree.add("one_min.host.disk").is_none());
        assert!(tree.add("one_min.host.cpu").is_some());
        assert_eq!(tree.metric_count(), 2);

        assert_eq!(
            search(&tree, "one_min.host.*"),
            names(&[
                "one_min.host._METRICS_LIMIT_REACHED_MAX_2",
                "one_min.host.cpu",
                "one_min.host.mem",
            ])
        );
        // Notices only accompany bare `*` listings
        assert_eq!(search(&tree, "one_min.host.c*"), names(&["one_min.host.cpu"]));
    }

    /// Validates literal, wildcard and glob queries.
    #[test]
    fn test_search_queries() {
        let tree = MetricTree::default();
        for name in [
            "one_min.web-1.cpu",
            "one_min.web-2.cpu",
            "one_min.web-2.mem",
            "one_min.db-1.cpu",
            "five_min.web-1.cpu",
        ] {
            tree.add(name).unwrap();
        }

        assert_eq!(search(&tree, "one_min.web-1.cpu"), names(&["one_min.web-1.cpu"]));
        assert_eq!(search(&tree, "one_min.web-1"), names(&["one_min.web-1."]));
        assert_eq!(search(&tree, "*"), names(&["one_min.", "five_min."]));
        assert_eq!(
            search(&tree, "one_min.*.cpu"),
            names(&["one_min.web-1.cpu", "one_min.web-2.cpu", "one_min.db-1.cpu"])
        );
        assert_eq!(
            search(&tree, "*.web-?.cpu"),
            names(&["one_min.web-1.cpu", "one_min.web-2.cpu", "five_min.web-1.cpu"])
        );
        assert_eq!(
            search(&tree, "one_min.web-2.{cpu,mem}"),
            names(&["one_min.web-2.cpu", "one_min.web-2.mem"])
        );
        assert_eq!(search(&tree, "one_min.web-[2-9].*"), names(&["one_min.web-2.cpu", "one_min.web-2.mem"]));
        assert!(search(&tree, "one_min.nothing.*").is_empty());
        assert!(search(&tree, "one_min.web-1.cpu.deeper").is_empty());
    }

    /// Validates that a metric and a directory may share a level name.
    #[test]
    fn test_search_returns_dir_and_metric_with_same_name() {
        let tree = MetricTree::default();
        tree.add("one_min.requests").unwrap();
        tree.add("one_min.requests.p95").unwrap();

        assert_eq!(search(&tree, "one_min.requests"), names(&["one_min.requests.", "one_min.requests"]));
    }

    /// Validates that hidden and banned nodes are invisible to search.
    ///
    /// Assertions:
    /// - Ensures a hidden metric is skipped.
    /// - Ensures a hidden directory prunes its subtree.
    /// - Ensures auto-hidden nodes are skipped as well.
    #[test]
    fn test_search_skips_invisible_nodes() {
        let tree = MetricTree::default();
        tree.add("one_min.web.cpu").unwrap();
        tree.add("one_min.web.mem").unwrap();
        tree.add("one_min.db.cpu").unwrap();
        tree.add("one_min.old.cpu").unwrap();

        tree.modify("one_min.web.mem", MetricStatus::Hidden).unwrap();
        tree.modify("one_min.db.", MetricStatus::Ban).unwrap();
        tree.modify("one_min.old.", MetricStatus::AutoHidden).unwrap();

        assert_eq!(search(&tree, "one_min.*.*"), names(&["one_min.web.cpu"]));
        assert_eq!(search(&tree, "one_min.*"), names(&["one_min.web."]));
        assert!(search(&tree, "one_min.web.mem").is_empty());
        assert!(search(&tree, "one_min.db.cpu").is_empty());
    }

    /// Validates that malformed glob levels yield nothing instead of failing.
    /// Validates that single-character wildcards and empty alternatives work
    /// on non-ASCII level names.
    #[test]
    fn test_search_unicode_levels() {
        let tree = MetricTree::default();
        tree.add("one_min.é.cpu").unwrap();
        tree.add("one_min.ab.cpu").unwrap();
        tree.add("one_min.host.cpu").unwrap();

        assert_eq!(search(&tree, "one_min.?.cpu"), names(&["one_min.é.cpu"]));
        assert_eq!(
            search(&tree, "one_min.{,ab}.cpu"),
            names(&["one_min.ab.cpu"])
        );
        assert_eq!(
            search(&tree, "one_min.{é,host}.cp?"),
            names(&["one_min.é.cpu", "one_min.host.cpu"])
        );
    }

    #[test]
    fn test_search_with_malformed_glob() {
        let tree = MetricTree::default();
        tree.add("one_min.web.cpu").unwrap();

        assert!(search(&tree, "one_min.[web.cpu").is_empty());
        assert!(search(&tree, "one_min.{web.cpu").is_empty());
        assert!(search(&tree, "one_min.web.cpu\\").is_empty());
    }

    /// Validates that a sink can stop the search early.
    #[test]
    fn test_search_stops_on_break() {
        let tree = MetricTree::default();
        for idx in 0..20 {
            tree.add(&format!("one_min.host-{idx}.cpu")).unwrap();
        }

        let mut sink = VecSink::with_limit(3);
        let outcome = tree.search("one_min.*.cpu", &mut sink).unwrap();

        assert_eq!(outcome, SearchOutcome::Stopped);
        assert_eq!(sink.len(), 3);
    }

    struct FailingSink {
        seen: usize,
    }

    impl ResultSink for FailingSink {
        type Error = io::Error;

        fn append(&mut self, _entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, io::Error> {
            self.seen += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }
    }

    /// Validates that sink errors reach the caller unchanged.
    #[test]
    fn test_search_propagates_sink_error() {
        let tree = MetricTree::default();
        tree.add("one_min.a.cpu").unwrap();
        tree.add("one_min.b.cpu").unwrap();

        let mut sink = FailingSink { seen: 0 };
        let err = tree.search("one_min.*.cpu", &mut sink).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.seen, 1);
    }

    /// Validates the line-oriented writer sink.
    #[test]
    fn test_writer_sink_lists_names() {
        let tree = MetricTree::default();
        tree.add("one_min.web.cpu").unwrap();

        let mut sink = WriterSink::new(Vec::new());
        tree.search("one_min.web.*", &mut sink).unwrap();

        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "one_min.web.cpu\n");
    }

    struct CountingRetention {
        calls: AtomicUsize,
    }

    impl RetentionProvider for CountingRetention {
        fn retention_for(&self, metric_name: &str) -> Arc<RetentionRule> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(RetentionRule::new(metric_name, "max", Vec::new()))
        }
    }

    /// Validates that retention is resolved once, with the full name.
    #[test]
    fn test_retention_resolved_on_creation() {
        let provider = Arc::new(CountingRetention { calls: AtomicUsize::new(0) });
        let tree = MetricTree::new(provider.clone(), StatusPolicy::default(), LimitsConfig::default());

        let metric = tree.add("one_min.web.cpu").unwrap();
        tree.add("one_min.web.cpu").unwrap();
        tree.add("one_min.web.").unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(metric.as_metric().unwrap().retention().name, "one_min.web.cpu");
    }

    /// Validates that concurrent writers create each node exactly once.
    #[test]
    fn test_concurrent_inserts_create_once() {
        let tree = Arc::new(MetricTree::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    for host in 0..50 {
                        for metric in ["cpu", "mem", "disk"] {
                            tree.add(&format!("one_min.host-{host}.{metric}")).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tree.metric_count(), 150);
        assert_eq!(tree.dir_count(), 51);
        assert_eq!(tree.root().loaded_metric_count(), 150);
        assert_eq!(tree.root().loaded_dir_count(), 51);
    }

    /// Validates that concurrent writers never push a directory past its cap.
    #[test]
    fn test_concurrent_inserts_respect_limit() {
        let tree = Arc::new(tree_with_limits(0, 10));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    (0..25)
                        .filter(|idx| tree.add(&format!("one_min.host.m{worker}_{idx}")).is_some())
                        .count()
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();

        assert_eq!(accepted, 10);
        assert_eq!(tree.metric_count(), 10);
        assert_eq!(tree.maybe_find_dir(&["one_min", "host"]).unwrap().metric_count(), 10);
    }

    /// Validates that status changes race safely with the policy applied.
    #[test]
    fn test_concurrent_ban_is_sticky() {
        let tree = Arc::new(MetricTree::default());
        tree.add("one_min.host.").unwrap();
        tree.modify("one_min.host.", MetricStatus::Ban).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    for _ in 0..100 {
                        tree.add("one_min.host.");
                        tree.modify("one_min.host.", MetricStatus::AutoHidden);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let dir = tree.maybe_find_parent(&["one_min", "host", "x"]).unwrap();
        assert_eq!(dir.status(), MetricStatus::Ban);
    }

    /// Validates that nodes racing a ban stay behind it.
    ///
    /// Assertions:
    /// - Ensures no search or lookup reaches anything under the banned dir.
    /// - Ensures insertions after the ban are refused.
    #[test]
    fn test_inserts_racing_a_ban_stay_unreachable() {
        let tree = Arc::new(MetricTree::default());
        tree.add("one_min.host.").unwrap();

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    for idx in 0..100 {
                        tree.add(&format!("one_min.host.w{worker}.m{idx}"));
                    }
                })
            })
            .collect();
        tree.modify("one_min.host.", MetricStatus::Ban).unwrap();
        for handle in writers {
            handle.join().unwrap();
        }

        assert_eq!(search(&tree, "one_min.*"), BTreeSet::new());
        assert!(search(&tree, "one_min.host.*.*").is_empty());
        assert!(tree.maybe_find_dir(&["one_min", "host", "w0"]).is_none());
        assert!(tree.maybe_find_metric(&["one_min", "host", "w0", "m0"]).is_none());
        assert!(tree.add("one_min.host.w0.late").is_none());
    }

    /// Validates that empty lookups are rejected loudly.
    #[test]
    #[should_panic(expected = "at least one level")]
    fn test_empty_lookup_panics() {
        let tree = MetricTree::default();
        let empty: [&str; 0] = [];
        let _ = tree.maybe_find_metric(&empty);
    }

    #[test]
    fn test_infallible_sink_type() {
        fn assert_infallible<S: ResultSink<Error = Infallible>>(_: &S) {}
        assert_infallible(&VecSink::new());
    }
}
