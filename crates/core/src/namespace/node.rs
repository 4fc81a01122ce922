//! Namespace nodes: directories and leaf metrics.
//!
//! Nodes are reference counted. Children are owned by their parent's child
//! maps, parents are referenced weakly so a node can rebuild its full name
//! without creating a cycle.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metricspace_domain::constants::LEVEL_SEPARATOR;
use metricspace_domain::{MetricStatus, RetentionRule, StatusPolicy};

/// Shard count of each directory's child maps. Directories are numerous and
/// mostly small, so the default (a multiple of the CPU count) is too heavy.
const CHILD_MAP_SHARDS: usize = 8;

type ChildMap<V> = DashMap<String, Arc<V>>;

/// Status cell updated with compare-and-swap.
struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    fn new(status: MetricStatus) -> Self {
        Self(AtomicU8::new(status.code()))
    }

    fn load(&self) -> MetricStatus {
        MetricStatus::from_code(self.0.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Applies `policy.select(current, proposed)` atomically and returns the
    /// resulting status.
    fn apply(&self, policy: &StatusPolicy, proposed: MetricStatus) -> MetricStatus {
        let mut selected = proposed;
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |code| {
            let current = MetricStatus::from_code(code).unwrap_or_default();
            selected = policy.select(current, proposed);
            (selected != current).then_some(selected.code())
        });
        selected
    }
}

impl fmt::Debug for AtomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

/// Result of a fetch-or-create on a child map.
pub(crate) enum Fetched<V> {
    /// The key already held a node.
    Existing(Arc<V>),
    /// A node was created by this call.
    Created(Arc<V>),
    /// The key was absent and the partition is full.
    LimitReached,
}

/// Directory node. Holds child directories and leaf metrics in two separate
/// partitions, each with its own capacity counter.
pub struct MetricDir {
    name: String,
    parent: Weak<MetricDir>,
    status: AtomicStatus,
    dirs: OnceLock<ChildMap<MetricDir>>,
    metrics: OnceLock<ChildMap<MetricLeaf>>,
    dir_slots: AtomicUsize,
    metric_slots: AtomicUsize,
}

impl MetricDir {
    pub(crate) fn root() -> Arc<Self> {
        Arc::new(Self::new(String::new(), Weak::new(), MetricStatus::Approved))
    }

    fn new(name: String, parent: Weak<Self>, status: MetricStatus) -> Self {
        Self {
            name,
            parent,
            status: AtomicStatus::new(status),
            dirs: OnceLock::new(),
            metrics: OnceLock::new(),
            dir_slots: AtomicUsize::new(0),
            metric_slots: AtomicUsize::new(0),
        }
    }

    /// Level name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted name with the trailing directory marker, e.g.
    /// `one_min.host.`. The root's full name is empty.
    pub fn full_name(&self) -> String {
        let mut name = String::new();
        self.write_path(&mut name);
        name
    }

    fn write_path(&self, out: &mut String) {
        if let Some(parent) = self.parent.upgrade() {
            parent.write_path(out);
            out.push_str(&self.name);
            out.push(LEVEL_SEPARATOR);
        }
    }

    /// Returns `true` for the tree root.
    pub fn is_root(&self) -> bool {
        self.parent.strong_count() == 0 && self.name.is_empty()
    }

    /// Current status.
    pub fn status(&self) -> MetricStatus {
        self.status.load()
    }

    /// Whether searches list this directory and descend into it.
    pub fn visible(&self) -> bool {
        self.status().visible()
    }

    /// Parent directory, `None` for the root.
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.upgrade()
    }

    /// Child directory stored under `level`.
    pub fn dir(&self, level: &str) -> Option<Arc<Self>> {
        self.dirs.get()?.get(level).map(|entry| Arc::clone(entry.value()))
    }

    /// Leaf metric stored under `level`.
    pub fn metric(&self, level: &str) -> Option<Arc<MetricLeaf>> {
        self.metrics.get()?.get(level).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of direct child directories.
    pub fn dir_count(&self) -> usize {
        self.dirs.get().map_or(0, DashMap::len)
    }

    /// Number of direct leaf metrics.
    pub fn metric_count(&self) -> usize {
        self.metrics.get().map_or(0, DashMap::len)
    }

    /// Number of directories in this subtree, excluding this one.
    pub fn loaded_dir_count(&self) -> usize {
        self.child_dirs().iter().map(|dir| 1 + dir.loaded_dir_count()).sum()
    }

    /// Number of leaf metrics in this subtree.
    pub fn loaded_metric_count(&self) -> usize {
        self.metric_count() + self.child_dirs().iter().map(|dir| dir.loaded_metric_count()).sum::<usize>()
    }

    /// Snapshot of the direct child directories, in map order.
    ///
    /// Each shard is read-locked only while it is copied, so callers can
    /// recurse or block on the result without holding up writers.
    pub fn child_dirs(&self) -> Vec<Arc<Self>> {
        snapshot(self.dirs.get())
    }

    /// Snapshot of the direct leaf metrics, in map order.
    pub fn child_metrics(&self) -> Vec<Arc<MetricLeaf>> {
        snapshot(self.metrics.get())
    }

    pub(crate) fn apply_status(&self, policy: &StatusPolicy, proposed: MetricStatus) -> MetricStatus {
        self.status.apply(policy, proposed)
    }

    pub(crate) fn fetch_or_create_dir(
        self: &Arc<Self>,
        level: &str,
        status: MetricStatus,
        limit: usize,
    ) -> Fetched<Self> {
        let map = self.dirs.get_or_init(new_child_map);
        fetch_or_create(map, &self.dir_slots, level, limit, || {
            Self::new(level.to_owned(), Arc::downgrade(self), status)
        })
    }

    pub(crate) fn fetch_or_create_metric<F>(
        self: &Arc<Self>,
        level: &str,
        status: MetricStatus,
        limit: usize,
        retention: F,
    ) -> Fetched<MetricLeaf>
    where
        F: FnOnce() -> Arc<RetentionRule>,
    {
        let map = self.metrics.get_or_init(new_child_map);
        fetch_or_create(map, &self.metric_slots, level, limit, || MetricLeaf {
            name: level.to_owned(),
            parent: Arc::downgrade(self),
            status: AtomicStatus::new(status),
            retention: retention(),
        })
    }
}

impl fmt::Debug for MetricDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDir")
            .field("name", &self.full_name())
            .field("status", &self.status)
            .field("dirs", &self.dir_count())
            .field("metrics", &self.metric_count())
            .finish()
    }
}

/// Leaf metric node.
pub struct MetricLeaf {
    name: String,
    parent: Weak<MetricDir>,
    status: AtomicStatus,
    retention: Arc<RetentionRule>,
}

impl MetricLeaf {
    /// Level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted name, e.g. `one_min.host.cpu`.
    pub fn full_name(&self) -> String {
        let mut name = self.parent.upgrade().map(|dir| dir.full_name()).unwrap_or_default();
        name.push_str(&self.name);
        name
    }

    /// Current status.
    pub fn status(&self) -> MetricStatus {
        self.status.load()
    }

    /// Whether searches list this metric.
    pub fn visible(&self) -> bool {
        self.status().visible()
    }

    /// Retention rule resolved when the metric was created.
    pub fn retention(&self) -> &Arc<RetentionRule> {
        &self.retention
    }

    /// Owning directory, `None` once the tree is dropped.
    pub fn parent(&self) -> Option<Arc<MetricDir>> {
        self.parent.upgrade()
    }

    pub(crate) fn apply_status(&self, policy: &StatusPolicy, proposed: MetricStatus) -> MetricStatus {
        self.status.apply(policy, proposed)
    }
}

impl fmt::Debug for MetricLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricLeaf")
            .field("name", &self.full_name())
            .field("status", &self.status)
            .field("retention", &self.retention.name)
            .finish()
    }
}

/// Node returned by an insertion: either kind, shared with the tree.
#[derive(Debug, Clone)]
pub enum NamespaceNode {
    Dir(Arc<MetricDir>),
    Metric(Arc<MetricLeaf>),
}

impl NamespaceNode {
    /// Level name of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Dir(dir) => dir.name(),
            Self::Metric(metric) => metric.name(),
        }
    }

    /// Full dotted name; directories keep the trailing separator.
    pub fn full_name(&self) -> String {
        match self {
            Self::Dir(dir) => dir.full_name(),
            Self::Metric(metric) => metric.full_name(),
        }
    }

    /// Status after the insertion that returned this node.
    pub fn status(&self) -> MetricStatus {
        match self {
            Self::Dir(dir) => dir.status(),
            Self::Metric(metric) => metric.status(),
        }
    }

    pub fn visible(&self) -> bool {
        self.status().visible()
    }

    /// Returns `true` for a directory node.
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    /// The directory, if this is one.
    pub fn as_dir(&self) -> Option<&Arc<MetricDir>> {
        match self {
            Self::Dir(dir) => Some(dir),
            Self::Metric(_) => None,
        }
    }

    /// The leaf metric, if this is one.
    pub fn as_metric(&self) -> Option<&Arc<MetricLeaf>> {
        match self {
            Self::Metric(metric) => Some(metric),
            Self::Dir(_) => None,
        }
    }

    pub(crate) fn apply_status(&self, policy: &StatusPolicy, proposed: MetricStatus) -> MetricStatus {
        match self {
            Self::Dir(dir) => dir.apply_status(policy, proposed),
            Self::Metric(metric) => metric.apply_status(policy, proposed),
        }
    }
}

fn snapshot<V>(map: Option<&ChildMap<V>>) -> Vec<Arc<V>> {
    map.map_or_else(Vec::new, |map| map.iter().map(|entry| Arc::clone(entry.value())).collect())
}

fn new_child_map<V>() -> ChildMap<V> {
    DashMap::with_shard_amount(CHILD_MAP_SHARDS)
}

/// Reserves one slot in `counter` unless `limit` (0 = unlimited) is reached.
fn reserve_slot(counter: &AtomicUsize, limit: usize) -> bool {
    counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
            (limit == 0 || count < limit).then_some(count + 1)
        })
        .is_ok()
}

/// Looks `level` up and creates it when absent.
///
/// The entry guard serializes creators of the same key, so `create` runs at
/// most once per key. The node is built completely before it is published.
fn fetch_or_create<V, F>(
    map: &ChildMap<V>,
    counter: &AtomicUsize,
    level: &str,
    limit: usize,
    create: F,
) -> Fetched<V>
where
    F: FnOnce() -> V,
{
    if let Some(existing) = map.get(level) {
        return Fetched::Existing(Arc::clone(existing.value()));
    }
    match map.entry(level.to_owned()) {
        Entry::Occupied(entry) => Fetched::Existing(Arc::clone(entry.get())),
        Entry::Vacant(entry) => {
            if !reserve_slot(counter, limit) {
                return Fetched::LimitReached;
            }
            let node = Arc::new(create());
            entry.insert(Arc::clone(&node));
            Fetched::Created(node)
        }
    }
}
