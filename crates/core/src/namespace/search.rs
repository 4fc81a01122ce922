//! Glob search over the namespace tree
//!
//! A query is split into levels and walked from the root. Literal levels are
//! looked up by key, `*` expands to every child, other patterns are matched
//! level by level. Hidden and banned directories prune their whole subtree.
//! Results are pushed to a [`ResultSink`] as they are found, in map
//! iteration order.

use std::convert::Infallible;
use std::io::{self, Write};
use std::ops::ControlFlow;

use metricspace_domain::constants::{METRICS_LIMIT_NOTICE_PREFIX, SUBDIRS_LIMIT_NOTICE_PREFIX};
use metricspace_domain::LimitsConfig;

use super::node::{MetricDir, MetricLeaf};
use super::pattern::QueryLevel;
use super::ports::ResultSink;

type Flow<E> = Result<ControlFlow<()>, E>;

/// Returns early from the enclosing walk when a step asks to stop.
macro_rules! forward_break {
    ($step:expr) => {
        if $step?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    };
}

/// One search result, borrowed from the tree.
#[derive(Debug, Clone, Copy)]
pub enum SearchEntry<'a> {
    Dir(&'a MetricDir),
    Metric(&'a MetricLeaf),
    /// Marker telling the reader that `dir` stopped accepting children of
    /// one kind, so the listing is incomplete.
    LimitNotice { dir: &'a MetricDir, marker: &'a str },
}

impl SearchEntry<'_> {
    /// Full dotted name as shown to clients. Directories keep their trailing
    /// dot; a notice is the directory name followed by its marker.
    pub fn full_name(&self) -> String {
        match self {
            Self::Dir(dir) => dir.full_name(),
            Self::Metric(metric) => metric.full_name(),
            Self::LimitNotice { dir, marker } => {
                let mut name = dir.full_name();
                name.push_str(marker);
                name
            }
        }
    }

    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    pub const fn is_limit_notice(&self) -> bool {
        matches!(self, Self::LimitNotice { .. })
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every matching entry was delivered.
    Completed,
    /// The sink asked to stop.
    Stopped,
}

impl SearchOutcome {
    pub const fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Limit notice markers, present only for capped partitions.
#[derive(Debug, Clone)]
pub(crate) struct LimitNotices {
    subdirs: Option<(usize, String)>,
    metrics: Option<(usize, String)>,
}

impl LimitNotices {
    pub(crate) fn new(limits: LimitsConfig) -> Self {
        let marker = |limit: usize, prefix: &str| (limit > 0).then(|| (limit, format!("{prefix}{limit}")));
        Self {
            subdirs: marker(limits.max_subdirs_per_dir, SUBDIRS_LIMIT_NOTICE_PREFIX),
            metrics: marker(limits.max_metrics_per_dir, METRICS_LIMIT_NOTICE_PREFIX),
        }
    }
}

/// Runs `query` from `root` into `sink`.
pub(crate) fn run<S>(
    root: &MetricDir,
    query: &str,
    notices: &LimitNotices,
    sink: &mut S,
) -> Result<SearchOutcome, S::Error>
where
    S: ResultSink + ?Sized,
{
    let levels: Vec<QueryLevel<'_>> =
        metricspace_domain::split_to_levels(query).into_iter().map(QueryLevel::parse).collect();
    let walk = Walk { levels: &levels, notices };

    Ok(match walk.dir(root, 0, sink)? {
        ControlFlow::Continue(()) => SearchOutcome::Completed,
        ControlFlow::Break(()) => SearchOutcome::Stopped,
    })
}

struct Walk<'w, 'q> {
    levels: &'w [QueryLevel<'q>],
    notices: &'w LimitNotices,
}

impl Walk<'_, '_> {
    fn dir<S>(&self, dir: &MetricDir, idx: usize, sink: &mut S) -> Flow<S::Error>
    where
        S: ResultSink + ?Sized,
    {
        if !dir.visible() {
            return Ok(ControlFlow::Continue(()));
        }
        let is_last = idx + 1 == self.levels.len();

        match &self.levels[idx] {
            QueryLevel::Literal(level) if is_last => {
                if let Some(child) = dir.dir(level) {
                    forward_break!(emit_visible(sink, SearchEntry::Dir(&child), child.visible()));
                }
                if let Some(metric) = dir.metric(level) {
                    forward_break!(emit_visible(sink, SearchEntry::Metric(&metric), metric.visible()));
                }
            }
            QueryLevel::Literal(level) => {
                if let Some(child) = dir.dir(level) {
                    return self.dir(&child, idx + 1, sink);
                }
            }
            QueryLevel::MatchAll if is_last => {
                forward_break!(self.limit_notices(dir, sink));
                for child in dir.child_dirs() {
                    forward_break!(emit_visible(sink, SearchEntry::Dir(&child), child.visible()));
                }
                for metric in dir.child_metrics() {
                    forward_break!(emit_visible(sink, SearchEntry::Metric(&metric), metric.visible()));
                }
            }
            QueryLevel::MatchAll => {
                for child in dir.child_dirs() {
                    forward_break!(self.dir(&child, idx + 1, sink));
                }
            }
            QueryLevel::Pattern(pattern) if is_last => {
                for child in dir.child_dirs().into_iter().filter(|child| pattern.matches(child.name())) {
                    forward_break!(emit_visible(sink, SearchEntry::Dir(&child), child.visible()));
                }
                for metric in dir.child_metrics().into_iter().filter(|metric| pattern.matches(metric.name())) {
                    forward_break!(emit_visible(sink, SearchEntry::Metric(&metric), metric.visible()));
                }
            }
            QueryLevel::Pattern(pattern) => {
                for child in dir.child_dirs().into_iter().filter(|child| pattern.matches(child.name())) {
                    forward_break!(self.dir(&child, idx + 1, sink));
                }
            }
            QueryLevel::Malformed(level) => {
                tracing::trace!(level, "malformed glob level matches nothing");
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn limit_notices<S>(&self, dir: &MetricDir, sink: &mut S) -> Flow<S::Error>
    where
        S: ResultSink + ?Sized,
    {
        if let Some((limit, marker)) = &self.notices.subdirs {
            if dir.dir_count() >= *limit {
                forward_break!(sink.append(&SearchEntry::LimitNotice { dir, marker: marker.as_str() }));
            }
        }
        if let Some((limit, marker)) = &self.notices.metrics {
            if dir.metric_count() >= *limit {
                forward_break!(sink.append(&SearchEntry::LimitNotice { dir, marker: marker.as_str() }));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn emit_visible<S>(sink: &mut S, entry: SearchEntry<'_>, visible: bool) -> Flow<S::Error>
where
    S: ResultSink + ?Sized,
{
    if visible {
        sink.append(&entry)
    } else {
        Ok(ControlFlow::Continue(()))
    }
}

/// Sink collecting full names, optionally capped.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    names: Vec<String>,
    limit: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the search once `limit` names have been collected.
    pub fn with_limit(limit: usize) -> Self {
        Self { names: Vec::new(), limit: Some(limit) }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.names.len() >= limit)
    }
}

impl ResultSink for VecSink {
    type Error = Infallible;

    fn append(&mut self, entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, Self::Error> {
        if self.is_full() {
            return Ok(ControlFlow::Break(()));
        }
        self.names.push(entry.full_name());
        Ok(if self.is_full() { ControlFlow::Break(()) } else { ControlFlow::Continue(()) })
    }
}

/// Sink writing one full name per line, the plain-text listing format.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for WriterSink<W> {
    type Error = io::Error;

    fn append(&mut self, entry: &SearchEntry<'_>) -> Result<ControlFlow<()>, Self::Error> {
        writeln!(self.writer, "{}", entry.full_name())?;
        Ok(ControlFlow::Continue(()))
    }
}
