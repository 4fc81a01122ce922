//! Level helpers for dot-delimited names
//!
//! A name such as `five_min.service.timings.p95` consists of levels separated
//! by `.`. A trailing dot marks a directory (`five_min.service.`).

use crate::constants::{GLOB_METACHARACTERS, LEVEL_SEPARATOR, MATCH_ALL_PATTERN};

/// Returns `true` when `name` denotes a directory (ends with a dot).
pub fn is_dir(name: &str) -> bool {
    name.ends_with(LEVEL_SEPARATOR)
}

/// Splits a name into its levels, dropping the directory marker.
///
/// ```
/// use metricspace_domain::split_to_levels;
///
/// assert_eq!(split_to_levels("one_min.host.cpu"), vec!["one_min", "host", "cpu"]);
/// assert_eq!(split_to_levels("one_min.host."), vec!["one_min", "host"]);
/// ```
pub fn split_to_levels(name: &str) -> Vec<&str> {
    name.strip_suffix(LEVEL_SEPARATOR).unwrap_or(name).split(LEVEL_SEPARATOR).collect()
}

/// Joins levels back into a metric name.
pub fn join_levels<S: AsRef<str>>(levels: &[S]) -> String {
    let mut name = String::with_capacity(levels.iter().map(|l| l.as_ref().len() + 1).sum());
    for (idx, level) in levels.iter().enumerate() {
        if idx > 0 {
            name.push(LEVEL_SEPARATOR);
        }
        name.push_str(level.as_ref());
    }
    name
}

/// Returns `true` when a query level contains a glob metacharacter.
pub fn contains_expressions(level: &str) -> bool {
    level.contains(GLOB_METACHARACTERS)
}

/// Returns `true` for the bare match-all level `*`.
pub fn is_match_all(level: &str) -> bool {
    level == MATCH_ALL_PATTERN
}
