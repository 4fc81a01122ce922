//! Regex-driven retention lookup
//!
//! Rules are tried in configuration order against the full metric name; the
//! first matching pattern decides the rule, otherwise the default applies.

use std::sync::Arc;

use metricspace_core::namespace::RetentionProvider;
use metricspace_domain::{MetricspaceError, Result, RetentionConfig, RetentionRule};
use regex::Regex;

/// [`RetentionProvider`] backed by an ordered list of regular expressions.
#[derive(Debug, Clone)]
pub struct RegexRetentionProvider {
    rules: Vec<(Regex, Arc<RetentionRule>)>,
    default: Arc<RetentionRule>,
}

impl RegexRetentionProvider {
    /// Provider with no pattern rules.
    pub fn new(default: RetentionRule) -> Self {
        Self { rules: Vec::new(), default: Arc::new(ordered(default)) }
    }

    /// Appends a rule; earlier rules take precedence.
    ///
    /// # Errors
    /// Returns `MetricspaceError::InvalidPattern` if `pattern` does not
    /// compile.
    pub fn with_rule(mut self, pattern: &str, rule: RetentionRule) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            MetricspaceError::InvalidPattern(format!("retention pattern '{}': {}", pattern, e))
        })?;
        self.rules.push((regex, Arc::new(ordered(rule))));
        Ok(self)
    }

    /// Builds the provider described by `config`.
    ///
    /// # Errors
    /// Returns `MetricspaceError::InvalidPattern` for the first pattern that
    /// does not compile.
    pub fn from_config(config: &RetentionConfig) -> Result<Self> {
        let provider = config
            .rules
            .iter()
            .try_fold(Self::new(config.default.clone()), |provider, entry| {
                provider.with_rule(&entry.pattern, entry.rule.clone())
            })?;
        tracing::info!(
            rules = provider.rules.len(),
            default = %provider.default.name,
            "retention rules loaded"
        );
        Ok(provider)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Rules deserialized from configuration arrive with their points in file
/// order; rebuilding through `RetentionRule::new` re-sorts them by age.
fn ordered(rule: RetentionRule) -> RetentionRule {
    RetentionRule::new(rule.name, rule.function, rule.points)
}

impl RetentionProvider for RegexRetentionProvider {
    fn retention_for(&self, metric_name: &str) -> Arc<RetentionRule> {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(metric_name))
            .map_or_else(|| Arc::clone(&self.default), |(_, rule)| Arc::clone(rule))
    }
}
