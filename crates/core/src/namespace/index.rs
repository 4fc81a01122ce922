//! Validating front door to the namespace tree

use std::sync::Arc;

use metricspace_common::validation::{MetricNameValidator, NameRejection};
use metricspace_domain::{Config, MetricStatus, MetricspaceError};

use super::node::NamespaceNode;
use super::ports::{ResultSink, RetentionProvider};
use super::search::SearchOutcome;
use super::tree::MetricTree;

/// Validator and tree wired together.
///
/// Ingested names may only address metrics; operator status changes may
/// address directories as well.
#[derive(Debug)]
pub struct MetricIndex {
    validator: MetricNameValidator,
    tree: MetricTree,
}

impl MetricIndex {
    pub const fn new(validator: MetricNameValidator, tree: MetricTree) -> Self {
        Self { validator, tree }
    }

    /// Builds the validator and tree described by `config`.
    ///
    /// # Errors
    /// Returns `MetricspaceError::InvalidPattern` if the configured name
    /// pattern does not compile.
    pub fn from_config(
        config: &Config,
        retention: Arc<dyn RetentionProvider>,
    ) -> metricspace_domain::Result<Self> {
        let validator = MetricNameValidator::from_config(&config.validation)
            .map_err(|e| MetricspaceError::InvalidPattern(e.to_string()))?;
        let tree = MetricTree::new(retention, config.status_policy(), config.limits);
        Ok(Self::new(validator, tree))
    }

    /// Validates and registers an ingested metric name.
    ///
    /// # Errors
    /// Returns the [`NameRejection`] when the name fails validation. An
    /// accepted name may still be refused by the tree (`Ok(None)`).
    pub fn add(&self, name: &str) -> Result<Option<NamespaceNode>, NameRejection> {
        self.validator.check(name, false)?;
        Ok(self.tree.add(name))
    }

    /// Validates `name` (metric or directory) and proposes `status` for it.
    ///
    /// # Errors
    /// Returns the [`NameRejection`] when the name fails validation.
    pub fn modify(
        &self,
        name: &str,
        status: MetricStatus,
    ) -> Result<Option<NamespaceNode>, NameRejection> {
        self.validator.check(name, true)?;
        Ok(self.tree.modify(name, status))
    }

    /// See [`MetricTree::search`].
    ///
    /// # Errors
    /// Returns the sink's error unchanged.
    pub fn search<S>(&self, query: &str, sink: &mut S) -> Result<SearchOutcome, S::Error>
    where
        S: ResultSink + ?Sized,
    {
        self.tree.search(query, sink)
    }

    pub const fn tree(&self) -> &MetricTree {
        &self.tree
    }

    pub const fn validator(&self) -> &MetricNameValidator {
        &self.validator
    }
}
