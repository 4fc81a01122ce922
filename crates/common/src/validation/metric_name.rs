// Metric name validator - length, dot structure, and character whitelist
use std::fmt;

use metricspace_domain::{is_dir, ValidationConfig};
use regex::Regex;

use super::{FieldValidator, ValidationResult};
use crate::error::{CommonError, CommonResult};

/// Reason a name was refused, in the order the rules are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    /// Metric shorter than the configured minimum length.
    TooShort { length: usize, min: usize },
    /// Name longer than the configured maximum length.
    TooLong { length: usize, max: usize },
    /// Name starts with a dot.
    LeadingDot,
    /// Directory name where only metrics are accepted.
    DirectoryNotAllowed,
    /// Two adjacent dots (empty level).
    EmptyLevel { position: usize },
    /// Metric with fewer dots than the configured minimum.
    TooFewDots { dots: usize, min: usize },
    /// Name with more dots than the configured maximum.
    TooManyDots { dots: usize, max: usize },
    /// Name does not match the configured pattern.
    PatternMismatch,
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { length, min } => {
                write!(f, "Length {} is below the minimum of {}", length, min)
            }
            Self::TooLong { length, max } => {
                write!(f, "Length {} exceeds the maximum of {}", length, max)
            }
            Self::LeadingDot => write!(f, "Name must not start with a dot"),
            Self::DirectoryNotAllowed => write!(f, "Directory names are not allowed here"),
            Self::EmptyLevel { position } => write!(f, "Empty level at position {}", position),
            Self::TooFewDots { dots, min } => {
                write!(f, "Name has {} dots, at least {} required", dots, min)
            }
            Self::TooManyDots { dots, max } => {
                write!(f, "Name has {} dots, at most {} allowed", dots, max)
            }
            Self::PatternMismatch => write!(f, "Name contains characters outside the allowed set"),
        }
    }
}

impl std::error::Error for NameRejection {}

/// Validates candidate metric and directory names before insertion.
///
/// Rules are checked in order and the first failure wins: length, dot
/// structure, then a full match against the configured pattern.
///
/// # Example
/// ```
/// use metricspace_common::validation::{MetricNameValidator, NameRejection};
/// use metricspace_domain::ValidationConfig;
///
/// let validator = MetricNameValidator::from_config(&ValidationConfig::default()).unwrap();
///
/// assert!(validator.validate("five_min.service.timings.p95", false));
/// assert!(!validator.validate("five_min..p95_timing", false));
/// assert_eq!(
///     validator.check("five_min.service.", false),
///     Err(NameRejection::DirectoryNotAllowed)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MetricNameValidator {
    pattern: Regex,
    min_length: usize,
    max_length: usize,
    min_dots: usize,
    max_dots: usize,
}

impl MetricNameValidator {
    /// Create a validator. The pattern must match the whole name; it is
    /// anchored if it is not already.
    ///
    /// # Errors
    /// Returns `CommonError::Validation` if the pattern does not compile.
    pub fn new(
        pattern: &str,
        min_length: usize,
        max_length: usize,
        min_dots: usize,
        max_dots: usize,
    ) -> CommonResult<Self> {
        let anchored = format!("^(?:{})$", strip_anchors(pattern));
        let pattern = Regex::new(&anchored).map_err(|e| {
            CommonError::validation_with_value("pattern", e.to_string(), pattern.to_string())
        })?;
        Ok(Self { pattern, min_length, max_length, min_dots, max_dots })
    }

    /// Create a validator from configuration.
    ///
    /// # Errors
    /// Returns `CommonError::Validation` if the configured pattern does not
    /// compile.
    pub fn from_config(config: &ValidationConfig) -> CommonResult<Self> {
        Self::new(
            &config.pattern,
            config.min_length,
            config.max_length,
            config.min_dots,
            config.max_dots,
        )
    }

    /// Returns `true` when the name may enter the tree.
    pub fn validate(&self, name: &str, allow_dirs: bool) -> bool {
        self.check(name, allow_dirs).is_ok()
    }

    /// Like [`validate`](Self::validate) but reports the first failing rule.
    ///
    /// # Errors
    /// Returns the [`NameRejection`] describing the first failed rule.
    pub fn check(&self, name: &str, allow_dirs: bool) -> ValidationResult<()> {
        let result = self.run_rules(name, allow_dirs);

        #[cfg(feature = "observability")]
        if let Err(ref rejection) = result {
            tracing::trace!(name, reason = %rejection, "metric name rejected");
        }

        result
    }

    fn run_rules(&self, name: &str, allow_dirs: bool) -> ValidationResult<()> {
        let is_dir = is_dir(name);
        self.check_length(name, is_dir)?;
        self.check_dots(name, allow_dirs, is_dir)?;
        if !self.pattern.is_match(name) {
            return Err(NameRejection::PatternMismatch);
        }
        Ok(())
    }

    fn check_length(&self, name: &str, is_dir: bool) -> ValidationResult<()> {
        let length = name.chars().count();
        if !is_dir && length < self.min_length {
            return Err(NameRejection::TooShort { length, min: self.min_length });
        }
        if length > self.max_length {
            return Err(NameRejection::TooLong { length, max: self.max_length });
        }
        Ok(())
    }

    fn check_dots(&self, name: &str, allow_dirs: bool, is_dir: bool) -> ValidationResult<()> {
        if name.is_empty() {
            return Err(NameRejection::EmptyLevel { position: 0 });
        }
        if name.starts_with('.') {
            return Err(NameRejection::LeadingDot);
        }
        if is_dir && !allow_dirs {
            return Err(NameRejection::DirectoryNotAllowed);
        }

        let mut dots = 0;
        let mut previous_dot: Option<usize> = None;
        for (position, _) in name.match_indices('.') {
            if previous_dot.is_some_and(|prev| prev + 1 == position) {
                return Err(NameRejection::EmptyLevel { position });
            }
            previous_dot = Some(position);
            dots += 1;
        }

        if !is_dir && dots < self.min_dots {
            return Err(NameRejection::TooFewDots { dots, min: self.min_dots });
        }
        if dots > self.max_dots {
            return Err(NameRejection::TooManyDots { dots, max: self.max_dots });
        }
        Ok(())
    }
}

/// Drops one leading `^` and one trailing unescaped `$`.
fn strip_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    match pattern.strip_suffix('$') {
        Some(body) if body.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0 => body,
        _ => pattern,
    }
}

impl FieldValidator<str> for MetricNameValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        self.check(value, false).map_err(|rejection| rejection.to_string())
    }
}
