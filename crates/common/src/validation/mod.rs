// Validation Module - gatekeeping for names entering the namespace
mod metric_name;

pub use metric_name::{MetricNameValidator, NameRejection};

/// Trait for field validators
pub trait FieldValidator<T: ?Sized> {
    /// Validate a field value
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// Type alias for validation results
pub type ValidationResult<T> = Result<T, NameRejection>;
