//! Domain types and models

pub mod retention;

pub use retention::{RetentionPoint, RetentionRule};
