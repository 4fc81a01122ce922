//! Domain utilities

pub mod levels;
