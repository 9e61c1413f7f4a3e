//! Reporting: console summary of a run.

pub mod format;

pub use format::*;
