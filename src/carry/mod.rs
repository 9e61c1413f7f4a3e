//! Cross-market spread and carry analytics.

pub mod spread;

pub use spread::*;
