//! Option pricing on curve points.

pub mod black76;

pub use black76::*;
