//! Curve fitting.
//!
//! Responsibilities:
//!
//! - box-constrained quasi-Newton minimization (`optimizer`)
//! - NSS fitting policy: start point, τ bounds, least squares β, best-effort results (`fitter`)

pub mod fitter;
pub mod optimizer;

pub use fitter::*;
pub use optimizer::*;
