//! Mathematical utilities: NSS loadings, least squares and the normal CDF.

pub mod basis;
pub mod normal;
pub mod ols;

pub use basis::*;
pub use normal::*;
pub use ols::*;
