//! Nelson–Siegel–Svensson curve model.
//!
//! The model is implemented as small, pure functions so that the fitter, the
//! spread analysis and the option leg can all evaluate curves the same way.

pub mod model;

pub use model::*;
