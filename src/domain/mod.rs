//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated market observations (`Observation`, `ObservationSet`)
//! - fit outputs (`CurveParameters`, `FitResult`, `FitDiagnostics`)
//! - analytics outputs (`SpreadStatistics`, `OptionKind`)
//! - run configuration and the exported `RunSummary`

pub mod types;

pub use types::*;
