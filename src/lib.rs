//! `carry-curves` library crate.
//!
//! Fits Nelson–Siegel–Svensson curves for a domestic and a foreign sovereign
//! market, compares them (spread statistics, real carry) and prices a Black-76
//! option on a point of the foreign curve.
//!
//! The binary (`carry`) is a thin wrapper around this library so that the
//! numerical core is testable without spawning processes.

pub mod app;
pub mod carry;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod options;
pub mod report;
