//! Shared domain types.
//!
//! These types are plain values: built once, never mutated, and kept
//! serializable where they end up in the JSON summary.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of NSS parameters (four betas, two taus).
pub const PARAM_COUNT: usize = 6;

/// A single `(maturity, yield)` quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Maturity in years.
    pub maturity: f64,
    /// Yield as a decimal fraction (`0.045` for 4.5%).
    #[serde(rename = "yield")]
    pub yield_: f64,
}

/// Observed curve points for one market.
///
/// Only constructible through validating constructors, so every set seen by the
/// core is non-empty with finite, strictly positive maturities and finite yields.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    points: Vec<Observation>,
}

impl ObservationSet {
    /// Build from parallel maturity / yield slices.
    pub fn new(maturities: &[f64], yields: &[f64]) -> Result<Self, AppError> {
        if maturities.len() != yields.len() {
            return Err(AppError::invalid(format!(
                "maturities and yields differ in length ({} vs {})",
                maturities.len(),
                yields.len()
            )));
        }
        let points = maturities
            .iter()
            .zip(yields)
            .map(|(&maturity, &yield_)| Observation { maturity, yield_ })
            .collect();
        Self::from_observations(points)
    }

    pub fn from_observations(points: Vec<Observation>) -> Result<Self, AppError> {
        if points.is_empty() {
            return Err(AppError::invalid("observation set is empty"));
        }
        for (i, p) in points.iter().enumerate() {
            if !(p.maturity.is_finite() && p.maturity > 0.0) {
                return Err(AppError::invalid(format!(
                    "observation {i}: maturity must be finite and > 0, got {}",
                    p.maturity
                )));
            }
            if !p.yield_.is_finite() {
                return Err(AppError::invalid(format!(
                    "observation {i}: yield must be finite, got {}",
                    p.yield_
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn maturities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.maturity).collect()
    }

    pub fn yields(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.yield_).collect()
    }

    pub fn mean_yield(&self) -> f64 {
        self.points.iter().map(|p| p.yield_).sum::<f64>() / self.points.len() as f64
    }

    /// Number of distinct maturities (the NSS fit is under-determined below six).
    pub fn distinct_maturities(&self) -> usize {
        let mut m = self.maturities();
        m.sort_by(|a, b| a.total_cmp(b));
        m.dedup();
        m.len()
    }

    /// Observed maturity range `(min, max)`.
    pub fn maturity_range(&self) -> (f64, f64) {
        self.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.maturity), hi.max(p.maturity))
        })
    }
}

/// Fitted NSS parameters `(β0, β1, β2, β3, τ1, τ2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    pub beta0: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub beta3: f64,
    pub tau1: f64,
    pub tau2: f64,
}

impl CurveParameters {
    pub fn from_array(x: [f64; PARAM_COUNT]) -> Self {
        Self {
            beta0: x[0],
            beta1: x[1],
            beta2: x[2],
            beta3: x[3],
            tau1: x[4],
            tau2: x[5],
        }
    }

    pub fn to_array(self) -> [f64; PARAM_COUNT] {
        [self.beta0, self.beta1, self.beta2, self.beta3, self.tau1, self.tau2]
    }

    /// Build from a solver vector.
    ///
    /// # Panics
    /// Panics if `x.len() != PARAM_COUNT`.
    pub fn from_slice(x: &[f64]) -> Self {
        Self::from_array([x[0], x[1], x[2], x[3], x[4], x[5]])
    }

    /// Short-rate limit `y(0) = β0 + β1`.
    pub fn short_rate(&self) -> f64 {
        self.beta0 + self.beta1
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    GradientTolerance,
    ObjectiveTolerance,
    StepTolerance,
    Stagnation,
    MaxIterations,
}

impl TerminationReason {
    /// Whether the reason counts as convergence.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            TerminationReason::GradientTolerance
                | TerminationReason::ObjectiveTolerance
                | TerminationReason::StepTolerance
        )
    }
}

/// Optimizer diagnostics attached to a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub iterations: usize,
    pub objective_evaluations: usize,
    pub converged: bool,
    pub termination: TerminationReason,
}

/// Fit output for one market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: CurveParameters,
    /// RMSE at `params` over the observations used for fitting.
    pub rmse: f64,
    pub diagnostics: FitDiagnostics,
}

/// Descriptive statistics of a spread sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadStatistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (no Bessel correction).
    pub std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Payoff at expiry given forward `f` and strike `k`.
    pub fn intrinsic(self, f: f64, k: f64) -> f64 {
        match self {
            OptionKind::Call => (f - k).max(0.0),
            OptionKind::Put => (k - f).max(0.0),
        }
    }
}

/// One market's settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub label: String,
    /// Inflation assumption (decimal) used for the real yield.
    pub inflation: f64,
}

/// Where the two observation sets come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv { domestic: PathBuf, foreign: PathBuf },
    /// NSS-generated curves with seeded Gaussian noise (standard deviation in decimal yield).
    Synthetic { seed: u64, noise: f64 },
}

/// Option leg configuration. `None` strike/rate default to the forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionConfig {
    pub expiry: f64,
    pub volatility: f64,
    pub strike: Option<f64>,
    pub rate: Option<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub asof_date: NaiveDate,
    pub source: DataSource,
    pub domestic: MarketConfig,
    pub foreign: MarketConfig,
    pub target_tenor: f64,
    pub option: OptionConfig,
    pub max_iterations: usize,
    pub output: Option<PathBuf>,
}

/// Per-market section of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub label: String,
    pub observations: usize,
    pub params: CurveParameters,
    pub rmse: f64,
    pub converged: bool,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrySummary {
    pub target_tenor: f64,
    pub inflation_domestic: f64,
    pub inflation_foreign: f64,
    /// Foreign real yield minus domestic real yield.
    pub real_carry: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSummary {
    /// Maturity of the curve point the option is written on.
    pub underlying_maturity: f64,
    pub forward: f64,
    pub strike: f64,
    pub expiry: f64,
    pub rate: f64,
    pub volatility: f64,
    pub call: f64,
    pub put: f64,
}

/// Everything the driver persists and prints for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub analysis_date: NaiveDate,
    pub domestic: MarketSummary,
    pub foreign: MarketSummary,
    /// Foreign minus domestic fitted yields on the foreign maturity grid.
    pub spread_stats: SpreadStatistics,
    pub carry: CarrySummary,
    pub option: OptionSummary,
}
