//! Spread statistics and real carry between two markets.
//!
//! Conventions: "a" is the market whose yields are on the left of the
//! difference (the foreign market in the pipeline), "b" the one subtracted.

use crate::domain::{ObservationSet, SpreadStatistics};
use crate::error::AppError;

/// Tenor (years) used for the headline carry number.
pub const DEFAULT_TARGET_TENOR: f64 = 10.0;

/// Statistics of `curve_a - curve_b` sampled on `maturities`.
pub fn compute_spreads_stats(
    maturities: &[f64],
    curve_a: &[f64],
    curve_b: &[f64],
) -> Result<SpreadStatistics, AppError> {
    if maturities.is_empty() {
        return Err(AppError::invalid("spread grid is empty"));
    }
    if curve_a.len() != maturities.len() || curve_b.len() != maturities.len() {
        return Err(AppError::invalid(format!(
            "spread inputs differ in length (grid={}, a={}, b={})",
            maturities.len(),
            curve_a.len(),
            curve_b.len()
        )));
    }

    let spread: Vec<f64> = curve_a.iter().zip(curve_b).map(|(a, b)| a - b).collect();
    let n = spread.len() as f64;

    let mean = spread.iter().sum::<f64>() / n;
    let min = spread.iter().copied().fold(f64::INFINITY, f64::min);
    let max = spread.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let var = spread.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;

    Ok(SpreadStatistics {
        mean,
        min,
        max,
        std: var.sqrt(),
    })
}

/// Index of the maturity closest to `target`; ties go to the first occurrence.
pub fn nearest_maturity_index(maturities: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &m) in maturities.iter().enumerate() {
        let dist = (m - target).abs();
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Real carry of market a over market b at the observation nearest `target_tenor`.
///
/// ```text
/// real_carry = (y_a - infl_a) - (y_b - infl_b)
/// ```
pub fn compute_real_carry(
    curve_a_obs: &ObservationSet,
    curve_b_obs: &ObservationSet,
    infl_a: f64,
    infl_b: f64,
    target_tenor: f64,
) -> Result<f64, AppError> {
    if !(infl_a.is_finite() && infl_b.is_finite()) {
        return Err(AppError::invalid("inflation assumptions must be finite"));
    }
    if !target_tenor.is_finite() {
        return Err(AppError::invalid("target tenor must be finite"));
    }

    let real_a = real_yield_at(curve_a_obs, infl_a, target_tenor)?;
    let real_b = real_yield_at(curve_b_obs, infl_b, target_tenor)?;
    Ok(real_a - real_b)
}

fn real_yield_at(obs: &ObservationSet, inflation: f64, target_tenor: f64) -> Result<f64, AppError> {
    let idx = nearest_maturity_index(&obs.maturities(), target_tenor)
        .ok_or_else(|| AppError::invalid("observation set is empty"))?;
    Ok(obs.points()[idx].yield_ - inflation)
}
