//! The analysis pipeline shared by `carry run` and `carry demo`.
//!
//! load observations -> fit both curves -> evaluate on the foreign grid ->
//! spread stats + real carry -> option on the foreign curve -> summary
//!
//! The CLI layer only handles presentation and persistence.

use tracing::info;

use crate::carry::{compute_real_carry, compute_spreads_stats, nearest_maturity_index};
use crate::domain::{
    CarrySummary, DataSource, FitResult, MarketSummary, ObservationSet, OptionSummary, RunConfig,
    RunSummary,
};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_markets};
use crate::models::nss_curve;
use crate::options::price_call_put;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub domestic: ObservationSet,
    pub foreign: ObservationSet,
    pub domestic_fit: FitResult,
    pub foreign_fit: FitResult,
    pub summary: RunSummary,
}

/// Load the configured observations and run the analysis.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (domestic, foreign) = match &config.source {
        DataSource::Csv { domestic, foreign } => {
            let d = crate::io::load_yield_csv(domestic)?;
            let f = crate::io::load_yield_csv(foreign)?;
            (d.observations, f.observations)
        }
        DataSource::Synthetic { seed, noise } => crate::data::sample_markets(*seed, *noise)?,
    };

    analyze(config, domestic, foreign)
}

/// Run the analysis on already-loaded observations.
pub fn analyze(
    config: &RunConfig,
    domestic: ObservationSet,
    foreign: ObservationSet,
) -> Result<RunOutput, AppError> {
    validate_config(config)?;

    let opts = FitOptions::with_max_iterations(config.max_iterations);
    let (domestic_fit, foreign_fit) = fit_markets(&domestic, &foreign, &opts)?;
    info!(
        domestic_rmse = domestic_fit.rmse,
        foreign_rmse = foreign_fit.rmse,
        "fitted NSS curves"
    );

    // Both fitted curves on the foreign market's maturities.
    let grid = foreign.maturities();
    let y_domestic = nss_curve(&domestic_fit.params, &grid);
    let y_foreign = nss_curve(&foreign_fit.params, &grid);
    let spread_stats = compute_spreads_stats(&grid, &y_foreign, &y_domestic)?;

    let real_carry = compute_real_carry(
        &foreign,
        &domestic,
        config.foreign.inflation,
        config.domestic.inflation,
        config.target_tenor,
    )?;

    let idx = nearest_maturity_index(&grid, config.target_tenor)
        .ok_or_else(|| AppError::invalid("foreign maturity grid is empty"))?;
    let forward = y_foreign[idx];
    let strike = config.option.strike.unwrap_or(forward);
    let rate = config.option.rate.unwrap_or(forward);
    let (call, put) = price_call_put(forward, strike, config.option.expiry, rate, config.option.volatility)?;
    info!(forward, strike, call, put, "priced option on foreign curve");

    let summary = RunSummary {
        analysis_date: config.asof_date,
        domestic: market_summary(&config.domestic.label, &domestic, &domestic_fit),
        foreign: market_summary(&config.foreign.label, &foreign, &foreign_fit),
        spread_stats,
        carry: CarrySummary {
            target_tenor: config.target_tenor,
            inflation_domestic: config.domestic.inflation,
            inflation_foreign: config.foreign.inflation,
            real_carry,
        },
        option: OptionSummary {
            underlying_maturity: grid[idx],
            forward,
            strike,
            expiry: config.option.expiry,
            rate,
            volatility: config.option.volatility,
            call,
            put,
        },
    };

    Ok(RunOutput {
        domestic,
        foreign,
        domestic_fit,
        foreign_fit,
        summary,
    })
}

fn market_summary(label: &str, obs: &ObservationSet, fit: &FitResult) -> MarketSummary {
    MarketSummary {
        label: label.to_string(),
        observations: obs.len(),
        params: fit.params,
        rmse: fit.rmse,
        converged: fit.diagnostics.converged,
        iterations: fit.diagnostics.iterations,
    }
}

fn validate_config(config: &RunConfig) -> Result<(), AppError> {
    if !(config.target_tenor.is_finite() && config.target_tenor > 0.0) {
        return Err(AppError::invalid(format!(
            "target tenor must be finite and > 0, got {}",
            config.target_tenor
        )));
    }
    if config.max_iterations == 0 {
        return Err(AppError::invalid("max iterations must be >= 1"));
    }
    for (label, infl) in [
        (&config.domestic.label, config.domestic.inflation),
        (&config.foreign.label, config.foreign.inflation),
    ] {
        if !infl.is_finite() {
            return Err(AppError::invalid(format!("inflation for {label} must be finite")));
        }
    }
    let opt = &config.option;
    if !(opt.expiry.is_finite() && opt.volatility.is_finite()) {
        return Err(AppError::invalid("option expiry and volatility must be finite"));
    }
    Ok(())
}
