//! NSS curve fitting for a single market.
//!
//! With `(τ1, τ2)` fixed the model is linear in β, so the fit is a search over
//! the two decay parameters only. Every objective evaluation solves β by SVD
//! least squares at the current τ and returns the resulting mean squared error
//! (same minimizer as the RMSE, but smooth at zero residual):
//!
//! ```text
//! F(τ1, τ2) = min_β MSE(β, τ1, τ2)
//! ```
//!
//! Since β is optimal at every τ, `∂F/∂τ` is the partial τ-derivative of the
//! MSE at the least squares β. A projected BFGS search then runs on `F`:
//!
//! - τ1 and τ2 are bounded below by `TAU_FLOOR`
//! - the start point is fixed: `β0 = mean(y)`, `β1 = -1`, `β2 = 1`, `β3 = 0.5`,
//!   `τ1 = 1`, `τ2 = 5`; only its τ part seeds the search
//! - non-convergence is not an error: the best iterate and its RMSE are returned

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::domain::{CurveParameters, FitDiagnostics, FitResult, ObservationSet, PARAM_COUNT};
use crate::error::AppError;
use crate::fit::optimizer::{BoxConstraints, OptimizerOptions, ProjectedBfgs};
use crate::math::solve_least_squares;
use crate::models::{fill_design_row, mse_with_gradient, rmse};

/// Lower bound on both decay parameters.
pub const TAU_FLOOR: f64 = 1e-3;

/// Fitting options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub optimizer: OptimizerOptions,
    pub tau_floor: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            optimizer: OptimizerOptions::default(),
            tau_floor: TAU_FLOOR,
        }
    }
}

impl FitOptions {
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        let mut opts = Self::default();
        opts.optimizer.max_iterations = max_iterations;
        opts
    }
}

/// Deterministic start point for the search.
pub fn initial_guess(obs: &ObservationSet) -> CurveParameters {
    CurveParameters::from_array([obs.mean_yield(), -1.0, 1.0, 0.5, 1.0, 5.0])
}

/// Fit NSS parameters to one market's observations.
pub fn fit_nss_curve(obs: &ObservationSet, opts: &FitOptions) -> Result<FitResult, AppError> {
    if !(opts.tau_floor.is_finite() && opts.tau_floor > 0.0) {
        return Err(AppError::invalid(format!(
            "tau floor must be finite and > 0, got {}",
            opts.tau_floor
        )));
    }

    let distinct = obs.distinct_maturities();
    if distinct < PARAM_COUNT {
        let (lo, hi) = obs.maturity_range();
        debug!(
            distinct,
            "under-determined NSS fit; curve is unreliable outside [{lo:.2}, {hi:.2}]y"
        );
    }

    let bounds = BoxConstraints::lower_only(vec![opts.tau_floor; 2])?;
    let start = initial_guess(obs);
    let solver = ProjectedBfgs::new(opts.optimizer);
    let res = solver.minimize(&[start.tau1, start.tau2], &bounds, |tau| {
        profile_objective(obs, tau[0], tau[1])
    })?;

    let params = betas_at(obs, res.x[0], res.x[1]).ok_or_else(|| {
        AppError::invalid(format!(
            "least squares failed at tau1={}, tau2={}",
            res.x[0], res.x[1]
        ))
    })?;
    let fit_rmse = rmse(&params, obs);

    let converged = res.termination.is_converged();
    if !converged {
        warn!(
            termination = ?res.termination,
            iterations = res.iterations,
            rmse = fit_rmse,
            "NSS fit did not converge; returning best iterate"
        );
    }

    Ok(FitResult {
        params,
        rmse: fit_rmse,
        diagnostics: FitDiagnostics {
            iterations: res.iterations,
            objective_evaluations: res.evaluations,
            converged,
            termination: res.termination,
        },
    })
}

/// Fit the domestic and foreign curves concurrently.
pub fn fit_markets(
    domestic: &ObservationSet,
    foreign: &ObservationSet,
    opts: &FitOptions,
) -> Result<(FitResult, FitResult), AppError> {
    let (d, f) = rayon::join(|| fit_nss_curve(domestic, opts), || fit_nss_curve(foreign, opts));
    Ok((d?, f?))
}

/// MSE at the least squares β and its gradient in `(τ1, τ2)`.
fn profile_objective(obs: &ObservationSet, tau1: f64, tau2: f64) -> (f64, Vec<f64>) {
    match betas_at(obs, tau1, tau2) {
        Some(params) => {
            let (f, g) = mse_with_gradient(&params, obs);
            (f, vec![g[4], g[5]])
        }
        // Rejected by the line search; an error at the start point.
        None => (f64::INFINITY, vec![0.0, 0.0]),
    }
}

/// Least squares β at fixed `(τ1, τ2)`.
fn betas_at(obs: &ObservationSet, tau1: f64, tau2: f64) -> Option<CurveParameters> {
    let n = obs.len();
    let mut x = DMatrix::<f64>::zeros(n, 4);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = [0.0; 4];

    for (i, p) in obs.points().iter().enumerate() {
        fill_design_row(p.maturity, tau1, tau2, &mut row);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
        y[i] = p.yield_;
    }

    let beta = solve_least_squares(&x, &y)?;
    Some(CurveParameters::from_array([beta[0], beta[1], beta[2], beta[3], tau1, tau2]))
}
