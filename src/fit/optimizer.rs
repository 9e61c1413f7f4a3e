//! Box-constrained quasi-Newton minimizer (projected BFGS).
//!
//! Each iteration:
//!
//! 1. freeze variables pinned at a bound whose gradient points out of the box
//! 2. take the BFGS direction `-H g` over the free variables
//! 3. backtrack along the projected path `P(x + α d)` until the Armijo condition
//!    `f(x_α) <= f(x) + c1 gᵀ(x_α - x)` holds
//! 4. update the inverse Hessian `H` when the curvature condition `sᵀy > 0` holds
//!
//! `H` is reset to the identity whenever the direction is not a descent
//! direction or the line search fails. A failed line search on the identity is
//! reported as stagnation and the current (best) iterate is returned.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::TerminationReason;
use crate::error::AppError;

/// Box constraints `lower <= x <= upper`. Infinite bounds are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxConstraints {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoxConstraints {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, AppError> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(AppError::invalid(
                "constraints require same non-zero lower/upper dimensions",
            ));
        }
        for (i, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(AppError::invalid(format!("invalid bound at index {i}: [{lo}, {hi}]")));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Lower bounds only; upper bounds are `+∞`.
    pub fn lower_only(lower: Vec<f64>) -> Result<Self, AppError> {
        let upper = vec![f64::INFINITY; lower.len()];
        Self::new(lower, upper)
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn project(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, v)| v.clamp(self.lower[i], self.upper[i]))
            .collect()
    }

    /// Whether coordinate `i` sits on a bound with the gradient pushing outward.
    fn is_pinned(&self, i: usize, x: f64, g: f64) -> bool {
        (x <= self.lower[i] && g > 0.0) || (x >= self.upper[i] && g < 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerOptions {
    pub max_iterations: usize,
    /// Stop when the projected gradient's infinity norm falls below this.
    pub gradient_tolerance: f64,
    /// Stop when the relative objective decrease of an iteration falls below this.
    pub objective_tolerance: f64,
    /// Stop when the step's infinity norm falls below `step_tolerance * (1 + |x|∞)`.
    pub step_tolerance: f64,
    /// Armijo sufficient-decrease constant.
    pub c1: f64,
    pub max_line_search: usize,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            gradient_tolerance: 1e-12,
            objective_tolerance: 1e-14,
            step_tolerance: 1e-14,
            c1: 1e-4,
            max_line_search: 40,
        }
    }
}

/// Outcome of a minimization. `x` is always the best iterate seen.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: TerminationReason,
}

/// Projected BFGS solver.
#[derive(Debug, Clone, Default)]
pub struct ProjectedBfgs {
    options: OptimizerOptions,
}

impl ProjectedBfgs {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }

    /// Minimize `objective` (returning value and gradient) from `initial` inside `bounds`.
    pub fn minimize<F>(
        &self,
        initial: &[f64],
        bounds: &BoxConstraints,
        mut objective: F,
    ) -> Result<OptimizationResult, AppError>
    where
        F: FnMut(&[f64]) -> (f64, Vec<f64>),
    {
        let n = initial.len();
        if n != bounds.dimension() {
            return Err(AppError::invalid(format!(
                "initial point has {n} coordinates but bounds have {}",
                bounds.dimension()
            )));
        }

        let opts = &self.options;
        let mut x = bounds.project(initial);
        let (mut f, mut g) = objective(&x);
        let mut evaluations = 1usize;
        if !f.is_finite() || g.iter().any(|v| !v.is_finite()) {
            return Err(AppError::invalid("objective is not finite at the initial point"));
        }

        let mut h = DMatrix::<f64>::identity(n, n);
        let mut h_is_identity = true;

        for iteration in 0..opts.max_iterations {
            let free: Vec<bool> = (0..n).map(|i| !bounds.is_pinned(i, x[i], g[i])).collect();

            let pg_norm = (0..n)
                .filter(|&i| free[i])
                .map(|i| g[i].abs())
                .fold(0.0_f64, f64::max);
            if pg_norm <= opts.gradient_tolerance {
                return Ok(self.finish(x, f, iteration, evaluations, TerminationReason::GradientTolerance));
            }

            let mut d = search_direction(&h, &g, &free);
            let mut slope: f64 = d.iter().zip(&g).map(|(di, gi)| di * gi).sum();
            if !(slope < 0.0) {
                h = DMatrix::identity(n, n);
                h_is_identity = true;
                d = (0..n).map(|i| if free[i] { -g[i] } else { 0.0 }).collect();
                slope = d.iter().zip(&g).map(|(di, gi)| di * gi).sum();
            }

            // Backtracking along the projected path.
            let mut alpha = 1.0;
            let mut accepted = None;
            let mut trials = 0usize;
            for _ in 0..opts.max_line_search {
                trials += 1;
                let trial: Vec<f64> =
                    bounds.project(&x.iter().zip(&d).map(|(xi, di)| xi + alpha * di).collect::<Vec<_>>());
                let (ft, gt) = objective(&trial);
                evaluations += 1;

                let predicted: f64 = g.iter().zip(trial.iter().zip(&x)).map(|(gi, (ti, xi))| gi * (ti - xi)).sum();
                if ft.is_finite() && gt.iter().all(|v| v.is_finite()) && ft <= f + opts.c1 * predicted {
                    accepted = Some((trial, ft, gt));
                    break;
                }
                alpha *= 0.5;
            }

            let Some((x_new, f_new, g_new)) = accepted else {
                if h_is_identity {
                    debug!(iteration, objective = f, slope, "line search failed on identity Hessian");
                    return Ok(self.finish(x, f, iteration, evaluations, TerminationReason::Stagnation));
                }
                h = DMatrix::identity(n, n);
                h_is_identity = true;
                continue;
            };

            let s = DVector::from_iterator(n, x_new.iter().zip(&x).map(|(a, b)| a - b));
            let y = DVector::from_iterator(n, g_new.iter().zip(&g).map(|(a, b)| a - b));
            let f_old = f;

            x = x_new;
            f = f_new;
            g = g_new;

            // Only a full quasi-Newton step with negligible decrease signals convergence;
            // a heavily backtracked step can be tiny far from the minimum.
            let full_step = trials == 1;
            if full_step && f_old - f <= opts.objective_tolerance * f_old.abs().max(f.abs()) {
                return Ok(self.finish(x, f, iteration + 1, evaluations, TerminationReason::ObjectiveTolerance));
            }
            let x_scale = 1.0 + x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if s.amax() <= opts.step_tolerance * x_scale {
                return Ok(self.finish(x, f, iteration + 1, evaluations, TerminationReason::StepTolerance));
            }

            let sy = s.dot(&y);
            if sy > 1e-12 * s.norm() * y.norm() {
                if h_is_identity {
                    // Nocedal & Wright (6.20): scale the initial inverse Hessian.
                    h *= sy / y.dot(&y);
                    h_is_identity = false;
                }
                bfgs_update(&mut h, &s, &y, sy);
            }
        }

        Ok(self.finish(x, f, opts.max_iterations, evaluations, TerminationReason::MaxIterations))
    }

    fn finish(
        &self,
        x: Vec<f64>,
        objective: f64,
        iterations: usize,
        evaluations: usize,
        termination: TerminationReason,
    ) -> OptimizationResult {
        debug!(iterations, evaluations, objective, ?termination, "optimizer finished");
        OptimizationResult {
            x,
            objective,
            iterations,
            evaluations,
            termination,
        }
    }
}

/// `d = -H g` restricted to the free variables.
fn search_direction(h: &DMatrix<f64>, g: &[f64], free: &[bool]) -> Vec<f64> {
    let n = g.len();
    (0..n)
        .map(|i| {
            if !free[i] {
                return 0.0;
            }
            -(0..n).filter(|&j| free[j]).map(|j| h[(i, j)] * g[j]).sum::<f64>()
        })
        .collect()
}

/// `H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ` with `ρ = 1 / sᵀy`.
fn bfgs_update(h: &mut DMatrix<f64>, s: &DVector<f64>, y: &DVector<f64>, sy: f64) {
    let rho = 1.0 / sy;
    let hy = &*h * y;
    let yhy = y.dot(&hy);
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            h[(i, j)] += rho * ((1.0 + rho * yhy) * s[i] * s[j] - hy[i] * s[j] - s[i] * hy[j]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(center: Vec<f64>) -> impl FnMut(&[f64]) -> (f64, Vec<f64>) {
        move |x: &[f64]| {
            let f = x.iter().zip(&center).map(|(a, c)| (a - c).powi(2)).sum();
            let g = x.iter().zip(&center).map(|(a, c)| 2.0 * (a - c)).collect();
            (f, g)
        }
    }

    fn rosenbrock(x: &[f64]) -> (f64, Vec<f64>) {
        let (a, b) = (x[0], x[1]);
        let f = (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2);
        let g = vec![
            -2.0 * (1.0 - a) - 400.0 * a * (b - a * a),
            200.0 * (b - a * a),
        ];
        (f, g)
    }

    #[test]
    fn minimizes_unconstrained_quadratic() {
        let bounds = BoxConstraints::new(vec![f64::NEG_INFINITY; 2], vec![f64::INFINITY; 2]).unwrap();
        let res = ProjectedBfgs::default()
            .minimize(&[0.0, 0.0], &bounds, quadratic(vec![2.0, 3.0]))
            .unwrap();
        assert!((res.x[0] - 2.0).abs() < 1e-8);
        assert!((res.x[1] - 3.0).abs() < 1e-8);
        assert!(res.termination.is_converged());
    }

    #[test]
    fn active_lower_bound_is_respected() {
        // Unconstrained minimum at (-1, 2); x0 >= 0 pins the first coordinate.
        let bounds = BoxConstraints::lower_only(vec![0.0, f64::NEG_INFINITY]).unwrap();
        let res = ProjectedBfgs::default()
            .minimize(&[5.0, 5.0], &bounds, quadratic(vec![-1.0, 2.0]))
            .unwrap();
        assert_eq!(res.x[0], 0.0);
        assert!((res.x[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn infeasible_start_is_projected() {
        let bounds = BoxConstraints::new(vec![1.0], vec![3.0]).unwrap();
        let res = ProjectedBfgs::default()
            .minimize(&[-10.0], &bounds, quadratic(vec![2.0]))
            .unwrap();
        assert!((res.x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn solves_rosenbrock() {
        let bounds = BoxConstraints::lower_only(vec![f64::NEG_INFINITY; 2]).unwrap();
        let res = ProjectedBfgs::default()
            .minimize(&[-1.2, 1.0], &bounds, rosenbrock)
            .unwrap();
        assert!((res.x[0] - 1.0).abs() < 1e-4, "x={:?}", res.x);
        assert!((res.x[1] - 1.0).abs() < 1e-4, "x={:?}", res.x);
    }

    #[test]
    fn iteration_cap_returns_best_iterate() {
        let bounds = BoxConstraints::lower_only(vec![f64::NEG_INFINITY; 2]).unwrap();
        let solver = ProjectedBfgs::new(OptimizerOptions {
            max_iterations: 2,
            ..OptimizerOptions::default()
        });
        let (f0, _) = rosenbrock(&[-1.2, 1.0]);
        let res = solver.minimize(&[-1.2, 1.0], &bounds, rosenbrock).unwrap();
        assert_eq!(res.termination, TerminationReason::MaxIterations);
        assert_eq!(res.iterations, 2);
        assert!(res.objective < f0);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let bounds = BoxConstraints::lower_only(vec![0.0]).unwrap();
        assert!(ProjectedBfgs::default()
            .minimize(&[1.0, 2.0], &bounds, quadratic(vec![0.0, 0.0]))
            .is_err());
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(BoxConstraints::new(vec![1.0], vec![0.0]).is_err());
        assert!(BoxConstraints::new(vec![], vec![]).is_err());
    }
}
