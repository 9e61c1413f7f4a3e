//! Nelson–Siegel–Svensson model evaluation.
//!
//! ```text
//! y(m) = β0 + β1 f1(m, τ1) + β2 f2(m, τ1) + β3 f2(m, τ2)
//! ```
//!
//! The evaluator does not check `τ > 0`; the fitter's bounds guarantee it.

use crate::domain::{CurveParameters, ObservationSet, PARAM_COUNT};
use crate::math::{df1_dtau, df2_dtau, f1, f2};

/// Model yield at maturity `m`.
pub fn nss_yield(params: &CurveParameters, m: f64) -> f64 {
    params.beta0
        + params.beta1 * f1(m, params.tau1)
        + params.beta2 * f2(m, params.tau1)
        + params.beta3 * f2(m, params.tau2)
}

/// Model yields over a maturity grid.
pub fn nss_curve(params: &CurveParameters, maturities: &[f64]) -> Vec<f64> {
    maturities.iter().map(|&m| nss_yield(params, m)).collect()
}

/// Partial derivatives of `y(m)` with respect to `(β0, β1, β2, β3, τ1, τ2)`.
pub fn nss_gradient(params: &CurveParameters, m: f64) -> [f64; PARAM_COUNT] {
    let (t1, t2) = (params.tau1, params.tau2);
    [
        1.0,
        f1(m, t1),
        f2(m, t1),
        f2(m, t2),
        params.beta1 * df1_dtau(m, t1) + params.beta2 * df2_dtau(m, t1),
        params.beta3 * df2_dtau(m, t2),
    ]
}

/// Fill one row of the β design matrix (`[1, f1(τ1), f2(τ1), f2(τ2)]`).
pub fn fill_design_row(m: f64, tau1: f64, tau2: f64, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = f1(m, tau1);
    out[2] = f2(m, tau1);
    out[3] = f2(m, tau2);
}

/// Mean squared error of the model against `obs`.
pub fn mse(params: &CurveParameters, obs: &ObservationSet) -> f64 {
    let n = obs.len() as f64;
    obs.points()
        .iter()
        .map(|p| {
            let r = nss_yield(params, p.maturity) - p.yield_;
            r * r
        })
        .sum::<f64>()
        / n
}

/// RMSE of the model against `obs`.
pub fn rmse(params: &CurveParameters, obs: &ObservationSet) -> f64 {
    mse(params, obs).sqrt()
}

/// MSE and its gradient in parameter space, in one pass over the data.
pub fn mse_with_gradient(params: &CurveParameters, obs: &ObservationSet) -> (f64, [f64; PARAM_COUNT]) {
    let n = obs.len() as f64;
    let mut value = 0.0;
    let mut grad = [0.0; PARAM_COUNT];

    for p in obs.points() {
        let r = nss_yield(params, p.maturity) - p.yield_;
        value += r * r;
        let dy = nss_gradient(params, p.maturity);
        for (g, d) in grad.iter_mut().zip(dy.iter()) {
            *g += 2.0 * r * d;
        }
    }

    for g in grad.iter_mut() {
        *g /= n;
    }
    (value / n, grad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> CurveParameters {
        CurveParameters::from_array([0.10, -0.02, 0.01, 0.005, 1.0, 5.0])
    }

    #[test]
    fn short_end_limit_is_beta0_plus_beta1() {
        let p = sample_params();
        assert!((nss_yield(&p, 0.0) - p.short_rate()).abs() < 1e-15);
    }

    #[test]
    fn long_end_tends_to_beta0() {
        let p = sample_params();
        assert!((nss_yield(&p, 1_000.0) - p.beta0).abs() < 1e-3);
    }

    #[test]
    fn curve_is_elementwise() {
        let p = sample_params();
        let grid = [0.25, 1.0, 2.0, 5.0, 10.0];
        let ys = nss_curve(&p, &grid);
        assert_eq!(ys.len(), grid.len());
        for (m, y) in grid.iter().zip(ys) {
            assert_eq!(y, nss_yield(&p, *m));
        }
        assert!(nss_curve(&p, &[]).is_empty());
    }

    #[test]
    fn rmse_is_zero_on_model_generated_data() {
        let p = sample_params();
        let grid = [0.5, 1.0, 3.0, 7.0];
        let obs = ObservationSet::new(&grid, &nss_curve(&p, &grid)).unwrap();
        assert!(rmse(&p, &obs) < 1e-15);
    }

    #[test]
    fn rmse_of_constant_offset() {
        let p = sample_params();
        let grid = [0.5, 1.0, 3.0, 7.0];
        let shifted: Vec<f64> = nss_curve(&p, &grid).iter().map(|y| y + 0.001).collect();
        let obs = ObservationSet::new(&grid, &shifted).unwrap();
        assert!((rmse(&p, &obs) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn analytic_gradient_matches_finite_differences() {
        let p = sample_params();
        let grid = [0.25, 1.0, 2.0, 5.0, 10.0];
        let obs = ObservationSet::new(&grid, &[0.09, 0.092, 0.095, 0.1, 0.102]).unwrap();

        let (_, grad) = mse_with_gradient(&p, &obs);
        let x = p.to_array();
        let h = 1e-6;
        for i in 0..PARAM_COUNT {
            let mut up = x;
            let mut dn = x;
            up[i] += h;
            dn[i] -= h;
            let fd = (mse(&CurveParameters::from_array(up), &obs)
                - mse(&CurveParameters::from_array(dn), &obs))
                / (2.0 * h);
            assert!((grad[i] - fd).abs() < 1e-8, "param {i}: analytic={} fd={fd}", grad[i]);
        }
    }

    #[test]
    fn design_row_reproduces_prediction() {
        let p = sample_params();
        let mut row = [0.0; 4];
        fill_design_row(3.0, p.tau1, p.tau2, &mut row);
        let y: f64 = row
            .iter()
            .zip([p.beta0, p.beta1, p.beta2, p.beta3])
            .map(|(x, b)| x * b)
            .sum();
        assert!((y - nss_yield(&p, 3.0)).abs() < 1e-15);
    }
}
