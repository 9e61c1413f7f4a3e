//! Stable Nelson–Siegel–Svensson loadings and their τ-derivatives.
//!
//! The loadings are:
//!
//! - `f1(m, τ) = (1 - exp(-m/τ)) / (m/τ)` (slope)
//! - `f2(m, τ) = f1(m, τ) - exp(-m/τ)` (curvature)
//!
//! Numerical notes:
//! - For small `x = m/τ`, `1 - exp(-x)` suffers from catastrophic cancellation.
//!   We use `expm1`-based forms and a series fallback below `SMALL_X`.
//! - At `m = 0` the series branch returns the analytic limits exactly:
//!   `f1 = 1`, `f2 = 0`, and both τ-derivatives vanish.

/// Threshold below which we switch to a small-x series approximation.
const SMALL_X: f64 = 1e-6;

/// Compute `f1(m, τ)`.
pub fn f1(m: f64, tau: f64) -> f64 {
    let x = m / tau;

    if x.abs() < SMALL_X {
        // (1 - e^{-x}) / x ≈ 1 - x/2 + x^2/6
        return 1.0 - x / 2.0 + (x * x) / 6.0;
    }

    -(-x).exp_m1() / x
}

/// Compute `f2(m, τ)`.
pub fn f2(m: f64, tau: f64) -> f64 {
    let x = m / tau;

    if x.abs() < SMALL_X {
        // f1 ≈ 1 - x/2 + x^2/6, exp(-x) ≈ 1 - x + x^2/2
        return x / 2.0 - (x * x) / 3.0;
    }

    f1(m, tau) - (-x).exp()
}

/// `∂f1/∂τ`.
///
/// With `x = m/τ` and `dx/dτ = -x/τ`:
///
/// ```text
/// ∂f1/∂τ = (1 - e^{-x} - x e^{-x}) / (x τ)
/// ```
pub fn df1_dtau(m: f64, tau: f64) -> f64 {
    let x = m / tau;

    if x.abs() < SMALL_X {
        // 1 - e^{-x} - x e^{-x} ≈ x^2/2 - x^3/3
        return (x / 2.0 - (x * x) / 3.0) / tau;
    }

    let numer = -(-x).exp_m1() - x * (-x).exp();
    numer / (x * tau)
}

/// `∂f2/∂τ = ∂f1/∂τ - x e^{-x} / τ`.
pub fn df2_dtau(m: f64, tau: f64) -> f64 {
    let x = m / tau;
    df1_dtau(m, tau) - x * (-x).exp() / tau
}
