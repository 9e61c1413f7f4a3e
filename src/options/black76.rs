//! Black-76 pricing of European options on a forward price or yield.
//!
//! ```text
//! d1 = (ln(F/K) + σ²T/2) / (σ√T)
//! d2 = d1 - σ√T
//! call = e^{-rT} (F Φ(d1) - K Φ(d2))
//! put  = e^{-rT} (K Φ(-d2) - F Φ(-d1))
//! ```
//!
//! When `T <= 0` or `σ <= 0` the option is worth its intrinsic value, which is
//! also the limit of the formula as `σ√T → 0`. Otherwise `F` and `K` must be
//! strictly positive.

use crate::domain::OptionKind;
use crate::error::AppError;
use crate::math::{normal_cdf, standard_normal};

/// Price a European option on forward `f` with strike `k`.
///
/// - `t`: time to expiry in years
/// - `r`: continuously compounded discount rate
/// - `sigma`: lognormal (Black) volatility
pub fn price_bond_option(
    f: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    kind: OptionKind,
) -> Result<f64, AppError> {
    for (name, v) in [("forward", f), ("strike", k), ("expiry", t), ("rate", r), ("volatility", sigma)] {
        if !v.is_finite() {
            return Err(AppError::domain(format!("{name} must be finite, got {v}")));
        }
    }

    if t <= 0.0 || sigma <= 0.0 {
        return Ok(kind.intrinsic(f, k));
    }

    if f <= 0.0 || k <= 0.0 {
        return Err(AppError::domain(format!(
            "Black-76 needs a positive forward and strike (F={f}, K={k})"
        )));
    }

    let normal = standard_normal()?;
    let vol_sqrt_t = sigma * t.sqrt();
    let d1 = ((f / k).ln() + 0.5 * sigma * sigma * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    let df = (-r * t).exp();

    let price = match kind {
        OptionKind::Call => df * (f * normal_cdf(&normal, d1) - k * normal_cdf(&normal, d2)),
        OptionKind::Put => df * (k * normal_cdf(&normal, -d2) - f * normal_cdf(&normal, -d1)),
    };

    Ok(price.max(0.0))
}

/// Call and put at the same inputs.
pub fn price_call_put(f: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<(f64, f64), AppError> {
    let call = price_bond_option(f, k, t, r, sigma, OptionKind::Call)?;
    let put = price_bond_option(f, k, t, r, sigma, OptionKind::Put)?;
    Ok((call, put))
}
