//! Synthetic sovereign curves for demo runs and tests.
//!
//! Each market is an NSS curve with fixed "true" parameters, sampled on a
//! standard sovereign maturity ladder with seeded Gaussian noise, so a given
//! `(seed, noise)` always produces the same observations.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{CurveParameters, ObservationSet};
use crate::error::AppError;
use crate::models::nss_curve;

/// Maturity ladder (years) for synthetic curves.
pub const SAMPLE_MATURITIES: [f64; 11] = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 15.0, 20.0, 30.0];

/// Upward-sloping developed-market curve around 4-4.7%.
pub fn domestic_sample_params() -> CurveParameters {
    CurveParameters::from_array([0.047, -0.005, -0.008, 0.006, 1.2, 8.0])
}

/// Humped high-yield emerging-market curve around 12-15%.
pub fn foreign_sample_params() -> CurveParameters {
    CurveParameters::from_array([0.128, 0.017, -0.02, 0.01, 0.9, 6.0])
}

/// Sample `params` on `maturities` and add `N(0, noise²)` to each yield.
pub fn generate_curve(
    params: &CurveParameters,
    maturities: &[f64],
    noise: f64,
    seed: u64,
) -> Result<ObservationSet, AppError> {
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(AppError::invalid(format!("noise must be finite and >= 0, got {noise}")));
    }

    let mut ys = nss_curve(params, maturities);
    if noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, noise)
            .map_err(|e| AppError::domain(format!("Noise distribution error: {e}")))?;
        for y in ys.iter_mut() {
            *y += normal.sample(&mut rng);
        }
    }

    ObservationSet::new(maturities, &ys)
}

/// Domestic and foreign sample curves. The foreign curve uses a derived seed so
/// the two noise paths are independent.
pub fn sample_markets(seed: u64, noise: f64) -> Result<(ObservationSet, ObservationSet), AppError> {
    let domestic = generate_curve(&domestic_sample_params(), &SAMPLE_MATURITIES, noise, seed)?;
    let foreign = generate_curve(
        &foreign_sample_params(),
        &SAMPLE_MATURITIES,
        noise,
        seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
    )?;
    Ok((domestic, foreign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rmse;

    #[test]
    fn noise_free_curve_matches_model() {
        let p = domestic_sample_params();
        let obs = generate_curve(&p, &SAMPLE_MATURITIES, 0.0, 1).unwrap();
        assert_eq!(obs.len(), SAMPLE_MATURITIES.len());
        assert!(rmse(&p, &obs) < 1e-15);
    }

    #[test]
    fn same_seed_same_sample() {
        let a = sample_markets(42, 0.0005).unwrap();
        let b = sample_markets(42, 0.0005).unwrap();
        assert_eq!(a, b);
        let c = sample_markets(43, 0.0005).unwrap();
        assert_ne!(a.0, c.0);
    }

    #[test]
    fn sample_levels_are_plausible() {
        let (dom, fgn) = sample_markets(1, 0.0).unwrap();
        assert!(dom.yields().iter().all(|y| (0.03..0.06).contains(y)));
        assert!(fgn.yields().iter().all(|y| (0.10..0.16).contains(y)));
    }

    #[test]
    fn rejects_negative_noise() {
        assert!(generate_curve(&domestic_sample_params(), &[1.0], -0.1, 0).is_err());
    }
}
