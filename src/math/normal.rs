//! Standard normal distribution helpers backed by `statrs`.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::AppError;

/// Standard normal `N(0, 1)`.
pub fn standard_normal() -> Result<Normal, AppError> {
    Normal::new(0.0, 1.0)
        .map_err(|e| AppError::domain(format!("Failed to build standard normal: {e}")))
}

/// `Φ(x)`.
pub fn normal_cdf(dist: &Normal, x: f64) -> f64 {
    dist.cdf(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_is_symmetric_around_zero() {
        let n = standard_normal().unwrap();
        assert!((normal_cdf(&n, 0.0) - 0.5).abs() < 1e-15);
        for &x in &[0.1, 0.5, 1.0, 2.5] {
            assert!((normal_cdf(&n, x) + normal_cdf(&n, -x) - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn cdf_matches_reference_values() {
        let n = standard_normal().unwrap();
        assert!((normal_cdf(&n, 1.0) - 0.841_344_746_068_543).abs() < 1e-12);
        assert!((normal_cdf(&n, -1.96) - 0.024_997_895_148_220).abs() < 1e-12);
    }
}
