//! Statistical routines for one-way designs
//!
//! Each test takes plain `f64` slices (one per group) so it can be used
//! independently of the Arrow storage layer.
//!
//! Design Principles:
//! - Jidoka: degenerate inputs (empty groups, zero variance) stop with a
//!   typed error instead of propagating NaN
//! - Genchi Genbutsu: algorithms follow the published references named in
//!   each module, constants included

pub mod anova;
pub mod descriptive;
pub mod effect_size;
pub mod levene;
pub mod normality;
pub mod studentized_range;
pub mod tukey;

use crate::{Error, Result};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Standard normal CDF
#[must_use]
pub(crate) fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal upper tail, accurate far into the tail
#[must_use]
pub(crate) fn normal_sf(x: f64) -> f64 {
    0.5 * erfc(x / SQRT_2)
}

/// Upper tail of the F distribution with (`df1`, `df2`) degrees of freedom
pub(crate) fn f_sf(f: f64, df1: f64, df2: f64) -> Result<f64> {
    if f.is_infinite() {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| Error::Distribution(format!("F({df1}, {df2}): {e}")))?;
    Ok(dist.sf(f))
}

/// Validate a one-way layout: at least two groups, none empty, all finite
pub(crate) fn validate_groups(groups: &[&[f64]], test: &'static str) -> Result<()> {
    if groups.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "{test} requires at least 2 groups, got {}",
            groups.len()
        )));
    }
    for (i, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(Error::InsufficientObservations {
                group: format!("#{i}"),
                test,
                required: 1,
                actual: 0,
            });
        }
        if group.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "{test}: group #{i} contains a non-finite value"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_tails_are_complementary() {
        for x in [-3.0, -1.0, 0.0, 0.5, 2.0] {
            assert!((normal_cdf(x) + normal_sf(x) - 1.0).abs() < 1e-14);
        }
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((normal_cdf(1.959_963_984_540_054) - 0.975).abs() < 1e-9);
    }

    #[test]
    fn test_f_sf_bounds() {
        assert!((f_sf(0.0, 4.0, 10.0).unwrap() - 1.0).abs() < 1e-12);
        assert!(f_sf(f64::INFINITY, 4.0, 10.0).unwrap().abs() < f64::EPSILON);
        // F(4, 10) critical value at 0.05 is 3.478
        let p = f_sf(3.478, 4.0, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_f_sf_rejects_bad_df() {
        assert!(matches!(f_sf(1.0, 0.0, 10.0), Err(Error::Distribution(_))));
    }

    #[test]
    fn test_validate_groups() {
        let a = [1.0, 2.0];
        let empty: [f64; 0] = [];
        assert!(validate_groups(&[&a, &a], "test").is_ok());
        assert!(matches!(validate_groups(&[&a], "test"), Err(Error::InvalidInput(_))));
        assert!(matches!(
            validate_groups(&[&a, &empty], "test"),
            Err(Error::InsufficientObservations { actual: 0, .. })
        ));
        let nan = [1.0, f64::NAN];
        assert!(validate_groups(&[&a, &nan], "test").is_err());
    }
}
