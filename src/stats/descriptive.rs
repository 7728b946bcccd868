//! Descriptive statistics over `f64` slices
//!
//! Thin wrappers over `statrs` so every test in the crate agrees on the
//! same mean, median and variance conventions.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

/// Arithmetic mean. Returns `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.mean()
}

/// Median (average of the two middle values for even lengths).
/// Returns `NaN` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    Data::new(values.to_vec()).median()
}

/// Sum of squared deviations from the mean. Zero for an empty slice.
#[must_use]
pub fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Sample variance (ddof = 1). Returns `NaN` when fewer than 2 values.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    values.variance()
}

/// Per-group descriptive summary printed ahead of the tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group label
    pub label: String,
    /// Number of observations
    pub n: usize,
    /// Group mean
    pub mean: f64,
    /// Sample standard deviation (ddof = 1)
    pub std_dev: f64,
}

impl GroupSummary {
    /// Summarize one group's observations
    #[must_use]
    pub fn new(label: impl Into<String>, values: &[f64]) -> Self {
        Self {
            label: label.into(),
            n: values.len(),
            mean: mean(values),
            std_dev: variance(values).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert!((mean(&[53.2, 52.9, 53.5]) - 53.2).abs() < 1e-12);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < f64::EPSILON);
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < f64::EPSILON);
        assert!(median(&[]).is_nan());
        // input order is left alone
        let values = [5.0, -1.0, 3.0, 0.0];
        assert!((median(&values) - 1.5).abs() < f64::EPSILON);
        assert_eq!(values, [5.0, -1.0, 3.0, 0.0]);
    }

    #[test]
    fn test_variance_ddof_one() {
        // 2, 4, 4, 4, 5, 5, 7, 9: population var 4, sample var 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&values) - 32.0 / 7.0).abs() < 1e-12);
        assert!((sum_sq_dev(&values) - 32.0).abs() < 1e-12);
        assert!(variance(&[1.0]).is_nan());
        assert!(variance(&[]).is_nan());
        assert!(sum_sq_dev(&[1.0]).abs() < f64::EPSILON);
        assert!(sum_sq_dev(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_variance_matches_sum_sq_dev() {
        let values = [53.2, 52.9, 53.5, 48.2, 48.1, 48.4];
        let from_ss = sum_sq_dev(&values) / 5.0;
        assert!((variance(&values) - from_ss).abs() < 1e-10);
    }

    #[test]
    fn test_group_summary() {
        let summary = GroupSummary::new("SA-FST", &[53.2, 52.9, 53.5]);
        assert_eq!(summary.label, "SA-FST");
        assert_eq!(summary.n, 3);
        assert!((summary.mean - 53.2).abs() < 1e-12);
        assert!((summary.std_dev - 0.3).abs() < 1e-10);
    }
}
