//! Levene's test for homogeneity of variances
//!
//! The statistic is a one-way ANOVA on absolute deviations from each
//! group's centre. Centring on the median (Brown-Forsythe) is the default
//! because it stays robust when the groups are skewed.
//!
//! References:
//! - Levene (1960): Robust tests for equality of variances
//! - Brown & Forsythe (1974): Robust tests for the equality of variances

use super::descriptive::{mean, median};
use super::{f_sf, validate_groups};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Centre used for the absolute deviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeveneCenter {
    /// Group median (Brown-Forsythe variant)
    #[default]
    Median,
    /// Group mean (Levene's original statistic)
    Mean,
}

impl std::fmt::Display for LeveneCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

/// Result of a Levene test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeveneTest {
    /// Centre the deviations were taken from
    pub center: LeveneCenter,
    /// W statistic (F-distributed under equal variances)
    pub statistic: f64,
    /// Upper-tail probability of the statistic
    pub p_value: f64,
    /// Numerator degrees of freedom (k - 1)
    pub df_between: usize,
    /// Denominator degrees of freedom (N - k)
    pub df_within: usize,
}

impl LeveneTest {
    /// Whether equal variances are retained at significance level `alpha`
    #[must_use]
    pub fn is_homogeneous(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Run Levene's test across the given groups
///
/// # Errors
///
/// - [`Error::InvalidInput`] for fewer than 2 groups or non-finite values
/// - [`Error::InsufficientObservations`] for an empty group
/// - [`Error::DegenerateSample`] when there are no residual degrees of
///   freedom or the deviations do not vary within any group
#[allow(clippy::cast_precision_loss)]
pub fn levene(groups: &[&[f64]], center: LeveneCenter) -> Result<LeveneTest> {
    validate_groups(groups, "Levene")?;

    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if total <= k {
        return Err(Error::DegenerateSample(format!(
            "Levene needs more observations ({total}) than groups ({k})"
        )));
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let c = match center {
                LeveneCenter::Median => median(g),
                LeveneCenter::Mean => mean(g),
            };
            g.iter().map(|v| (v - c).abs()).collect()
        })
        .collect();

    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let numerator: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.len() as f64 * (zm - grand_mean).powi(2))
        .sum();
    let denominator: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.iter().map(|v| (v - zm).powi(2)).sum::<f64>())
        .sum();

    if denominator <= 0.0 {
        return Err(Error::DegenerateSample(
            "Levene: absolute deviations do not vary within any group".to_string(),
        ));
    }

    let df_between = k - 1;
    let df_within = total - k;
    let statistic = (df_within as f64 / df_between as f64) * numerator / denominator;
    let p_value = f_sf(statistic, df_between as f64, df_within as f64)?;

    Ok(LeveneTest {
        center,
        statistic,
        p_value,
        df_between,
        df_within,
    })
}
