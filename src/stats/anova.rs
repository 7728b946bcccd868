//! One-way analysis of variance
//!
//! Partitions the total sum of squares into between-group and within-group
//! components and tests the between-group mean square against the
//! within-group mean square with the F distribution.

use super::descriptive::{mean, sum_sq_dev};
use super::{f_sf, validate_groups};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// ANOVA table for a one-way layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnovaTable {
    /// Sum of squares between groups
    pub ss_between: f64,
    /// Sum of squares within groups (residual)
    pub ss_within: f64,
    /// Total sum of squares around the grand mean
    pub ss_total: f64,
    /// Degrees of freedom between groups (k - 1)
    pub df_between: usize,
    /// Degrees of freedom within groups (N - k)
    pub df_within: usize,
    /// Mean square between groups
    pub ms_between: f64,
    /// Mean square within groups (pooled variance)
    pub ms_within: f64,
    /// F statistic
    pub f_statistic: f64,
    /// Upper-tail probability of the F statistic
    pub p_value: f64,
}

impl AnovaTable {
    /// Whether equal means are rejected at significance level `alpha`
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run a one-way ANOVA over the given groups
///
/// # Errors
///
/// - [`Error::InvalidInput`] for fewer than 2 groups or non-finite values
/// - [`Error::InsufficientObservations`] for an empty group
/// - [`Error::DegenerateSample`] when there are no residual degrees of
///   freedom or every group is constant (F undefined)
#[allow(clippy::cast_precision_loss)]
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaTable> {
    validate_groups(groups, "one-way ANOVA")?;

    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if total <= k {
        return Err(Error::DegenerateSample(format!(
            "one-way ANOVA needs more observations ({total}) than groups ({k})"
        )));
    }

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand_mean = mean(&all);

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups.iter().map(|g| sum_sq_dev(g)).sum();
    let ss_total = sum_sq_dev(&all);

    if ss_within <= 0.0 {
        return Err(Error::DegenerateSample(
            "one-way ANOVA: zero within-group variance".to_string(),
        ));
    }

    let df_between = k - 1;
    let df_within = total - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = ms_between / ms_within;
    let p_value = f_sf(f_statistic, df_between as f64, df_within as f64)?;

    Ok(AnovaTable {
        ss_between,
        ss_within,
        ss_total,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
    })
}
