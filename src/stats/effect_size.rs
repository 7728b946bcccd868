//! Effect sizes for one-way designs

use super::anova::AnovaTable;
use super::descriptive::{mean, sum_sq_dev};
use super::validate_groups;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Eta-squared: share of the total sum of squares explained by group
/// membership, `SS_between / SS_total`
///
/// The result lies in [0, 1] and does not depend on the order of groups or
/// observations.
///
/// # Errors
///
/// - [`Error::InvalidInput`] for fewer than 2 groups or non-finite values
/// - [`Error::InsufficientObservations`] for an empty group
/// - [`Error::DegenerateSample`] when every observation is identical
#[allow(clippy::cast_precision_loss)]
pub fn eta_squared(groups: &[&[f64]]) -> Result<f64> {
    validate_groups(groups, "eta-squared")?;

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand_mean = mean(&all);

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_total = sum_sq_dev(&all);

    if ss_total <= 0.0 {
        return Err(Error::DegenerateSample(
            "eta-squared: total variance is zero".to_string(),
        ));
    }

    Ok((ss_between / ss_total).clamp(0.0, 1.0))
}

/// Omega-squared, the less biased population estimate
/// `(SS_b - df_b MS_w) / (SS_t + MS_w)`
///
/// Negative estimates are truncated to zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn omega_squared(table: &AnovaTable) -> f64 {
    let numerator = table.ss_between - table.df_between as f64 * table.ms_within;
    let denominator = table.ss_total + table.ms_within;
    (numerator / denominator).max(0.0)
}

/// Conventional magnitude labels for eta-squared (Cohen, 1988)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    /// eta^2 < 0.01
    Negligible,
    /// 0.01 <= eta^2 < 0.06
    Small,
    /// 0.06 <= eta^2 < 0.14
    Medium,
    /// eta^2 >= 0.14
    Large,
}

impl EffectMagnitude {
    /// Classify an eta-squared value
    #[must_use]
    pub fn from_eta_squared(eta2: f64) -> Self {
        if eta2 < 0.01 {
            Self::Negligible
        } else if eta2 < 0.06 {
            Self::Small
        } else if eta2 < 0.14 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

impl std::fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negligible => write!(f, "negligible"),
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}
