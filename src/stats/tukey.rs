//! Tukey's honestly significant difference (HSD) post-hoc test
//!
//! Compares every pair of group means while holding the family-wise error
//! rate at `alpha`. Unequal group sizes use the Tukey-Kramer standard error.
//!
//! References:
//! - Tukey (1949): Comparing individual means in the analysis of variance
//! - Kramer (1956): Extension of multiple range tests to group means with
//!   unequal numbers of replications

use super::descriptive::{mean, sum_sq_dev};
use super::{studentized_range, validate_groups};
use crate::storage::GroupedSamples;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TukeyComparison {
    /// First group (lexicographically smaller label)
    pub group1: String,
    /// Second group
    pub group2: String,
    /// mean(group2) - mean(group1)
    pub meandiff: f64,
    /// Family-wise adjusted p-value
    pub p_adj: f64,
    /// Lower bound of the simultaneous confidence interval
    pub lower: f64,
    /// Upper bound of the simultaneous confidence interval
    pub upper: f64,
    /// Whether equal means are rejected at the family-wise level
    pub reject: bool,
}

/// Tukey HSD result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TukeyHsd {
    /// Family-wise error rate
    pub alpha: f64,
    /// Critical studentized range value at `1 - alpha`
    pub q_critical: f64,
    /// Residual degrees of freedom (N - k)
    pub df: usize,
    /// Pooled within-group variance
    pub mse: f64,
    /// All k (k - 1) / 2 pairs, ordered by (group1, group2)
    pub comparisons: Vec<TukeyComparison>,
}

impl TukeyHsd {
    /// Pairs whose means differ at the family-wise level
    pub fn significant_pairs(&self) -> impl Iterator<Item = &TukeyComparison> {
        self.comparisons.iter().filter(|c| c.reject)
    }

    /// Look up the comparison between two labels, in either order
    #[must_use]
    pub fn comparison(&self, a: &str, b: &str) -> Option<&TukeyComparison> {
        self.comparisons.iter().find(|c| {
            (c.group1 == a && c.group2 == b) || (c.group1 == b && c.group2 == a)
        })
    }
}

/// Run Tukey HSD over all pairs of groups
///
/// Groups are compared in lexicographic label order, so `meandiff` is
/// always `mean(later label) - mean(earlier label)`.
///
/// # Errors
///
/// - [`Error::InvalidInput`] when `alpha` is outside (0, 1), there are fewer
///   than 2 groups, or fewer than 2 residual degrees of freedom
/// - [`Error::InsufficientObservations`] for an empty group
/// - [`Error::DegenerateSample`] when the pooled variance is zero
#[allow(clippy::cast_precision_loss)]
pub fn tukey_hsd(groups: &GroupedSamples, alpha: f64) -> Result<TukeyHsd> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidInput(format!(
            "Tukey HSD alpha must lie in (0, 1), got {alpha}"
        )));
    }

    let sorted = groups.sorted_by_label();
    let slices = sorted.as_slices();
    validate_groups(&slices, "Tukey HSD")?;

    let k = slices.len();
    let total = sorted.total_observations();
    let df = total.saturating_sub(k);
    if df < 2 {
        return Err(Error::InvalidInput(format!(
            "Tukey HSD needs at least 2 residual degrees of freedom, got {df}"
        )));
    }

    let mse = slices.iter().map(|g| sum_sq_dev(g)).sum::<f64>() / df as f64;
    if mse <= 0.0 {
        return Err(Error::DegenerateSample(
            "Tukey HSD: pooled within-group variance is zero".to_string(),
        ));
    }

    let q_critical = studentized_range::quantile(1.0 - alpha, k, df as f64)?;
    let means: Vec<f64> = slices.iter().map(|g| mean(g)).collect();

    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let meandiff = means[j] - means[i];
            let n_i = slices[i].len() as f64;
            let n_j = slices[j].len() as f64;
            let se = (mse / 2.0 * (1.0 / n_i + 1.0 / n_j)).sqrt();
            let q = meandiff.abs() / se;
            let margin = q_critical * se;

            comparisons.push(TukeyComparison {
                group1: sorted.groups()[i].label.clone(),
                group2: sorted.groups()[j].label.clone(),
                meandiff,
                p_adj: studentized_range::sf(q, k, df as f64)?,
                lower: meandiff - margin,
                upper: meandiff + margin,
                reject: meandiff.abs() > margin,
            });
        }
    }

    Ok(TukeyHsd {
        alpha,
        q_critical,
        df,
        mse,
        comparisons,
    })
}

impl fmt::Display for TukeyHsd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w1 = self
            .comparisons
            .iter()
            .map(|c| c.group1.len())
            .max()
            .unwrap_or(0)
            .max("group1".len());
        let w2 = self
            .comparisons
            .iter()
            .map(|c| c.group2.len())
            .max()
            .unwrap_or(0)
            .max("group2".len());
        let width = w1 + w2 + 8 + 7 + 9 + 9 + 6 + 6;
        let title = format!("Multiple Comparison of Means - Tukey HSD, FWER={:.2}", self.alpha);

        writeln!(f, "{title:^width$}")?;
        writeln!(f, "{}", "=".repeat(width))?;
        writeln!(
            f,
            "{:>w1$} {:>w2$} {:>8} {:>7} {:>9} {:>9} {:>6}",
            "group1", "group2", "meandiff", "p-adj", "lower", "upper", "reject"
        )?;
        writeln!(f, "{}", "-".repeat(width))?;
        for c in &self.comparisons {
            writeln!(
                f,
                "{:>w1$} {:>w2$} {:>8.4} {:>7.4} {:>9.4} {:>9.4} {:>6}",
                c.group1,
                c.group2,
                c.meandiff,
                c.p_adj,
                c.lower,
                c.upper,
                if c.reject { "True" } else { "False" }
            )?;
        }
        write!(f, "{}", "-".repeat(width))
    }
}
