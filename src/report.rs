//! Analysis report
//!
//! Everything one run of [`Analysis`](crate::pipeline::Analysis) produces,
//! in a serializable record. `Display` renders the console form:
//!
//! ```text
//! SA-FST: Shapiro-Wilk p=1.000
//! ...
//! Levene p=0.804
//! ANOVA F=637.560, p=0.0000
//! eta-squared = 0.996
//! <Tukey HSD table, only when the ANOVA is significant>
//! ```

use crate::stats::anova::AnovaTable;
use crate::stats::descriptive::GroupSummary;
use crate::stats::effect_size::EffectMagnitude;
use crate::stats::levene::LeveneTest;
use crate::stats::normality::ShapiroWilk;
use crate::stats::tukey::TukeyHsd;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-group diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDiagnostics {
    /// Label, size, mean and standard deviation
    pub summary: GroupSummary,
    /// Shapiro-Wilk result for the group
    pub normality: ShapiroWilk,
}

/// Outcome of the assumption diagnostics
///
/// Recorded for the reader; the ANOVA runs regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumptionCheck {
    /// Every group retained normality at `alpha`
    pub normality_holds: bool,
    /// Levene retained equal variances at `alpha`
    pub homogeneity_holds: bool,
    /// Groups whose Shapiro-Wilk p-value fell below `alpha`
    pub non_normal_groups: Vec<String>,
}

impl AssumptionCheck {
    /// Both diagnostics passed
    #[must_use]
    pub const fn all_hold(&self) -> bool {
        self.normality_holds && self.homogeneity_holds
    }
}

/// Full result of a one-way analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the analysis ran
    pub generated_at: DateTime<Utc>,
    /// Significance level used for every decision
    pub alpha: f64,
    /// Groups in first-appearance order
    pub groups: Vec<GroupDiagnostics>,
    /// Homogeneity of variance
    pub levene: LeveneTest,
    /// One-way ANOVA table
    pub anova: AnovaTable,
    /// SS between / SS total
    pub eta_squared: f64,
    /// Bias-corrected effect size
    pub omega_squared: f64,
    /// Interpretation of `eta_squared`
    pub effect_magnitude: EffectMagnitude,
    /// Diagnostic verdicts
    pub assumptions: AssumptionCheck,
    /// Tukey HSD, present only when the ANOVA rejected at `alpha`
    pub post_hoc: Option<TukeyHsd>,
}

impl AnalysisReport {
    /// Whether the ANOVA rejected equal means
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.anova.is_significant(self.alpha)
    }

    /// Shapiro-Wilk result for one group
    #[must_use]
    pub fn normality(&self, label: &str) -> Option<&ShapiroWilk> {
        self.groups
            .iter()
            .find(|g| g.summary.label == label)
            .map(|g| &g.normality)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report previously written by [`to_json`](Self::to_json)
    ///
    /// # Errors
    ///
    /// Returns error if `json` is not a valid report
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(
                f,
                "{}: Shapiro-Wilk p={:.3}",
                group.summary.label, group.normality.p_value
            )?;
        }
        writeln!(f, "Levene p={:.3}", self.levene.p_value)?;
        writeln!(
            f,
            "ANOVA F={:.3}, p={:.4}",
            self.anova.f_statistic, self.anova.p_value
        )?;
        write!(f, "eta-squared = {:.3}", self.eta_squared)?;
        if let Some(hsd) = &self.post_hoc {
            write!(f, "\n{hsd}")?;
        }
        Ok(())
    }
}
