//! One-way analysis pipeline
//!
//! Runs the fixed sequence over a grouped table: per-group Shapiro-Wilk,
//! Levene, one-way ANOVA, effect size, and Tukey HSD when the ANOVA
//! rejects equal means at `alpha`.
//!
//! ```rust
//! use anova_lab::{dataset, Analysis};
//!
//! let storage = dataset::strength_table()?;
//! let report = Analysis::builder().alpha(0.05).build()?.run(&storage)?;
//! assert!(report.post_hoc.is_some());
//! # Ok::<(), anova_lab::Error>(())
//! ```

use crate::report::{AnalysisReport, AssumptionCheck, GroupDiagnostics};
use crate::stats::anova::one_way_anova;
use crate::stats::descriptive::GroupSummary;
use crate::stats::effect_size::{eta_squared, omega_squared, EffectMagnitude};
use crate::stats::levene::{levene, LeveneCenter};
use crate::stats::normality::shapiro_wilk;
use crate::stats::tukey::tukey_hsd;
use crate::storage::{GroupedSamples, StorageEngine};
use crate::{Error, Result};
use chrono::Utc;
use tracing::{debug, info, info_span, warn};

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Configured analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    alpha: f64,
    levene_center: LeveneCenter,
}

impl Analysis {
    /// Create an analysis builder
    #[must_use]
    pub fn builder() -> AnalysisBuilder {
        AnalysisBuilder::default()
    }

    /// Significance level
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Centre used by the Levene test
    #[must_use]
    pub const fn levene_center(&self) -> LeveneCenter {
        self.levene_center
    }

    /// Run the analysis over every row in `storage`
    ///
    /// # Errors
    ///
    /// Returns error if the table cannot be grouped or any statistical step
    /// fails (see [`run_grouped`](Self::run_grouped))
    pub fn run(&self, storage: &StorageEngine) -> Result<AnalysisReport> {
        let grouped = storage.groups()?;
        self.run_grouped(&grouped)
    }

    /// Run the analysis over already grouped samples
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientObservations`] naming the first group with
    ///   fewer than 3 observations
    /// - [`Error::DegenerateSample`] for constant groups or zero total
    ///   variance
    /// - [`Error::InvalidInput`] for fewer than 2 groups
    pub fn run_grouped(&self, grouped: &GroupedSamples) -> Result<AnalysisReport> {
        let _span = info_span!(
            "one_way_analysis",
            groups = grouped.len(),
            observations = grouped.total_observations(),
            alpha = self.alpha,
        )
        .entered();

        if grouped.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "analysis needs at least 2 groups, got {}",
                grouped.len()
            )));
        }

        let groups = grouped
            .groups()
            .iter()
            .map(|group| {
                let normality =
                    shapiro_wilk(&group.values).map_err(|e| e.for_group(&group.label))?;
                debug!(
                    group = %group.label,
                    w = normality.w,
                    p = normality.p_value,
                    "Shapiro-Wilk"
                );
                Ok(GroupDiagnostics {
                    summary: GroupSummary::new(group.label.clone(), &group.values),
                    normality,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let slices = grouped.as_slices();

        let levene = levene(&slices, self.levene_center)?;
        debug!(
            center = %levene.center,
            statistic = levene.statistic,
            p = levene.p_value,
            "Levene"
        );

        let anova = one_way_anova(&slices)?;
        info!(
            f = anova.f_statistic,
            p = anova.p_value,
            significant = anova.is_significant(self.alpha),
            "one-way ANOVA"
        );

        let eta2 = eta_squared(&slices)?;
        let omega2 = omega_squared(&anova);
        let effect_magnitude = EffectMagnitude::from_eta_squared(eta2);
        debug!(eta_squared = eta2, omega_squared = omega2, %effect_magnitude, "effect size");

        let assumptions = self.check_assumptions(&groups, levene.is_homogeneous(self.alpha));

        let post_hoc = if anova.is_significant(self.alpha) {
            let hsd = tukey_hsd(grouped, self.alpha)?;
            debug!(
                q_critical = hsd.q_critical,
                significant_pairs = hsd.significant_pairs().count(),
                "Tukey HSD"
            );
            Some(hsd)
        } else {
            debug!("ANOVA not significant, skipping Tukey HSD");
            None
        };

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            alpha: self.alpha,
            groups,
            levene,
            anova,
            eta_squared: eta2,
            omega_squared: omega2,
            effect_magnitude,
            assumptions,
            post_hoc,
        })
    }

    fn check_assumptions(
        &self,
        groups: &[GroupDiagnostics],
        homogeneity_holds: bool,
    ) -> AssumptionCheck {
        let non_normal_groups: Vec<String> = groups
            .iter()
            .filter(|g| !g.normality.is_normal(self.alpha))
            .map(|g| g.summary.label.clone())
            .collect();

        if !non_normal_groups.is_empty() {
            warn!(
                groups = ?non_normal_groups,
                alpha = self.alpha,
                "normality rejected; ANOVA results may be unreliable"
            );
        }
        if !homogeneity_holds {
            warn!(
                alpha = self.alpha,
                "Levene rejected equal variances; ANOVA results may be unreliable"
            );
        }

        AssumptionCheck {
            normality_holds: non_normal_groups.is_empty(),
            homogeneity_holds,
            non_normal_groups,
        }
    }
}

/// Analysis builder
#[derive(Debug, Clone, Copy)]
pub struct AnalysisBuilder {
    alpha: f64,
    levene_center: LeveneCenter,
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            levene_center: LeveneCenter::default(),
        }
    }
}

impl AnalysisBuilder {
    /// Significance level for the diagnostics, the ANOVA and Tukey HSD
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Centre for the Levene deviations (median by default)
    #[must_use]
    pub fn levene_center(mut self, center: LeveneCenter) -> Self {
        self.levene_center = center;
        self
    }

    /// Build the analysis
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if alpha is outside (0, 1)
    pub fn build(self) -> Result<Analysis> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::InvalidInput(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(Analysis {
            alpha: self.alpha,
            levene_center: self.levene_center,
        })
    }
}
