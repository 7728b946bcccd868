//! # anova-lab: One-Way Analysis of Variance over Arrow Tables
//!
//! **Version**: 0.1.0
//!
//! anova-lab compares the mean of a measurement across groups of
//! observations held in an Arrow table. One run checks the assumptions
//! (Shapiro-Wilk per group, Levene across groups), fits the one-way ANOVA,
//! reports eta-squared, and follows a significant result with Tukey's HSD.
//!
//! ## Design Principles
//!
//! - **Typed failures**: every undefined statistic is an [`Error`], never a NaN
//! - **Columnar input**: observations live in Arrow `RecordBatch`es and can be
//!   loaded from Parquet
//! - **Diagnostics inform, never gate**: failed assumption checks are logged and
//!   recorded in the report, the ANOVA still runs
//!
//! ## Example Usage
//!
//! ```rust
//! use anova_lab::{dataset, Analysis};
//!
//! let storage = dataset::strength_table()?;
//! let report = Analysis::builder().alpha(0.05).build()?.run(&storage)?;
//!
//! println!("{report}");
//! assert!(report.eta_squared > 0.9);
//! # Ok::<(), anova_lab::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod storage;

pub use error::{Error, Result};
pub use pipeline::{Analysis, AnalysisBuilder};
pub use report::{AnalysisReport, AssumptionCheck, GroupDiagnostics};
pub use stats::levene::LeveneCenter;
pub use storage::{GroupedSamples, StorageEngine};
