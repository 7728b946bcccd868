//! Error types for anova-lab
//!
//! Every failure a statistical routine can hit is reported as a typed error
//! instead of a NaN.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// anova-lab error types
#[derive(Error, Debug)]
pub enum Error {
    /// A test needs more observations than the sample provides
    #[error("Insufficient observations in group '{group}': {test} requires at least {required}, got {actual}")]
    InsufficientObservations {
        /// Group label (or "sample" when unlabelled)
        group: String,
        /// Name of the statistical test
        test: &'static str,
        /// Minimum sample size
        required: usize,
        /// Observed sample size
        actual: usize,
    },

    /// Zero variance, zero range or a similar condition that leaves the
    /// statistic undefined
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    /// Invalid argument (alpha outside (0, 1), too few groups, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Probability distribution could not be constructed
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// Storage error (Parquet/Arrow schema, nulls, missing columns)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach a group label to a per-sample error
    ///
    /// Single-sample routines report `group: "sample"`; callers that know
    /// which group they passed in relabel the error with this.
    #[must_use]
    pub fn for_group(self, label: &str) -> Self {
        match self {
            Self::InsufficientObservations {
                test,
                required,
                actual,
                ..
            } => Self::InsufficientObservations {
                group: label.to_string(),
                test,
                required,
                actual,
            },
            Self::DegenerateSample(msg) => {
                Self::DegenerateSample(format!("group '{label}': {msg}"))
            }
            other => other,
        }
    }
}
