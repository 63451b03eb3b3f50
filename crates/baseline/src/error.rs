//! Error types for mef-baseline.

/// Error type for observation baseline preparation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BaselineError {
    /// Returned when a configuration value is out of range.
    #[error("invalid baseline config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the observations do not cover every month of the window.
    #[error("observations cover {got} of {expected} window months: {detail}")]
    WindowCoverage {
        /// Months in the window.
        expected: usize,
        /// Months found in the observations.
        got: usize,
        /// First missing or misplaced month.
        detail: String,
    },

    /// Returned when a range-filter name is not recognized.
    #[error("unknown range filter '{name}' (expected one of: {expected})")]
    UnknownRangeFilter {
        /// Name that failed to parse.
        name: String,
        /// Accepted names.
        expected: String,
    },

    /// Wraps a series construction failure from mef-io.
    #[error("series error: {reason}")]
    Series {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl From<mef_io::IoError> for BaselineError {
    fn from(e: mef_io::IoError) -> Self {
        BaselineError::Series {
            reason: e.to_string(),
        }
    }
}
