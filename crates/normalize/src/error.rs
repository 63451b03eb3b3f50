//! Error types for mef-normalize.

/// Error type for model normalization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// Returned when a configuration value is out of range.
    #[error("invalid normalize config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the regridded field does not match the reference grid.
    #[error(
        "model '{model}': regridded shape {got_y}x{got_x} does not match grid {expected_y}x{expected_x}"
    )]
    ShapeMismatch {
        /// Model identifier.
        model: String,
        /// Grid rows.
        expected_y: usize,
        /// Grid columns.
        expected_x: usize,
        /// Regridded rows.
        got_y: usize,
        /// Regridded columns.
        got_x: usize,
    },

    /// Returned when the windowed model series and the observations differ in
    /// length.
    #[error("model '{model}': {got} time steps in window, observations have {expected}")]
    TimeAlignment {
        /// Model identifier.
        model: String,
        /// Observation time steps.
        expected: usize,
        /// Model time steps.
        got: usize,
    },

    /// Wraps a regridding or masking failure from mef-grid.
    #[error("grid error: {reason}")]
    Grid {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Wraps a series construction failure from mef-io.
    #[error("series error: {reason}")]
    Series {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl From<mef_grid::GridError> for NormalizeError {
    fn from(e: mef_grid::GridError) -> Self {
        NormalizeError::Grid {
            reason: e.to_string(),
        }
    }
}

impl From<mef_io::IoError> for NormalizeError {
    fn from(e: mef_io::IoError) -> Self {
        NormalizeError::Series {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_time_alignment() {
        let err = NormalizeError::TimeAlignment {
            model: "CESM2".to_string(),
            expected: 432,
            got: 420,
        };
        assert_eq!(
            err.to_string(),
            "model 'CESM2': 420 time steps in window, observations have 432"
        );
    }

    #[test]
    fn display_shape_mismatch() {
        let err = NormalizeError::ShapeMismatch {
            model: "MIROC6".to_string(),
            expected_y: 332,
            expected_x: 316,
            got_y: 10,
            got_x: 20,
        };
        assert_eq!(
            err.to_string(),
            "model 'MIROC6': regridded shape 10x20 does not match grid 332x316"
        );
    }

    #[test]
    fn from_grid_error() {
        let err: NormalizeError = mef_grid::GridError::InvalidCoordinates {
            reason: "lon not increasing".to_string(),
        }
        .into();
        assert!(matches!(err, NormalizeError::Grid { .. }));
        assert!(err.to_string().contains("lon not increasing"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_traits<T: Send + Sync + std::error::Error>() {}
        assert_traits::<NormalizeError>();
    }
}
