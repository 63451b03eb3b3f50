//! Error types for mef-grid.

/// Error type for grid construction, subsetting and regridding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when an array or axis has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension or field.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when bounding-box limits are inverted or out of range.
    #[error("invalid bounding box: {reason}")]
    InvalidBoundingBox {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when no grid cell falls inside a bounding box.
    #[error("no grid cell inside {bbox}")]
    EmptySelection {
        /// Display form of the bounding box.
        bbox: String,
    },

    /// Returned when source coordinates cannot be used for interpolation.
    #[error("invalid coordinates: {reason}")]
    InvalidCoordinates {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_dimension_mismatch() {
        let err = GridError::DimensionMismatch {
            name: "lat".to_string(),
            expected: 332,
            got: 316,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'lat' mismatch: expected 332, got 316"
        );
    }

    #[test]
    fn display_empty_selection() {
        let err = GridError::EmptySelection {
            bbox: "lon [0, 1] lat [0, 1]".to_string(),
        };
        assert_eq!(err.to_string(), "no grid cell inside lon [0, 1] lat [0, 1]");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<GridError>();
    }
}
