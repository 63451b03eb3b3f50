//! Evaluation error types.

use std::path::PathBuf;

/// Errors that can occur while scoring, compiling or exporting.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// One or more validation checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// An array does not have the shape the other inputs imply.
    #[error("model '{model}': {name} has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        model: String,
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Model and observation time labels differ.
    #[error("model '{model}': time labels differ from observations ({reason})")]
    TimeAlignment { model: String, reason: String },

    /// No model produced a metric set.
    #[error("no model was scored successfully ({n_failed} failed)")]
    Empty { n_failed: usize },

    /// Fetching or normalizing a model failed.
    #[error("model '{model}' failed: {reason}")]
    ModelFailed { model: String, reason: String },

    /// Writing an output file failed.
    #[error("failed to export {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = EvaluateError::Validation {
            count: 2,
            details: "empty model list".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("2 validation error(s)"));
        assert!(msg.contains("empty model list"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = EvaluateError::ShapeMismatch {
            model: "CESM2".to_string(),
            name: "annual".to_string(),
            expected: vec![3, 4],
            got: vec![3, 5],
        };
        assert_eq!(
            err.to_string(),
            "model 'CESM2': annual has shape [3, 5], expected [3, 4]"
        );
    }

    #[test]
    fn test_model_failed_display() {
        let err = EvaluateError::ModelFailed {
            model: "GFDL-CM4".to_string(),
            reason: "source unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "model 'GFDL-CM4' failed: source unavailable");
    }

    #[test]
    fn test_empty_display() {
        let err = EvaluateError::Empty { n_failed: 3 };
        assert!(err.to_string().contains("3 failed"));
    }

    #[test]
    fn test_export_display() {
        let err = EvaluateError::Export {
            path: PathBuf::from("/tmp/out.nc"),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to export /tmp/out.nc: permission denied"
        );
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_traits<T: Send + Sync + std::error::Error>() {}
        assert_traits::<EvaluateError>();
    }
}
