//! Per-model outcomes and their compilation into one dataset.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Array3, Array4, Axis};
use tracing::{debug, warn};

use crate::engine::MetricSet;
use crate::error::EvaluateError;
use crate::output::{CompiledDataset, ModelFailure};

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What the pipeline does when one model cannot be scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first failure.
    #[default]
    Abort,
    /// Record the failure and continue with the next model.
    SkipFailed,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::SkipFailed => "skip",
        })
    }
}

impl FromStr for FailurePolicy {
    type Err = EvaluateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" | "skip-failed" | "skip_failed" => Ok(Self::SkipFailed),
            other => Err(EvaluateError::Validation {
                count: 1,
                details: format!("unknown failure policy '{other}' (expected abort or skip)"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelOutcome
// ---------------------------------------------------------------------------

/// Result of processing one model.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    /// The model was scored.
    Success(MetricSet),
    /// The model could not be fetched, normalized or scored.
    Failure {
        /// Model identifier.
        model: String,
        /// Display form of the error.
        reason: String,
    },
}

impl ModelOutcome {
    /// Model identifier.
    pub fn model(&self) -> &str {
        match self {
            Self::Success(set) => set.model(),
            Self::Failure { model, .. } => model,
        }
    }

    /// Whether the model was scored.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

// ---------------------------------------------------------------------------
// ResultAggregator
// ---------------------------------------------------------------------------

/// Ordered collection of model outcomes, in processing order.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    outcomes: Vec<ModelOutcome>,
}

impl ResultAggregator {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scored model.
    pub fn push_success(&mut self, metrics: MetricSet) {
        debug!(model = metrics.model(), "appended metric set");
        self.outcomes.push(ModelOutcome::Success(metrics));
    }

    /// Append a failed model.
    pub fn push_failure(&mut self, model: impl Into<String>, reason: impl Into<String>) {
        let model = model.into();
        let reason = reason.into();
        warn!(model = %model, reason = %reason, "model skipped");
        self.outcomes.push(ModelOutcome::Failure { model, reason });
    }

    /// Every outcome, in processing order.
    pub fn outcomes(&self) -> &[ModelOutcome] {
        &self.outcomes
    }

    /// Number of scored models.
    pub fn n_succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed models.
    pub fn n_failed(&self) -> usize {
        self.outcomes.len() - self.n_succeeded()
    }

    /// Stack every scored model along a new leading `models` axis.
    ///
    /// Failures are carried into the dataset for reporting.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::Empty`] if no model succeeded, and
    /// [`EvaluateError::ShapeMismatch`] or [`EvaluateError::TimeAlignment`]
    /// if a metric set disagrees with the first one.
    pub fn compile(self) -> Result<CompiledDataset, EvaluateError> {
        let mut sets = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                ModelOutcome::Success(set) => sets.push(set),
                ModelOutcome::Failure { model, reason } => {
                    failures.push(ModelFailure { model, reason })
                }
            }
        }
        let Some(first) = sets.first() else {
            return Err(EvaluateError::Empty {
                n_failed: failures.len(),
            });
        };

        let (ny, nx) = first.spatial_shape();
        let n_seasons = first.seasonal().len_of(Axis(0));
        let n_months = first.monthly().len_of(Axis(0));
        let times = first.times().to_vec();
        for set in &sets[1..] {
            check_shape(set, "annual", &[ny, nx], set.annual().shape())?;
            check_shape(set, "seasonal", &[n_seasons, ny, nx], set.seasonal().shape())?;
            check_shape(set, "monthly", &[n_months, ny, nx], set.monthly().shape())?;
            check_shape(set, "binned", &[times.len()], set.binned().shape())?;
            if set.times() != times.as_slice() {
                return Err(EvaluateError::TimeAlignment {
                    model: set.model().to_string(),
                    reason: format!("binned labels differ from model '{}'", first.model()),
                });
            }
        }

        let n = sets.len();
        let mut annual = Array3::from_elem((n, ny, nx), f64::NAN);
        let mut seasonal = Array4::from_elem((n, n_seasons, ny, nx), f64::NAN);
        let mut monthly = Array4::from_elem((n, n_months, ny, nx), f64::NAN);
        let mut binned = Array2::from_elem((n, times.len()), f64::NAN);
        for (k, set) in sets.iter().enumerate() {
            annual.index_axis_mut(Axis(0), k).assign(set.annual());
            seasonal.index_axis_mut(Axis(0), k).assign(set.seasonal());
            monthly.index_axis_mut(Axis(0), k).assign(set.monthly());
            binned.index_axis_mut(Axis(0), k).assign(set.binned());
        }
        let models = sets.into_iter().map(|s| s.model().to_string()).collect();

        Ok(CompiledDataset {
            models,
            times,
            annual,
            seasonal,
            monthly,
            binned,
            failures,
        })
    }
}

fn check_shape(
    set: &MetricSet,
    name: &str,
    expected: &[usize],
    got: &[usize],
) -> Result<(), EvaluateError> {
    if expected == got {
        return Ok(());
    }
    Err(EvaluateError::ShapeMismatch {
        model: set.model().to_string(),
        name: name.to_string(),
        expected: expected.to_vec(),
        got: got.to_vec(),
    })
}
