//! Compiled multi-model dataset and its JSON summary.

use mef_calendar::{Season, YearMonth};
use ndarray::{Array2, Array3, Array4, ArrayView, Axis, Dimension};
use serde::Serialize;

use crate::error::EvaluateError;

/// A model that could not be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelFailure {
    pub model: String,
    pub reason: String,
}

/// Metric sets of every scored model stacked along a leading `models` axis.
#[derive(Debug, Clone)]
pub struct CompiledDataset {
    pub(crate) models: Vec<String>,
    pub(crate) times: Vec<YearMonth>,
    pub(crate) annual: Array3<f64>,
    pub(crate) seasonal: Array4<f64>,
    pub(crate) monthly: Array4<f64>,
    pub(crate) binned: Array2<f64>,
    pub(crate) failures: Vec<ModelFailure>,
}

impl CompiledDataset {
    /// Model names, in processing order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Time labels of the `tdim` axis.
    pub fn times(&self) -> &[YearMonth] {
        &self.times
    }

    /// `MEF_a`, `[models, y, x]`.
    pub fn annual(&self) -> &Array3<f64> {
        &self.annual
    }

    /// `MEF_s`, `[models, season, y, x]`.
    pub fn seasonal(&self) -> &Array4<f64> {
        &self.seasonal
    }

    /// `MEF_m`, `[models, month, y, x]`.
    pub fn monthly(&self) -> &Array4<f64> {
        &self.monthly
    }

    /// `MEF_b`, `[models, tdim]`.
    pub fn binned(&self) -> &Array2<f64> {
        &self.binned
    }

    /// Models skipped under [`FailurePolicy::SkipFailed`](crate::FailurePolicy).
    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    /// Spatial shape `(ny, nx)`.
    pub fn spatial_shape(&self) -> (usize, usize) {
        let (_, ny, nx) = self.annual.dim();
        (ny, nx)
    }

    /// Per-model spatial means, for reporting.
    pub fn summary(&self) -> RunSummary {
        let models = self
            .models
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let seasonal = self.seasonal.index_axis(Axis(0), k);
                let monthly = self.monthly.index_axis(Axis(0), k);
                ModelSummary {
                    model: name.clone(),
                    annual: finite_mean(self.annual.index_axis(Axis(0), k)),
                    seasonal: Season::ALL
                        .iter()
                        .map(|s| SeasonValue {
                            season: s.label(),
                            mef: finite_mean(seasonal.index_axis(Axis(0), s.index())),
                        })
                        .collect(),
                    monthly: monthly
                        .axis_iter(Axis(0))
                        .map(finite_mean)
                        .collect(),
                    binned: finite_mean(self.binned.index_axis(Axis(0), k)),
                }
            })
            .collect();
        RunSummary {
            n_models: self.models.len(),
            n_failed: self.failures.len(),
            window: self
                .times
                .first()
                .zip(self.times.last())
                .map(|(a, b)| format!("{a}..{b}")),
            models,
            failures: self.failures.clone(),
        }
    }
}

/// JSON summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub n_models: usize,
    pub n_failed: usize,
    pub window: Option<String>,
    pub models: Vec<ModelSummary>,
    pub failures: Vec<ModelFailure>,
}

/// Spatial-mean MEF of one model; `None` where no cell is finite.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub annual: Option<f64>,
    pub seasonal: Vec<SeasonValue>,
    /// January..December.
    pub monthly: Vec<Option<f64>>,
    pub binned: Option<f64>,
}

/// Spatial-mean MEF of one season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonValue {
    pub season: &'static str,
    pub mef: Option<f64>,
}

fn finite_mean<D: Dimension>(values: ArrayView<'_, f64, D>) -> Option<f64> {
    let mean = mef_stats::nanmean_iter(values.iter().copied());
    mean.is_finite().then_some(mean)
}

/// Serialize a run summary to a JSON string.
pub fn to_json(summary: &RunSummary) -> Result<String, EvaluateError> {
    serde_json::to_string_pretty(summary).map_err(|e| EvaluateError::Serialization {
        reason: e.to_string(),
    })
}
