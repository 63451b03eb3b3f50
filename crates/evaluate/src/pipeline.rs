//! Sequential per-model driver.

use mef_baseline::ObservationBaseline;
use mef_grid::{Grid, Regridder};
use mef_io::ModelSource;
use mef_normalize::normalize_model;
use tracing::{info, info_span};

use crate::aggregate::{FailurePolicy, ResultAggregator};
use crate::config::EvaluateConfig;
use crate::engine::{MetricSet, compute_metrics};
use crate::error::EvaluateError;
use crate::output::CompiledDataset;

/// Fetch, normalize and score one model.
///
/// # Errors
///
/// Returns [`EvaluateError::ModelFailed`] wrapping any fetch or
/// normalization error, and the errors of
/// [`compute_metrics`](crate::compute_metrics).
pub fn evaluate_model(
    model: &str,
    source: &dyn ModelSource,
    grid: &Grid,
    baseline: &ObservationBaseline,
    regridder: &dyn Regridder,
    config: &EvaluateConfig,
) -> Result<MetricSet, EvaluateError> {
    let failed = |reason: String| EvaluateError::ModelFailed {
        model: model.to_string(),
        reason,
    };
    let raw = source
        .fetch(model, config.query())
        .map_err(|e| failed(e.to_string()))?;
    let normalized = normalize_model(
        &raw,
        grid,
        baseline.series().times(),
        regridder,
        config.normalize(),
    )
    .map_err(|e| failed(e.to_string()))?;
    drop(raw);
    compute_metrics(baseline, &normalized)
}

/// Score every model of `models` in order and compile the results.
///
/// Models are processed one at a time. Under [`FailurePolicy::Abort`] the
/// first failure ends the run; under [`FailurePolicy::SkipFailed`] it is
/// recorded in the dataset and the next model is processed.
///
/// # Errors
///
/// Returns [`EvaluateError::Validation`] for an empty model list, the
/// failing model's error under [`FailurePolicy::Abort`], and the errors of
/// [`ResultAggregator::compile`].
pub fn run_models(
    models: &[String],
    source: &dyn ModelSource,
    grid: &Grid,
    baseline: &ObservationBaseline,
    regridder: &dyn Regridder,
    config: &EvaluateConfig,
) -> Result<CompiledDataset, EvaluateError> {
    if models.is_empty() {
        return Err(EvaluateError::Validation {
            count: 1,
            details: "model list is empty".to_string(),
        });
    }
    config.normalize().validate().map_err(|e| EvaluateError::Validation {
        count: 1,
        details: e.to_string(),
    })?;

    let policy = config.failure_policy();
    let mut aggregator = ResultAggregator::new();
    for (k, model) in models.iter().enumerate() {
        let _span = info_span!("model", model = %model, index = k).entered();
        match evaluate_model(model, source, grid, baseline, regridder, config) {
            Ok(metrics) => {
                info!(model = %model, "scored model");
                aggregator.push_success(metrics);
            }
            Err(e) => match policy {
                FailurePolicy::Abort => return Err(e),
                FailurePolicy::SkipFailed => aggregator.push_failure(model.as_str(), e.to_string()),
            },
        }
    }

    info!(
        n_models = models.len(),
        n_succeeded = aggregator.n_succeeded(),
        n_failed = aggregator.n_failed(),
        "finished model loop"
    );
    aggregator.compile()
}
