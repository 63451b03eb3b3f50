//! # mef-evaluate
//!
//! Score normalized models against the observation baseline with the Model
//! Efficiency Factor, compile the per-model results into one dataset, and
//! export it.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `engine` | Annual, seasonal, monthly and binned MEF |
//! | `aggregate` | Per-model outcomes, failure policy, compilation |
//! | `output` | Compiled dataset and JSON summary |
//! | `export` | `Exporter` trait, NetCDF and JSON exporters |
//! | `pipeline` | Sequential fetch, normalize, score loop |
//! | `config` | Pipeline configuration |
//! | `error` | Error types |

mod aggregate;
mod config;
mod engine;
mod error;
mod export;
mod output;
mod pipeline;

pub use aggregate::{FailurePolicy, ModelOutcome, ResultAggregator};
pub use config::EvaluateConfig;
pub use engine::{MefTerms, MetricSet, Terms, compute_metrics, compute_terms};
pub use error::EvaluateError;
pub use export::{Exporter, JsonSummaryExporter, NetcdfExporter};
pub use output::{CompiledDataset, ModelFailure, ModelSummary, RunSummary, SeasonValue, to_json};
pub use pipeline::{evaluate_model, run_models};
