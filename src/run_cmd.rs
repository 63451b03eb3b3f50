//! Run command: score every configured model and export the results.

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use mef_evaluate::{Exporter, JsonSummaryExporter, NetcdfExporter, run_models};
use mef_grid::BilinearRegridder;
use mef_io::LocalCatalog;

use crate::baseline_cmd;
use crate::cli::RunArgs;
use crate::config::MefConfig;
use crate::convert;

/// Run the full pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();
    // 1. Load project TOML
    let config = MefConfig::load(&args.config)?;
    if config.models.list.is_empty() {
        bail!("no models to score: set [models].list in config");
    }
    let root = config
        .models
        .root
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no model root: set [models].root in config"))?;
    let window = convert::parse_window(&config.window)?;
    let eval_cfg = convert::build_evaluate_config(&config.models, window)?;

    // 2. Reference grid and observation baseline, built once
    let (grid, baseline) = baseline_cmd::prepare(&config, args.range_filter.as_deref())?;
    info!(summary = %baseline.summary(), "observation baseline ready");

    // 3. Score models in list order
    let catalog = LocalCatalog::new(root);
    let regridder = BilinearRegridder::default();
    let dataset = run_models(
        &config.models.list,
        &catalog,
        &grid,
        &baseline,
        &regridder,
        &eval_cfg,
    )
    .context("model evaluation failed")?;
    for failure in dataset.failures() {
        eprintln!("skipped {}: {}", failure.model, failure.reason);
    }

    // 4. Export
    let output = args.output.unwrap_or_else(|| config.output.path.clone());
    NetcdfExporter::new(&grid)
        .export(&dataset, &output)
        .context("failed to export compiled dataset")?;

    if let Some(summary) = args.summary.or_else(|| config.output.summary.clone()) {
        JsonSummaryExporter
            .export(&dataset, &summary)
            .context("failed to export run summary")?;
    }

    info!(
        n_models = dataset.models().len(),
        n_failed = dataset.failures().len(),
        path = %output.display(),
        "run complete"
    );
    Ok(())
}
