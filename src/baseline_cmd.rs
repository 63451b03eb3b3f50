//! Baseline command: prepare the observation baseline and report it.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use mef_baseline::{ObservationBaseline, prepare_baseline};
use mef_grid::Grid;
use mef_io::{GriddedSeries, GriddedVariable, ReaderConfig, read_grid, read_gridded, write_gridded};

use crate::cli::BaselineArgs;
use crate::config::MefConfig;
use crate::convert;

/// Build the restricted reference grid and the observation baseline on it.
///
/// Observations are cut to the grid's bounding-box rectangle and multiplied
/// by its mask before quality control.
pub fn prepare(config: &MefConfig, range_filter: Option<&str>) -> Result<(Grid, ObservationBaseline)> {
    let window = convert::parse_window(&config.window)?;
    let reader = ReaderConfig::default();

    let grid_path = config
        .grid
        .path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no grid path: set [grid].path in config"))?;
    info!(path = %grid_path.display(), "reading reference grid");
    let full = read_grid(grid_path, &config.grid.landmask_var, &reader)
        .with_context(|| format!("failed to read grid: {}", grid_path.display()))?;
    let bbox = convert::build_bbox(&config.grid)?;
    let grid = full.restrict(&bbox).context("failed to restrict grid")?;
    info!(
        ny = grid.shape().0,
        nx = grid.shape().1,
        n_ocean = grid.n_ocean_cells(),
        "reference grid ready"
    );

    let obs_path = config
        .observations
        .path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no observation path: set [observations].path in config"))?;
    info!(path = %obs_path.display(), "reading observations");
    let raw = read_gridded(obs_path, &config.observations.variable, &reader)
        .with_context(|| format!("failed to read observations: {}", obs_path.display()))?;
    let mut values = grid
        .subset(raw.values().view())
        .context("observations do not match the reference grid")?;
    grid.apply_mask(&mut values)?;
    let (_, times) = raw.into_parts();
    let on_grid = GriddedSeries::new(values, times)?;

    let baseline_cfg =
        convert::build_baseline_config(&config.observations, window, range_filter)?;
    let baseline =
        prepare_baseline(&on_grid, &baseline_cfg).context("failed to prepare observation baseline")?;
    Ok((grid, baseline))
}

/// Run the baseline preparation on its own.
pub fn run(args: BaselineArgs) -> Result<()> {
    let _cmd = info_span!("baseline").entered();
    let config = MefConfig::load(&args.config)?;
    let (grid, baseline) = prepare(&config, args.range_filter.as_deref())?;

    println!("{}", baseline.summary());

    if let Some(path) = &args.output {
        write_gridded(
            path,
            grid.x(),
            grid.y(),
            &[GriddedVariable::new("siconc_baseline", baseline.series())],
        )
        .with_context(|| format!("failed to write baseline: {}", path.display()))?;
        info!(path = %path.display(), "baseline series written");
    }
    Ok(())
}
