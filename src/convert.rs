//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use crate::config::*;

use mef_baseline::{BaselineConfig, RangeFilter};
use mef_calendar::{TimeWindow, YearMonth};
use mef_evaluate::{EvaluateConfig, FailurePolicy};
use mef_grid::BoundingBox;
use mef_io::CatalogQuery;
use mef_normalize::NormalizeConfig;

/// Parses the `[window]` section into a [`TimeWindow`].
pub fn parse_window(window: &WindowToml) -> Result<TimeWindow> {
    let start: YearMonth = window
        .start
        .parse()
        .with_context(|| format!("invalid window start {:?}", window.start))?;
    let end: YearMonth = window
        .end
        .parse()
        .with_context(|| format!("invalid window end {:?}", window.end))?;
    Ok(TimeWindow::new(start, end)?)
}

/// Parses a range-filter name, preferring the CLI override.
pub fn parse_range_filter(config: &str, cli: Option<&str>) -> Result<RangeFilter> {
    Ok(cli.unwrap_or(config).parse::<RangeFilter>()?)
}

/// Builds a [`BoundingBox`] from `[lon_min, lon_max, lat_min, lat_max]`.
pub fn build_bbox(grid: &GridToml) -> Result<BoundingBox> {
    BoundingBox::from_array(grid.bbox).context("invalid [grid].bbox")
}

/// Builds a [`BaselineConfig`] from the TOML observation configuration.
pub fn build_baseline_config(
    obs: &ObservationsToml,
    window: TimeWindow,
    range_filter: Option<&str>,
) -> Result<BaselineConfig> {
    let cfg = BaselineConfig::default()
        .with_window(window)
        .with_validity_threshold(obs.validity_threshold)
        .with_min_valid_count(obs.min_valid_count)
        .with_range_filter(parse_range_filter(&obs.range_filter, range_filter)?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`CatalogQuery`] from the TOML query configuration.
pub fn build_query(query: &QueryToml) -> CatalogQuery {
    CatalogQuery::default()
        .with_activity(&query.activity)
        .with_experiment(&query.experiment)
        .with_variable(&query.variable)
        .with_table(&query.table)
        .with_member(&query.member)
        .with_grid_label(&query.grid_label)
}

/// Builds an [`EvaluateConfig`] from the TOML model configuration.
pub fn build_evaluate_config(models: &ModelsToml, window: TimeWindow) -> Result<EvaluateConfig> {
    let policy: FailurePolicy = models.on_failure.parse()?;
    let normalize = NormalizeConfig::default()
        .with_window(window)
        .with_validity_threshold(models.validity_threshold);
    normalize.validate()?;
    Ok(EvaluateConfig::default()
        .with_failure_policy(policy)
        .with_normalize(normalize)
        .with_query(build_query(&models.query)))
}
