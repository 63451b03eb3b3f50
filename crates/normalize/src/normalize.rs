//! Model normalization onto the reference grid.

use mef_calendar::YearMonth;
use mef_grid::{Grid, Regridder};
use mef_io::{GriddedSeries, ModelSeries};
use tracing::{debug, info};

use crate::align::align_time;
use crate::config::NormalizeConfig;
use crate::error::NormalizeError;

/// Model series on the reference grid, in fractions, labeled with the
/// observation months.
#[derive(Debug, Clone)]
pub struct RegriddedModelSeries {
    id: String,
    series: GriddedSeries,
}

impl RegriddedModelSeries {
    /// Wrap a series that is already on the reference grid, in fractions and
    /// labeled with the observation months.
    pub fn new(id: impl Into<String>, series: GriddedSeries) -> Self {
        Self {
            id: id.into(),
            series,
        }
    }

    /// Model identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field `[time, y, x]` and time labels.
    pub fn series(&self) -> &GriddedSeries {
        &self.series
    }

    /// Split into identifier and series.
    pub fn into_parts(self) -> (String, GriddedSeries) {
        (self.id, self.series)
    }
}

/// Bring one model onto the reference grid and time axis.
///
/// Steps, in order:
/// 1. keep the months of the configured window;
/// 2. values above the validity threshold become NaN;
/// 3. interpolate every time slice onto `grid` with `regridder`;
/// 4. multiply by the grid mask;
/// 5. relabel with `obs_times` (see [`align_time`]);
/// 6. divide by the percent scale.
///
/// # Errors
///
/// Returns [`NormalizeError::ShapeMismatch`] if the regridded field does not
/// match `grid`, [`NormalizeError::TimeAlignment`] if the windowed model
/// length differs from `obs_times`, and [`NormalizeError::Grid`] if
/// interpolation weights cannot be built.
pub fn normalize_model(
    model: &ModelSeries,
    grid: &Grid,
    obs_times: &[YearMonth],
    regridder: &dyn Regridder,
    config: &NormalizeConfig,
) -> Result<RegriddedModelSeries, NormalizeError> {
    config.validate()?;
    let id = model.id();

    let windowed = model.series().select_window(config.window());
    debug!(model = id, nt = windowed.len(), "sliced model to window");
    let (mut raw, times) = windowed.into_parts();

    let threshold = config.validity_threshold();
    raw.mapv_inplace(|v| if v > threshold { f64::NAN } else { v });

    let weights = regridder.weights(model.source(), grid)?;
    let (ny, nx) = grid.shape();
    let (got_y, got_x) = weights.target_shape();
    if (got_y, got_x) != (ny, nx) {
        return Err(NormalizeError::ShapeMismatch {
            model: id.to_string(),
            expected_y: ny,
            expected_x: nx,
            got_y,
            got_x,
        });
    }
    let mut values = weights.apply(raw.view())?;
    grid.apply_mask(&mut values)?;

    let series = align_time(id, GriddedSeries::new(values, times)?, obs_times)?;
    let scale = config.percent_scale();
    let (mut values, times) = series.into_parts();
    values.mapv_inplace(|v| v / scale);

    info!(
        model = id,
        nt = times.len(),
        n_unmapped = weights.n_unmapped(),
        "normalized model onto reference grid"
    );
    Ok(RegriddedModelSeries::new(
        id,
        GriddedSeries::new(values, times)?,
    ))
}
