//! NetCDF output of monthly gridded series.

use std::path::Path;

use chrono::NaiveDate;
use mef_calendar::YearMonth;
use tracing::info;

use crate::error::IoError;
use crate::series::GriddedSeries;

/// Reference date of written time coordinates.
const TIME_UNITS: &str = "days since 1970-01-01";

/// One variable to write: name, optional units and data.
#[derive(Debug, Clone, Copy)]
pub struct GriddedVariable<'a> {
    name: &'a str,
    units: Option<&'a str>,
    series: &'a GriddedSeries,
}

impl<'a> GriddedVariable<'a> {
    /// Variable `name` holding `series`.
    pub fn new(name: &'a str, series: &'a GriddedSeries) -> Self {
        Self {
            name,
            units: None,
            series,
        }
    }

    /// Attach a `units` attribute.
    pub fn with_units(mut self, units: &'a str) -> Self {
        self.units = Some(units);
        self
    }
}

/// Write one or more `[time, y, x]` variables sharing a time axis.
///
/// The file gets dimensions `time`, `y`, `x`, projection axes `x` / `y` and a
/// `time` coordinate on the standard calendar, with each month stamped at
/// day 15.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if `variables` is empty or the variables
/// disagree on time labels, [`IoError::DimensionMismatch`] if a shape does
/// not match the axes, and [`IoError::Netcdf`] on write failures.
pub fn write_gridded(
    path: &Path,
    x: &[f64],
    y: &[f64],
    variables: &[GriddedVariable<'_>],
) -> Result<(), IoError> {
    let Some(first) = variables.first() else {
        return Err(IoError::Validation {
            count: 1,
            details: "no variable to write".to_string(),
        });
    };
    let times = first.series.times();
    for v in variables {
        if v.series.times() != times {
            return Err(IoError::Validation {
                count: 1,
                details: format!(
                    "variable '{}' has different time labels than '{}'",
                    v.name, first.name
                ),
            });
        }
        let (ny, nx) = v.series.spatial_shape();
        if ny != y.len() {
            return Err(IoError::DimensionMismatch {
                name: format!("{} y", v.name),
                expected: y.len(),
                got: ny,
            });
        }
        if nx != x.len() {
            return Err(IoError::DimensionMismatch {
                name: format!("{} x", v.name),
                expected: x.len(),
                got: nx,
            });
        }
    }

    let offsets = times
        .iter()
        .map(|&t| days_since_epoch(t))
        .collect::<Result<Vec<f64>, IoError>>()?;

    let mut file = netcdf::create(path)?;
    file.add_dimension("time", times.len())?;
    file.add_dimension("y", y.len())?;
    file.add_dimension("x", x.len())?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", TIME_UNITS)?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&offsets, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("x", &["x"])?;
        var.put_values(x, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("y", &["y"])?;
        var.put_values(y, ..)?;
    }

    for v in variables {
        let mut var = file.add_variable::<f64>(v.name, &["time", "y", "x"])?;
        if let Some(units) = v.units {
            var.put_attribute("units", units)?;
        }
        let data: Vec<f64> = v.series.values().iter().copied().collect();
        var.put_values(&data, ..)?;
    }

    info!(
        path = %path.display(),
        n_vars = variables.len(),
        nt = times.len(),
        "wrote gridded series"
    );
    Ok(())
}

/// Days from 1970-01-01 to the 15th of `month`.
fn days_since_epoch(month: YearMonth) -> Result<f64, IoError> {
    let date = NaiveDate::from_ymd_opt(month.year(), u32::from(month.month()), 15).ok_or_else(
        || IoError::InvalidTime {
            reason: format!("{month} is outside the supported date range"),
        },
    )?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| IoError::InvalidTime {
        reason: "epoch out of range".to_string(),
    })?;
    Ok((date - epoch).num_days() as f64)
}
