//! Combine per-month observation files into one monthly series.

use std::path::{Path, PathBuf};

use mef_calendar::YearMonth;
use ndarray::{Array2, Array3, Axis};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;
use crate::reader::{ReaderConfig, read_projection_axes, read_series};
use crate::series::GriddedSeries;
use crate::writer::{GriddedVariable, write_gridded};

// ---------------------------------------------------------------------------
// CombineConfig
// ---------------------------------------------------------------------------

/// Settings for [`combine_monthly`].
///
/// The [`Default`] matches the NSIDC sea-ice CDR monthly files: the raw
/// variable `cdr_seaice_conc_monthly` is kept and a percent variable `siconc`
/// is derived as `raw / 2.55 * 100`.
#[derive(Debug, Clone)]
pub struct CombineConfig {
    variable: String,
    percent_variable: String,
    divisor: f64,
    reader: ReaderConfig,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            variable: "cdr_seaice_conc_monthly".into(),
            percent_variable: "siconc".into(),
            divisor: 2.55,
            reader: ReaderConfig::default(),
        }
    }
}

impl CombineConfig {
    /// Set the variable read from every input file.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Set the name of the derived percent variable.
    pub fn with_percent_variable(mut self, name: impl Into<String>) -> Self {
        self.percent_variable = name.into();
        self
    }

    /// Set the divisor applied before scaling to percent.
    pub fn with_divisor(mut self, divisor: f64) -> Self {
        self.divisor = divisor;
        self
    }

    /// Set the reader configuration used for every input file.
    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// Raw variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Percent variable name.
    pub fn percent_variable(&self) -> &str {
        &self.percent_variable
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if a name is empty, the two names
    /// coincide, or the divisor is not a finite positive number.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut errors = Vec::new();
        if self.variable.is_empty() {
            errors.push("variable must not be empty".to_string());
        }
        if self.percent_variable.is_empty() {
            errors.push("percent_variable must not be empty".to_string());
        }
        if self.variable == self.percent_variable {
            errors.push(format!(
                "percent_variable must differ from variable '{}'",
                self.variable
            ));
        }
        if !(self.divisor.is_finite() && self.divisor > 0.0) {
            errors.push(format!("divisor must be positive, got {}", self.divisor));
        }
        self.reader.validate()?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: errors.len(),
                details: errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// CombinedObservations
// ---------------------------------------------------------------------------

/// Observation months merged along time, with raw and percent variables.
#[derive(Debug, Clone)]
pub struct CombinedObservations {
    x: Vec<f64>,
    y: Vec<f64>,
    raw: GriddedSeries,
    percent: GriddedSeries,
}

impl CombinedObservations {
    /// Projection x labels.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Projection y labels.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Raw variable as read.
    pub fn raw(&self) -> &GriddedSeries {
        &self.raw
    }

    /// Derived percent variable.
    pub fn percent(&self) -> &GriddedSeries {
        &self.percent
    }

    /// Write both variables to `path` under the configured names.
    ///
    /// # Errors
    ///
    /// Same as [`write_gridded`].
    pub fn write(&self, path: &Path, config: &CombineConfig) -> Result<(), IoError> {
        write_gridded(
            path,
            &self.x,
            &self.y,
            &[
                GriddedVariable::new(&config.variable, &self.raw),
                GriddedVariable::new(&config.percent_variable, &self.percent).with_units("%"),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// combine_monthly
// ---------------------------------------------------------------------------

/// Read every file in `paths`, concatenate along time and sort by month.
///
/// Files may hold one or several months each, in any order.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if `paths` is empty, a month appears
/// twice, or the files disagree on their projection axis values,
/// [`IoError::DimensionMismatch`] if they disagree on their spatial shape,
/// and other [`IoError`] variants on read failures.
pub fn combine_monthly(
    paths: &[PathBuf],
    config: &CombineConfig,
) -> Result<CombinedObservations, IoError> {
    config.validate()?;
    if paths.is_empty() {
        return Err(IoError::Validation {
            count: 1,
            details: "no input files to combine".to_string(),
        });
    }

    let mut axes: Option<(Vec<f64>, Vec<f64>)> = None;
    let mut slices: Vec<(YearMonth, Array2<f64>, &Path)> = Vec::new();

    for path in paths {
        let file = netcdf_read::open_file(path)?;
        let series = read_series(&file, &config.variable, path, &config.reader)?;
        let (ny, nx) = series.spatial_shape();
        let (x, y) = read_projection_axes(&file, path, &config.reader, ny, nx)?;
        match &axes {
            Some((x0, y0)) => {
                check_axis(path, "y", y0, &y)?;
                check_axis(path, "x", x0, &x)?;
            }
            None => axes = Some((x, y)),
        }
        let (values, times) = series.into_parts();
        for (t, slice) in times.into_iter().zip(values.axis_iter(Axis(0))) {
            slices.push((t, slice.to_owned(), path.as_path()));
        }
        debug!(path = %path.display(), "read observation file");
    }

    slices.sort_by_key(|(t, _, _)| *t);
    if let Some(pair) = slices.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(IoError::Validation {
            count: 1,
            details: format!(
                "month {} appears in both {} and {}",
                pair[0].0,
                pair[0].2.display(),
                pair[1].2.display()
            ),
        });
    }

    let (Some((x, y)), Some(first), Some(last)) = (axes, slices.first(), slices.last()) else {
        return Err(IoError::Validation {
            count: 1,
            details: "input files hold no time step".to_string(),
        });
    };
    let (first, last) = (first.0, last.0);
    let mut raw = Array3::from_elem((slices.len(), y.len(), x.len()), f64::NAN);
    for (mut dst, (_, src, _)) in raw.axis_iter_mut(Axis(0)).zip(&slices) {
        dst.assign(src);
    }
    let times: Vec<YearMonth> = slices.iter().map(|(t, _, _)| *t).collect();
    let percent = raw.mapv(|v| v / config.divisor * 100.0);

    info!(
        n_files = paths.len(),
        nt = times.len(),
        %first,
        %last,
        "combined monthly observations"
    );

    Ok(CombinedObservations {
        x,
        y,
        raw: GriddedSeries::new(raw, times.clone())?,
        percent: GriddedSeries::new(percent, times)?,
    })
}

/// Require `got` to repeat the first file's projection axis.
fn check_axis(path: &Path, name: &str, expected: &[f64], got: &[f64]) -> Result<(), IoError> {
    if got.len() != expected.len() {
        return Err(IoError::DimensionMismatch {
            name: format!("{} {name}", path.display()),
            expected: expected.len(),
            got: got.len(),
        });
    }
    if let Some(k) = expected.iter().zip(got).position(|(a, b)| a != b) {
        return Err(IoError::Validation {
            count: 1,
            details: format!(
                "{}: {name}[{k}] is {} but the first file has {}",
                path.display(),
                got[k],
                expected[k]
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = CombineConfig::default();
        assert_eq!(cfg.variable(), "cdr_seaice_conc_monthly");
        assert_eq!(cfg.percent_variable(), "siconc");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_divisor_and_names() {
        let cfg = CombineConfig::default()
            .with_divisor(0.0)
            .with_percent_variable("cdr_seaice_conc_monthly");
        match cfg.validate().unwrap_err() {
            IoError::Validation { count, .. } => assert_eq!(count, 2),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn axes_must_repeat_values() {
        let p = Path::new("b.nc");
        assert!(check_axis(p, "x", &[0.0, 1.0], &[0.0, 1.0]).is_ok());
        assert!(matches!(
            check_axis(p, "x", &[0.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(IoError::DimensionMismatch { .. })
        ));
        match check_axis(p, "y", &[500.0, -500.0], &[500.0, -400.0]).unwrap_err() {
            IoError::Validation { details, .. } => assert!(details.contains("y[1]")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(
            combine_monthly(&[], &CombineConfig::default()),
            Err(IoError::Validation { .. })
        ));
    }
}
