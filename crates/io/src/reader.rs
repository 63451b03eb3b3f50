//! High-level NetCDF reader configuration and orchestration.

use std::path::{Path, PathBuf};

use mef_grid::{Grid, SourceGrid};
use ndarray::{Array2, Array3, Axis};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;
use crate::series::{GriddedSeries, ModelSeries};

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Variable and coordinate names used when reading gridded NetCDF files.
///
/// Use the builder methods (`with_*`) to customise names. The [`Default`]
/// implementation supplies names found in CMIP model output and in the
/// polar-stereographic observation products.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases for the projection x-axis labels of a reference grid.
    x_aliases: Vec<String>,
    /// Aliases for the projection y-axis labels of a reference grid.
    y_aliases: Vec<String>,
    /// Time coordinate name. `None` uses the variable named after the data
    /// variable's leading dimension, or `time`.
    time_var: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            lon_aliases: vec!["lon".into(), "longitude".into(), "nav_lon".into()],
            lat_aliases: vec!["lat".into(), "latitude".into(), "nav_lat".into()],
            x_aliases: vec!["x".into(), "xgrid".into()],
            y_aliases: vec!["y".into(), "ygrid".into()],
            time_var: None,
        }
    }
}

impl ReaderConfig {
    /// Set the longitude aliases, tried in order.
    pub fn with_lon_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lon_aliases = aliases;
        self
    }

    /// Set the latitude aliases, tried in order.
    pub fn with_lat_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lat_aliases = aliases;
        self
    }

    /// Set the projection x-axis aliases.
    pub fn with_x_aliases(mut self, aliases: Vec<String>) -> Self {
        self.x_aliases = aliases;
        self
    }

    /// Set the projection y-axis aliases.
    pub fn with_y_aliases(mut self, aliases: Vec<String>) -> Self {
        self.y_aliases = aliases;
        self
    }

    /// Set the time coordinate name explicitly.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = Some(name.into());
        self
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if any alias list is empty.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut errors = Vec::new();
        for (name, list) in [
            ("lon_aliases", &self.lon_aliases),
            ("lat_aliases", &self.lat_aliases),
            ("x_aliases", &self.x_aliases),
            ("y_aliases", &self.y_aliases),
        ] {
            if list.is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }
        if self.time_var.as_deref().is_some_and(str::is_empty) {
            errors.push("time_var must not be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: errors.len(),
                details: errors.join("; "),
            })
        }
    }

    fn refs(list: &[String]) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// read_grid
// ---------------------------------------------------------------------------

/// Read the reference grid and its land mask.
///
/// `lon`/`lat` may be stored per cell (2-D) or as 1-D axes, in which case they
/// are broadcast. When no projection axis is present the cell index is used.
///
/// # Errors
///
/// Returns [`IoError`] on missing variables, shape mismatches or grid
/// construction failures.
pub fn read_grid(path: &Path, landmask_var: &str, config: &ReaderConfig) -> Result<Grid, IoError> {
    config.validate()?;
    let file = netcdf_read::open_file(path)?;

    let mask = netcdf_read::read_field(&file, landmask_var, path, 2, None)?;
    let (ny, nx) = (mask.shape[0], mask.shape[1]);
    let landmask = to_array2(mask.data, ny, nx)?;

    let lon = read_coordinate_2d(&file, &ReaderConfig::refs(&config.lon_aliases), path, ny, nx, Axis(1))?;
    let lat = read_coordinate_2d(&file, &ReaderConfig::refs(&config.lat_aliases), path, ny, nx, Axis(0))?;

    let (x, y) = read_projection_axes(&file, path, config, ny, nx)?;

    let grid = Grid::from_landmask(x, y, lon, lat, landmask.view())?;
    info!(
        path = %path.display(),
        ny,
        nx,
        n_ocean = grid.n_ocean_cells(),
        "read reference grid"
    );
    Ok(grid)
}

/// 2-D coordinate field; a 1-D axis along `along` is broadcast to `(ny, nx)`.
fn read_coordinate_2d(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
    ny: usize,
    nx: usize,
    along: Axis,
) -> Result<Array2<f64>, IoError> {
    let name = netcdf_read::find_variable(file, aliases).ok_or_else(|| IoError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })?;
    let field = netcdf_read::read_squeezed(file, name, path, None)?;

    match field.shape.as_slice() {
        [_, _] => to_array2(field.data, ny, nx),
        [n] => {
            let expected = if along == Axis(1) { nx } else { ny };
            if *n != expected {
                return Err(IoError::DimensionMismatch {
                    name: name.to_string(),
                    expected,
                    got: *n,
                });
            }
            Ok(Array2::from_shape_fn((ny, nx), |(j, i)| {
                if along == Axis(1) {
                    field.data[i]
                } else {
                    field.data[j]
                }
            }))
        }
        other => Err(IoError::DimensionMismatch {
            name: format!("{name} dimensions"),
            expected: 2,
            got: other.len(),
        }),
    }
}

/// Projection `x` and `y` labels, falling back to cell indices.
pub(crate) fn read_projection_axes(
    file: &netcdf::File,
    path: &Path,
    config: &ReaderConfig,
    ny: usize,
    nx: usize,
) -> Result<(Vec<f64>, Vec<f64>), IoError> {
    let x = read_axis_or_index(file, &ReaderConfig::refs(&config.x_aliases), path, nx)?;
    let y = read_axis_or_index(file, &ReaderConfig::refs(&config.y_aliases), path, ny)?;
    Ok((x, y))
}

fn read_axis_or_index(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
    n: usize,
) -> Result<Vec<f64>, IoError> {
    match netcdf_read::find_variable(file, aliases) {
        Some(name) => {
            let values = netcdf_read::read_1d_f64(file, &[name], path)?;
            if values.len() != n {
                return Err(IoError::DimensionMismatch {
                    name: name.to_string(),
                    expected: n,
                    got: values.len(),
                });
            }
            Ok(values)
        }
        None => {
            debug!(aliases = ?aliases, "no projection axis, using cell index");
            Ok((0..n).map(|i| i as f64).collect())
        }
    }
}

fn to_array2(data: Vec<f64>, ny: usize, nx: usize) -> Result<Array2<f64>, IoError> {
    let got = data.len();
    Array2::from_shape_vec((ny, nx), data).map_err(|_| IoError::DimensionMismatch {
        name: "field".into(),
        expected: ny * nx,
        got,
    })
}

pub(crate) fn to_array3(data: Vec<f64>, shape: &[usize]) -> Result<Array3<f64>, IoError> {
    let got = data.len();
    let [nt, ny, nx] = shape else {
        return Err(IoError::DimensionMismatch {
            name: "field dimensions".into(),
            expected: 3,
            got: shape.len(),
        });
    };
    Array3::from_shape_vec((*nt, *ny, *nx), data).map_err(|_| IoError::DimensionMismatch {
        name: "field".into(),
        expected: nt * ny * nx,
        got,
    })
}

// ---------------------------------------------------------------------------
// read_gridded
// ---------------------------------------------------------------------------

/// Read a monthly `[time, y, x]` variable and its decoded time labels.
///
/// # Errors
///
/// Returns [`IoError`] on missing variables, dimension mismatches or time
/// decoding failures.
pub fn read_gridded(path: &Path, var: &str, config: &ReaderConfig) -> Result<GriddedSeries, IoError> {
    config.validate()?;
    let file = netcdf_read::open_file(path)?;
    let series = read_series(&file, var, path, config)?;
    debug!(
        path = %path.display(),
        var,
        nt = series.len(),
        "read gridded series"
    );
    Ok(series)
}

pub(crate) fn read_series(
    file: &netcdf::File,
    var: &str,
    path: &Path,
    config: &ReaderConfig,
) -> Result<GriddedSeries, IoError> {
    // the leading dimension is the time axis; its coordinate variable may
    // carry another name (e.g. dimension `tdim`, variable `time`)
    let time_dim = netcdf_read::leading_dimension(file, var, path)?;
    let time_var = match &config.time_var {
        Some(name) => name.clone(),
        None if file.variable(&time_dim).is_some() => time_dim.clone(),
        None => "time".to_string(),
    };
    let field = netcdf_read::read_field(file, var, path, 3, Some(&time_dim))?;
    let values = to_array3(field.data, &field.shape)?;
    let times = netcdf_read::read_time(file, &time_var, path)?;
    GriddedSeries::new(values, times)
}

// ---------------------------------------------------------------------------
// read_model
// ---------------------------------------------------------------------------

/// Read one model's output from one or more files covering consecutive
/// periods, concatenated along time and sorted by month.
///
/// Every file must share the same `lon`/`lat` coordinates. Months present
/// in more than one file keep the copy from the earliest path.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if `paths` is empty or the files disagree
/// on their grid, and other [`IoError`] variants on read failures.
pub fn read_model(
    id: &str,
    paths: &[PathBuf],
    var: &str,
    config: &ReaderConfig,
) -> Result<ModelSeries, IoError> {
    config.validate()?;
    let Some(first) = paths.first() else {
        return Err(IoError::Validation {
            count: 1,
            details: format!("no files given for model '{id}'"),
        });
    };

    let mut source: Option<SourceGrid> = None;
    let mut slices: Vec<(mef_calendar::YearMonth, Array2<f64>)> = Vec::new();

    for path in paths {
        let file = netcdf_read::open_file(path)?;
        let this_source = read_source_grid(&file, path, config)?;
        match &source {
            Some(s) if *s != this_source => {
                return Err(IoError::Validation {
                    count: 1,
                    details: format!(
                        "{} uses a different grid than {}",
                        path.display(),
                        first.display()
                    ),
                });
            }
            Some(_) => {}
            None => source = Some(this_source),
        }
        let series = read_series(&file, var, path, config)?;
        let (values, times) = series.into_parts();
        for (t, slice) in times.into_iter().zip(values.axis_iter(Axis(0))) {
            slices.push((t, slice.to_owned()));
        }
        debug!(model = id, path = %path.display(), "read model file");
    }
    let source = source.ok_or_else(|| IoError::Validation {
        count: 1,
        details: format!("no files given for model '{id}'"),
    })?;

    // stable sort keeps the earliest path first among duplicates
    slices.sort_by_key(|(t, _)| *t);
    slices.dedup_by_key(|(t, _)| *t);

    let (n_lat, n_lon) = source.shape();
    let mut values = Array3::from_elem((slices.len(), n_lat, n_lon), f64::NAN);
    for (mut dst, (_, src)) in values.axis_iter_mut(Axis(0)).zip(&slices) {
        dst.assign(src);
    }
    let times = slices.iter().map(|(t, _)| *t).collect();

    info!(
        model = id,
        n_files = paths.len(),
        nt = values.len_of(Axis(0)),
        n_lat,
        n_lon,
        "read model series"
    );
    ModelSeries::new(id, GriddedSeries::new(values, times)?, source)
}

/// Read the `lon`/`lat` coordinates of a model file.
///
/// 1-D axes give a rectilinear grid, 2-D fields a curvilinear one.
fn read_source_grid(
    file: &netcdf::File,
    path: &Path,
    config: &ReaderConfig,
) -> Result<SourceGrid, IoError> {
    let lon = read_coordinate(file, &ReaderConfig::refs(&config.lon_aliases), path)?;
    let lat = read_coordinate(file, &ReaderConfig::refs(&config.lat_aliases), path)?;
    match (lon.shape.as_slice(), lat.shape.as_slice()) {
        ([_], [_]) => Ok(SourceGrid::new(lon.data, lat.data)?),
        (&[ny, nx], &[lat_ny, lat_nx]) => {
            if (lat_ny, lat_nx) != (ny, nx) {
                return Err(IoError::DimensionMismatch {
                    name: "latitude".into(),
                    expected: ny * nx,
                    got: lat_ny * lat_nx,
                });
            }
            let lon = to_array2(lon.data, ny, nx)?;
            let lat = to_array2(lat.data, ny, nx)?;
            Ok(SourceGrid::curvilinear(lon, lat)?)
        }
        (l, m) => Err(IoError::Validation {
            count: 1,
            details: format!(
                "{}: longitude and latitude must both be 1-D or both 2-D, got {}-D and {}-D",
                path.display(),
                l.len(),
                m.len()
            ),
        }),
    }
}

fn read_coordinate(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<netcdf_read::Field, IoError> {
    let name = netcdf_read::find_variable(file, aliases).ok_or_else(|| IoError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })?;
    netcdf_read::read_squeezed(file, name, path, None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.lon_aliases, vec!["lon", "longitude", "nav_lon"]);
        assert_eq!(cfg.lat_aliases, vec!["lat", "latitude", "nav_lat"]);
        assert_eq!(cfg.x_aliases, vec!["x", "xgrid"]);
        assert_eq!(cfg.y_aliases, vec!["y", "ygrid"]);
        assert!(cfg.time_var.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let cfg = ReaderConfig::default()
            .with_lon_aliases(vec!["longitude".into()])
            .with_lat_aliases(vec!["latitude".into()])
            .with_x_aliases(vec!["xc".into()])
            .with_y_aliases(vec!["yc".into()])
            .with_time_var("tdim");
        assert_eq!(cfg.lon_aliases, vec!["longitude"]);
        assert_eq!(cfg.lat_aliases, vec!["latitude"]);
        assert_eq!(cfg.x_aliases, vec!["xc"]);
        assert_eq!(cfg.y_aliases, vec!["yc"]);
        assert_eq!(cfg.time_var.as_deref(), Some("tdim"));
    }

    #[test]
    fn validate_collects_every_problem() {
        let cfg = ReaderConfig::default()
            .with_lon_aliases(vec![])
            .with_lat_aliases(vec![])
            .with_time_var("");
        match cfg.validate().unwrap_err() {
            IoError::Validation { count, .. } => assert_eq!(count, 3),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn to_array3_rejects_wrong_rank() {
        assert!(to_array3(vec![0.0; 4], &[2, 2]).is_err());
        assert!(to_array3(vec![0.0; 4], &[1, 2, 3]).is_err());
        assert_eq!(to_array3(vec![0.0; 6], &[1, 2, 3]).unwrap().dim(), (1, 2, 3));
    }
}
