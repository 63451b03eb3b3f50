//! Persisting a compiled dataset.

use std::path::Path;

use mef_calendar::Season;
use mef_grid::Grid;
use ndarray::{ArrayBase, Data, Dimension};
use tracing::info;

use crate::error::EvaluateError;
use crate::output::{CompiledDataset, to_json};

/// Destination for a compiled dataset.
pub trait Exporter {
    /// Write `dataset` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::Export`] if the file cannot be written.
    fn export(&self, dataset: &CompiledDataset, path: &Path) -> Result<(), EvaluateError>;
}

// ---------------------------------------------------------------------------
// NetCDF
// ---------------------------------------------------------------------------

/// Writes the dataset as NetCDF with dimensions `models`, `y`, `x`,
/// `season`, `month` and `tdim`.
///
/// Variables: `MEF_a`, `MEF_s`, `MEF_m`, `MEF_b`, the `model_name` labels,
/// `season` / `month` / `tdim` labels, `x`, `y`, and 2-D `lon` / `lat`
/// taken from the reference grid.
#[derive(Debug, Clone, Copy)]
pub struct NetcdfExporter<'a> {
    grid: &'a Grid,
}

impl<'a> NetcdfExporter<'a> {
    /// Exporter writing coordinates of `grid`.
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }
}

impl Exporter for NetcdfExporter<'_> {
    fn export(&self, dataset: &CompiledDataset, path: &Path) -> Result<(), EvaluateError> {
        if dataset.spatial_shape() != self.grid.shape() {
            let (ny, nx) = self.grid.shape();
            let (got_y, got_x) = dataset.spatial_shape();
            return Err(EvaluateError::ShapeMismatch {
                model: dataset.models().join(","),
                name: "compiled dataset".to_string(),
                expected: vec![ny, nx],
                got: vec![got_y, got_x],
            });
        }
        write_netcdf(dataset, self.grid, path).map_err(|e| EvaluateError::Export {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(
            path = %path.display(),
            n_models = dataset.models().len(),
            "wrote compiled MEF dataset"
        );
        Ok(())
    }
}

fn write_netcdf(dataset: &CompiledDataset, grid: &Grid, path: &Path) -> Result<(), netcdf::Error> {
    let (ny, nx) = grid.shape();
    let mut file = netcdf::create(path)?;
    file.add_dimension("models", dataset.models().len())?;
    file.add_dimension("y", ny)?;
    file.add_dimension("x", nx)?;
    file.add_dimension("season", Season::ALL.len())?;
    file.add_dimension("month", 12)?;
    file.add_dimension("tdim", dataset.times().len())?;

    {
        let mut var = file.add_string_variable("model_name", &["models"])?;
        for (i, name) in dataset.models().iter().enumerate() {
            var.put_string(name, [i])?;
        }
    }
    {
        let mut var = file.add_string_variable("season", &["season"])?;
        for s in Season::ALL {
            var.put_string(s.label(), [s.index()])?;
        }
    }
    {
        let mut var = file.add_variable::<i32>("month", &["month"])?;
        let months: Vec<i32> = (1..=12).collect();
        var.put_values(&months, ..)?;
    }
    {
        let mut var = file.add_string_variable("tdim", &["tdim"])?;
        for (i, t) in dataset.times().iter().enumerate() {
            var.put_string(&t.to_string(), [i])?;
        }
    }
    {
        let mut var = file.add_variable::<f64>("x", &["x"])?;
        var.put_values(grid.x(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("y", &["y"])?;
        var.put_values(grid.y(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["y", "x"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(&flatten(grid.lon()), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["y", "x"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(&flatten(grid.lat()), ..)?;
    }

    let fields: [(&str, &[&str], Vec<f64>, &str); 4] = [
        ("MEF_a", &["models", "y", "x"], flatten(dataset.annual()), "whole-record MEF"),
        (
            "MEF_s",
            &["models", "season", "y", "x"],
            flatten(dataset.seasonal()),
            "seasonal MEF",
        ),
        (
            "MEF_m",
            &["models", "month", "y", "x"],
            flatten(dataset.monthly()),
            "monthly MEF",
        ),
        ("MEF_b", &["models", "tdim"], flatten(dataset.binned()), "spatially binned MEF"),
    ];
    for (name, dims, data, long_name) in fields {
        let mut var = file.add_variable::<f64>(name, dims)?;
        var.put_attribute("long_name", long_name)?;
        var.put_values(&data, ..)?;
    }
    Ok(())
}

/// Row-major copy of an array.
fn flatten<S: Data<Elem = f64>, D: Dimension>(a: &ArrayBase<S, D>) -> Vec<f64> {
    a.iter().copied().collect()
}

// ---------------------------------------------------------------------------
// JSON summary
// ---------------------------------------------------------------------------

/// Writes [`CompiledDataset::summary`] as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSummaryExporter;

impl Exporter for JsonSummaryExporter {
    fn export(&self, dataset: &CompiledDataset, path: &Path) -> Result<(), EvaluateError> {
        let json = to_json(&dataset.summary())?;
        std::fs::write(path, json).map_err(|e| EvaluateError::Export {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "wrote run summary");
        Ok(())
    }
}
