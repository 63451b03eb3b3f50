use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level MEF configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MefConfig {
    /// Analysis window.
    #[serde(default)]
    pub window: WindowToml,

    /// Observation source and quality control.
    #[serde(default)]
    pub observations: ObservationsToml,

    /// Reference grid.
    #[serde(default)]
    pub grid: GridToml,

    /// Models to score.
    #[serde(default)]
    pub models: ModelsToml,

    /// Output destinations.
    #[serde(default)]
    pub output: OutputToml,
}

impl MefConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowToml {
    #[serde(default = "default_window_start")]
    pub start: String,
    #[serde(default = "default_window_end")]
    pub end: String,
}

impl Default for WindowToml {
    fn default() -> Self {
        Self {
            start: default_window_start(),
            end: default_window_end(),
        }
    }
}

fn default_window_start() -> String {
    "1978-12".to_string()
}
fn default_window_end() -> String {
    "2014-11".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationsToml {
    pub path: Option<PathBuf>,
    #[serde(default = "default_obs_variable")]
    pub variable: String,
    #[serde(default = "default_obs_threshold")]
    pub validity_threshold: f64,
    #[serde(default = "default_min_valid_count")]
    pub min_valid_count: usize,
    #[serde(default = "default_range_filter")]
    pub range_filter: String,
}

impl Default for ObservationsToml {
    fn default() -> Self {
        Self {
            path: None,
            variable: default_obs_variable(),
            validity_threshold: default_obs_threshold(),
            min_valid_count: default_min_valid_count(),
            range_filter: default_range_filter(),
        }
    }
}

fn default_obs_variable() -> String {
    "cdr_seaice_conc_monthly".to_string()
}
fn default_obs_threshold() -> f64 {
    2.51
}
fn default_min_valid_count() -> usize {
    20
}
fn default_range_filter() -> String {
    "none".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridToml {
    pub path: Option<PathBuf>,
    #[serde(default = "default_landmask_var")]
    pub landmask_var: String,
    /// `[lon_min, lon_max, lat_min, lat_max]`.
    #[serde(default = "default_bbox")]
    pub bbox: [f64; 4],
}

impl Default for GridToml {
    fn default() -> Self {
        Self {
            path: None,
            landmask_var: default_landmask_var(),
            bbox: default_bbox(),
        }
    }
}

fn default_landmask_var() -> String {
    "landmask".to_string()
}
fn default_bbox() -> [f64; 4] {
    [-180.0, 180.0, -80.0, -50.0]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsToml {
    #[serde(default)]
    pub list: Vec<String>,
    pub root: Option<PathBuf>,
    #[serde(default = "default_model_threshold")]
    pub validity_threshold: f64,
    #[serde(default = "default_on_failure")]
    pub on_failure: String,
    #[serde(default)]
    pub query: QueryToml,
}

impl Default for ModelsToml {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            root: None,
            validity_threshold: default_model_threshold(),
            on_failure: default_on_failure(),
            query: QueryToml::default(),
        }
    }
}

fn default_model_threshold() -> f64 {
    100.0
}
fn default_on_failure() -> String {
    "abort".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryToml {
    #[serde(default = "default_activity")]
    pub activity: String,
    #[serde(default = "default_experiment")]
    pub experiment: String,
    #[serde(default = "default_model_variable")]
    pub variable: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_member")]
    pub member: String,
    #[serde(default = "default_grid_label")]
    pub grid_label: String,
}

impl Default for QueryToml {
    fn default() -> Self {
        Self {
            activity: default_activity(),
            experiment: default_experiment(),
            variable: default_model_variable(),
            table: default_table(),
            member: default_member(),
            grid_label: default_grid_label(),
        }
    }
}

fn default_activity() -> String {
    "CMIP".to_string()
}
fn default_experiment() -> String {
    "historical".to_string()
}
fn default_model_variable() -> String {
    "siconc".to_string()
}
fn default_table() -> String {
    "SImon".to_string()
}
fn default_member() -> String {
    "r1i1p1f1".to_string()
}
fn default_grid_label() -> String {
    "gn".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    pub summary: Option<PathBuf>,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            summary: None,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("MEF_compiled.nc")
}
