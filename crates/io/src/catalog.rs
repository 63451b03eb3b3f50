//! Model discovery: resolving a model name to its output files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::IoError;
use crate::reader::{ReaderConfig, read_model};
use crate::series::ModelSeries;

// ---------------------------------------------------------------------------
// CatalogQuery
// ---------------------------------------------------------------------------

/// CMIP facets selecting one variable of one experiment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    activity: String,
    experiment: String,
    variable: String,
    table: String,
    member: String,
    grid_label: String,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            activity: "CMIP".into(),
            experiment: "historical".into(),
            variable: "siconc".into(),
            table: "SImon".into(),
            member: "r1i1p1f1".into(),
            grid_label: "gn".into(),
        }
    }
}

impl CatalogQuery {
    /// Set the activity (`CMIP`, `ScenarioMIP`, ...).
    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    /// Set the experiment (`historical`, `ssp585`, ...).
    pub fn with_experiment(mut self, experiment: impl Into<String>) -> Self {
        self.experiment = experiment.into();
        self
    }

    /// Set the variable name, which is also the NetCDF variable read.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Set the table (`SImon`, `OImon`, ...).
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the ensemble member (`r1i1p1f1`, ...).
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = member.into();
        self
    }

    /// Set the grid label (`gn`, `gr`, ...).
    pub fn with_grid_label(mut self, grid_label: impl Into<String>) -> Self {
        self.grid_label = grid_label.into();
        self
    }

    /// Activity facet.
    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// Experiment facet.
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Variable facet.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Table facet.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Member facet.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Grid-label facet.
    pub fn grid_label(&self) -> &str {
        &self.grid_label
    }

    /// CMIP file-name stem for `model`:
    /// `{variable}_{table}_{model}_{experiment}_{member}_{grid_label}`.
    pub fn file_stem(&self, model: &str) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}",
            self.variable, self.table, model, self.experiment, self.member, self.grid_label
        )
    }

    /// Validate that no facet is empty.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every empty facet.
    pub fn validate(&self) -> Result<(), IoError> {
        let empty: Vec<&str> = [
            ("activity", &self.activity),
            ("experiment", &self.experiment),
            ("variable", &self.variable),
            ("table", &self.table),
            ("member", &self.member),
            ("grid_label", &self.grid_label),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();
        if empty.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: empty.len(),
                details: format!("empty catalog facet(s): {}", empty.join(", ")),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// ModelSource
// ---------------------------------------------------------------------------

/// Provider of raw model output.
pub trait ModelSource {
    /// Fetch the series of `model` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::SourceUnavailable`] when the source holds no data
    /// for the model, and other [`IoError`] variants on read failures.
    fn fetch(&self, model: &str, query: &CatalogQuery) -> Result<ModelSeries, IoError>;
}

/// Model files stored in a local directory tree.
///
/// Files are looked up in `{root}/{activity}` first, then in `{root}`, by the
/// CMIP name pattern `{stem}*.nc` (see [`CatalogQuery::file_stem`]). All
/// matches are read and concatenated in time order.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    root: PathBuf,
    reader: ReaderConfig,
}

impl LocalCatalog {
    /// Catalog rooted at `root`, reading with the default [`ReaderConfig`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reader: ReaderConfig::default(),
        }
    }

    /// Use a custom reader configuration.
    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of every file matching `model` and `query`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Filesystem`] if a directory cannot be listed.
    pub fn resolve(&self, model: &str, query: &CatalogQuery) -> Result<Vec<PathBuf>, IoError> {
        let stem = query.file_stem(model);
        for dir in [self.root.join(query.activity()), self.root.clone()] {
            if !dir.is_dir() {
                continue;
            }
            let mut matches = matching_files(&dir, &stem)?;
            if !matches.is_empty() {
                matches.sort();
                debug!(
                    model,
                    dir = %dir.display(),
                    n_files = matches.len(),
                    "resolved model files"
                );
                return Ok(matches);
            }
        }
        Ok(Vec::new())
    }
}

impl ModelSource for LocalCatalog {
    fn fetch(&self, model: &str, query: &CatalogQuery) -> Result<ModelSeries, IoError> {
        query.validate()?;
        let paths = self.resolve(model, query)?;
        if paths.is_empty() {
            warn!(model, root = %self.root.display(), "no files for model");
            return Err(IoError::SourceUnavailable {
                model: model.to_string(),
                reason: format!(
                    "no file matching '{}*.nc' under {}",
                    query.file_stem(model),
                    self.root.display()
                ),
            });
        }
        read_model(model, &paths, query.variable(), &self.reader)
    }
}

/// Files in `dir` named `{stem}.nc` or `{stem}_*.nc`.
fn matching_files(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::Filesystem {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::Filesystem {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(rest) = name.strip_prefix(stem) else {
            continue;
        };
        // the stem must end at a facet boundary, so "CESM2" does not match "CESM2-WACCM"
        if name.ends_with(".nc") && (rest == ".nc" || rest.starts_with('_')) {
            out.push(entry.path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_query_and_stem() {
        let q = CatalogQuery::default();
        assert_eq!(q.activity(), "CMIP");
        assert_eq!(
            q.file_stem("CESM2"),
            "siconc_SImon_CESM2_historical_r1i1p1f1_gn"
        );
        assert!(q.validate().is_ok());
    }

    #[test]
    fn builders_set_facets() {
        let q = CatalogQuery::default()
            .with_activity("ScenarioMIP")
            .with_experiment("ssp585")
            .with_variable("siconca")
            .with_table("SImon")
            .with_member("r2i1p1f1")
            .with_grid_label("gr");
        assert_eq!(
            q.file_stem("MIROC6"),
            "siconca_SImon_MIROC6_ssp585_r2i1p1f1_gr"
        );
    }

    #[test]
    fn validate_reports_empty_facets() {
        let q = CatalogQuery::default().with_member("").with_table("");
        match q.validate().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("member"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn resolve_matches_stem_boundary_and_sorts() {
        let dir = tempdir().unwrap();
        let q = CatalogQuery::default();
        let stem = q.file_stem("CESM2");
        for name in [
            format!("{stem}_200001-201412.nc"),
            format!("{stem}_185001-189912.nc"),
            "siconc_SImon_CESM2-WACCM_historical_r1i1p1f1_gn_185001-201412.nc".to_string(),
            format!("{stem}_185001-189912.txt"),
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = LocalCatalog::new(dir.path()).resolve("CESM2", &q).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                format!("{stem}_185001-189912.nc"),
                format!("{stem}_200001-201412.nc"),
            ]
        );
    }

    #[test]
    fn resolve_prefers_activity_directory() {
        let dir = tempdir().unwrap();
        let q = CatalogQuery::default();
        let stem = q.file_stem("NorESM2-LM");
        std::fs::create_dir(dir.path().join("CMIP")).unwrap();
        std::fs::write(dir.path().join("CMIP").join(format!("{stem}.nc")), b"").unwrap();
        std::fs::write(dir.path().join(format!("{stem}.nc")), b"").unwrap();
        let found = LocalCatalog::new(dir.path())
            .resolve("NorESM2-LM", &q)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].parent().unwrap().ends_with("CMIP"));
    }

    #[test]
    fn fetch_without_files_is_source_unavailable() {
        let dir = tempdir().unwrap();
        let err = LocalCatalog::new(dir.path())
            .fetch("GFDL-CM4", &CatalogQuery::default())
            .unwrap_err();
        assert!(matches!(err, IoError::SourceUnavailable { .. }));
    }
}
