//! Integration tests against NetCDF fixtures written to a temporary directory.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use mef_calendar::YearMonth;
use mef_io::{
    CatalogQuery, CombineConfig, IoError, LocalCatalog, ModelSource, ReaderConfig,
    combine_monthly, read_grid, read_gridded, read_model,
};
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

fn ym(y: i32, m: u8) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

/// Mid-month offsets in a 365-day calendar from 1850-01-01.
fn noleap_offsets(first: YearMonth, n: usize) -> Vec<f64> {
    const CUM: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    mef_calendar::month_sequence(first, n)
        .into_iter()
        .map(|m| {
            let days = i64::from(m.year() - 1850) * 365 + CUM[m.month_index()] + 14;
            days as f64
        })
        .collect()
}

/// Reference grid: 2 x 3 cells, 2-D lon/lat, one land cell.
fn write_grid(dir: &Path) -> PathBuf {
    let path = dir.join("grid.nc");
    let mut file = netcdf::create(&path).expect("create grid file");
    file.add_dimension("y", 2).unwrap();
    file.add_dimension("x", 3).unwrap();
    {
        let mut v = file.add_variable::<f64>("x", &["x"]).unwrap();
        v.put_values(&[-1000.0, 0.0, 1000.0], ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("y", &["y"]).unwrap();
        v.put_values(&[500.0, -500.0], ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("longitude", &["y", "x"]).unwrap();
        v.put_values(&[-90.0, 0.0, 90.0, -90.0, 0.0, 90.0], ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("latitude", &["y", "x"]).unwrap();
        v.put_values(&[-60.0, -60.0, -60.0, -70.0, -70.0, -70.0], ..)
            .unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("landmask", &["y", "x"]).unwrap();
        v.put_values(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0], ..).unwrap();
    }
    path
}

/// Model file on a 2 x 4 rectilinear grid with a degenerate level axis.
fn write_model(dir: &Path, name: &str, first: YearMonth, n: usize, value: impl Fn(usize) -> f64) -> PathBuf {
    let path = dir.join(name);
    let mut file = netcdf::create(&path).expect("create model file");
    file.add_dimension("time", n).unwrap();
    file.add_dimension("lev", 1).unwrap();
    file.add_dimension("lat", 2).unwrap();
    file.add_dimension("lon", 4).unwrap();
    {
        let mut v = file.add_variable::<f64>("time", &["time"]).unwrap();
        v.put_attribute("units", "days since 1850-01-01 00:00:00").unwrap();
        v.put_attribute("calendar", "noleap").unwrap();
        v.put_values(&noleap_offsets(first, n), ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        v.put_values(&[-75.0, -55.0], ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        v.put_values(&[0.0, 90.0, 180.0, 270.0], ..).unwrap();
    }
    {
        let mut v = file
            .add_variable::<f64>("siconc", &["time", "lev", "lat", "lon"])
            .unwrap();
        v.put_attribute("_FillValue", 1e20).unwrap();
        let data: Vec<f64> = (0..n * 8).map(|i| value(i / 8)).collect();
        v.put_values(&data, ..).unwrap();
    }
    path
}

/// Model file on a 3 x 4 curvilinear grid with `(j, i)` index dimensions.
fn write_curvilinear_model(dir: &Path, name: &str, n: usize) -> PathBuf {
    let path = dir.join(name);
    let mut file = netcdf::create(&path).expect("create model file");
    file.add_dimension("time", n).unwrap();
    file.add_dimension("j", 3).unwrap();
    file.add_dimension("i", 4).unwrap();
    {
        let mut v = file.add_variable::<f64>("time", &["time"]).unwrap();
        v.put_attribute("units", "days since 1850-01-01 00:00:00").unwrap();
        v.put_attribute("calendar", "noleap").unwrap();
        v.put_values(&noleap_offsets(ym(1978, 12), n), ..).unwrap();
    }
    {
        let lon: Vec<f64> = (0..12).map(|k| 80.0 * (k % 4) as f64 + 5.0 * (k / 4) as f64).collect();
        let mut v = file.add_variable::<f64>("longitude", &["j", "i"]).unwrap();
        v.put_values(&lon, ..).unwrap();
    }
    {
        let lat: Vec<f64> = (0..12).map(|k| -78.0 + 10.0 * (k / 4) as f64 + (k % 4) as f64).collect();
        let mut v = file.add_variable::<f64>("latitude", &["j", "i"]).unwrap();
        v.put_values(&lat, ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("siconc", &["time", "j", "i"]).unwrap();
        v.put_attribute("_FillValue", 1e20).unwrap();
        let data: Vec<f64> = (0..n * 12).map(|k| (k % 12) as f64).collect();
        v.put_values(&data, ..).unwrap();
    }
    path
}

/// Single-month observation file on a 2 x 3 projection grid.
fn write_obs_month(dir: &Path, name: &str, month: YearMonth, raw: f64) -> PathBuf {
    write_obs_month_on(dir, name, month, raw, [-1000.0, 0.0, 1000.0])
}

fn write_obs_month_on(dir: &Path, name: &str, month: YearMonth, raw: f64, xgrid: [f64; 3]) -> PathBuf {
    let path = dir.join(name);
    let mut file = netcdf::create(&path).expect("create obs file");
    file.add_dimension("tdim", 1).unwrap();
    file.add_dimension("y", 2).unwrap();
    file.add_dimension("x", 3).unwrap();
    {
        let mut v = file.add_variable::<f64>("time", &["tdim"]).unwrap();
        v.put_attribute("units", "months since 1978-12-01").unwrap();
        v.put_values(&[ym(1978, 12).months_until(month) as f64], ..)
            .unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("xgrid", &["x"]).unwrap();
        v.put_values(&xgrid, ..).unwrap();
    }
    {
        let mut v = file.add_variable::<f64>("ygrid", &["y"]).unwrap();
        v.put_values(&[500.0, -500.0], ..).unwrap();
    }
    {
        let mut v = file
            .add_variable::<f64>("cdr_seaice_conc_monthly", &["tdim", "y", "x"])
            .unwrap();
        v.put_values(&[raw; 6], ..).unwrap();
    }
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn read_grid_builds_mask_from_landmask() {
    let dir = tempdir().unwrap();
    let path = write_grid(dir.path());
    let grid = read_grid(&path, "landmask", &ReaderConfig::default()).unwrap();
    assert_eq!(grid.shape(), (2, 3));
    assert_eq!(grid.x(), &[-1000.0, 0.0, 1000.0]);
    assert_eq!(grid.lat()[[1, 2]], -70.0);
    assert!(grid.mask()[[0, 1]].is_nan());
    assert_eq!(grid.n_ocean_cells(), 5);
}

#[test]
fn read_grid_missing_landmask_variable() {
    let dir = tempdir().unwrap();
    let path = write_grid(dir.path());
    let err = read_grid(&path, "sftlf", &ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::MissingVariable { ref name, .. } if name == "sftlf"));
}

#[test]
fn read_gridded_squeezes_level_and_masks_fill() {
    let dir = tempdir().unwrap();
    let path = write_model(dir.path(), "m.nc", ym(1978, 12), 3, |t| {
        if t == 1 { 1e20 } else { 10.0 * t as f64 }
    });
    let series = read_gridded(&path, "siconc", &ReaderConfig::default()).unwrap();
    assert_eq!(series.values().dim(), (3, 2, 4));
    assert_eq!(series.times(), &[ym(1978, 12), ym(1979, 1), ym(1979, 2)]);
    assert!(series.values()[[1, 0, 0]].is_nan());
    assert_relative_eq!(series.values()[[2, 1, 3]], 20.0);
}

#[test]
fn read_model_concatenates_files_in_time_order() {
    let dir = tempdir().unwrap();
    let late = write_model(dir.path(), "b.nc", ym(1979, 3), 2, |_| 2.0);
    let early = write_model(dir.path(), "a.nc", ym(1978, 12), 3, |_| 1.0);
    let model = read_model("TEST", &[late, early], "siconc", &ReaderConfig::default()).unwrap();
    assert_eq!(model.id(), "TEST");
    assert_eq!(model.series().len(), 5);
    assert_eq!(model.series().times()[0], ym(1978, 12));
    assert_eq!(model.series().times()[4], ym(1979, 4));
    assert_eq!(model.series().values()[[0, 0, 0]], 1.0);
    assert_eq!(model.series().values()[[4, 0, 0]], 2.0);
    assert_eq!(model.source().shape(), (2, 4));
}

#[test]
fn read_model_accepts_curvilinear_coordinates() {
    let dir = tempdir().unwrap();
    let path = write_curvilinear_model(dir.path(), "tripolar.nc", 2);
    let model = read_model("ACCESS-CM2", &[path], "siconc", &ReaderConfig::default()).unwrap();
    assert!(model.source().is_curvilinear());
    assert_eq!(model.source().shape(), (3, 4));
    assert_eq!(model.series().values().dim(), (2, 3, 4));
    assert_eq!(model.series().values()[[1, 2, 3]], 11.0);
}

#[test]
fn local_catalog_fetches_matching_files() {
    let dir = tempdir().unwrap();
    let query = CatalogQuery::default();
    let stem = query.file_stem("FAKE-ESM");
    write_model(dir.path(), &format!("{stem}_197812-197902.nc"), ym(1978, 12), 3, |_| 50.0);
    let model = LocalCatalog::new(dir.path())
        .fetch("FAKE-ESM", &query)
        .unwrap();
    assert_eq!(model.series().len(), 3);

    let err = LocalCatalog::new(dir.path())
        .fetch("OTHER-ESM", &query)
        .unwrap_err();
    assert!(matches!(err, IoError::SourceUnavailable { ref model, .. } if model == "OTHER-ESM"));
}

#[test]
fn combine_sorts_months_and_derives_percent() {
    let dir = tempdir().unwrap();
    let feb = write_obs_month(dir.path(), "feb.nc", ym(1979, 2), 0.51);
    let dec = write_obs_month(dir.path(), "dec.nc", ym(1978, 12), 2.55);
    let jan = write_obs_month(dir.path(), "jan.nc", ym(1979, 1), 0.0);

    let config = CombineConfig::default();
    let combined = combine_monthly(&[feb, dec, jan], &config).unwrap();
    assert_eq!(
        combined.raw().times(),
        &[ym(1978, 12), ym(1979, 1), ym(1979, 2)]
    );
    assert_eq!(combined.x(), &[-1000.0, 0.0, 1000.0]);
    assert_relative_eq!(combined.percent().values()[[0, 0, 0]], 100.0, epsilon = 1e-9);
    assert_relative_eq!(combined.percent().values()[[1, 1, 2]], 0.0);
    assert_relative_eq!(combined.percent().values()[[2, 0, 1]], 20.0, epsilon = 1e-9);

    let out = dir.path().join("combined.nc");
    combined.write(&out, &config).unwrap();
    let back = read_gridded(&out, "siconc", &ReaderConfig::default()).unwrap();
    assert_eq!(back.times(), combined.percent().times());
    assert_relative_eq!(back.values()[[2, 0, 1]], 20.0, epsilon = 1e-9);
    let raw = read_gridded(&out, "cdr_seaice_conc_monthly", &ReaderConfig::default()).unwrap();
    assert_relative_eq!(raw.values()[[0, 1, 1]], 2.55);
}

#[test]
fn combine_rejects_duplicate_months() {
    let dir = tempdir().unwrap();
    let a = write_obs_month(dir.path(), "a.nc", ym(1979, 1), 0.1);
    let b = write_obs_month(dir.path(), "b.nc", ym(1979, 1), 0.2);
    let err = combine_monthly(&[a, b], &CombineConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::Validation { ref details, .. } if details.contains("1979-01")));
}

#[test]
fn combine_rejects_files_on_another_grid() {
    let dir = tempdir().unwrap();
    let a = write_obs_month(dir.path(), "a.nc", ym(1979, 1), 0.1);
    let b = write_obs_month_on(dir.path(), "b.nc", ym(1979, 2), 0.2, [-1500.0, 0.0, 1500.0]);
    let err = combine_monthly(&[a, b], &CombineConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::Validation { ref details, .. } if details.contains("x[0]")));
}

#[test]
fn missing_file_is_reported() {
    let err = read_gridded(
        Path::new("/tmp/mef_test_nonexistent_file.nc"),
        "siconc",
        &ReaderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
}
