//! End-to-end baseline preparation on a small synthetic record.

use approx::assert_relative_eq;
use mef_baseline::{BaselineConfig, BaselineError, RangeFilter, prepare_baseline};
use mef_calendar::{TimeWindow, YearMonth, month_sequence};
use mef_io::GriddedSeries;
use ndarray::Array3;

fn ym(y: i32, m: u8) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

/// Two years of observations on a 2 x 2 grid, Dec 1978 onwards.
///
/// * `[0, 0]` open water all year (always 0)
/// * `[0, 1]` seasonal ice, 0.9 in JJA and 0.1 otherwise
/// * `[1, 0]` land flag 2.54 every month
/// * `[1, 1]` ice in only three months
fn record() -> GriddedSeries {
    let times = month_sequence(ym(1978, 12), 24);
    let values = Array3::from_shape_fn((24, 2, 2), |(t, j, i)| {
        let month = times[t].month();
        match (j, i) {
            (0, 0) => 0.0,
            (0, 1) if (6..=8).contains(&month) => 0.9,
            (0, 1) => 0.1,
            (1, 0) => 2.54,
            _ if t < 3 => 0.5,
            _ => 0.0,
        }
    });
    GriddedSeries::new(values, times).unwrap()
}

fn config() -> BaselineConfig {
    BaselineConfig::default()
        .with_window(TimeWindow::new(ym(1978, 12), ym(1980, 11)).unwrap())
        .with_min_valid_count(3)
}

#[test]
fn masks_open_water_land_and_sparse_cells() {
    let b = prepare_baseline(&record(), &config()).unwrap();

    assert_eq!(b.valid_counts()[[0, 0]], 0);
    assert_eq!(b.valid_counts()[[0, 1]], 24);
    assert_eq!(b.valid_counts()[[1, 0]], 0);
    assert_eq!(b.valid_counts()[[1, 1]], 3);

    assert!(b.climatology()[[0, 0]].is_nan());
    assert!(b.climatology()[[1, 0]].is_nan());
    assert!(b.climatology()[[1, 1]].is_nan());
    assert_relative_eq!(b.climatology()[[0, 1]], 0.3, epsilon = 1e-12);

    let s = b.summary();
    assert_eq!(s.n_cells, 4);
    assert_eq!(s.n_masked_cells, 3);
    assert_eq!(s.n_valid_cells, 1);
    assert_eq!(s.range_filter, RangeFilter::None);
}

#[test]
fn band_filter_changes_climatology_not_counts() {
    let cfg = config().with_range_filter(RangeFilter::Isolate80To100);
    let b = prepare_baseline(&record(), &cfg).unwrap();
    assert_eq!(b.valid_counts()[[0, 1]], 24);
    assert_relative_eq!(b.climatology()[[0, 1]], 0.9, epsilon = 1e-12);
    let kept = b
        .series()
        .values()
        .iter()
        .filter(|v| v.is_finite())
        .count();
    assert_eq!(kept, 6);
}

#[test]
fn summary_display_names_filter_and_window() {
    let b = prepare_baseline(&record(), &config()).unwrap();
    let text = b.summary().to_string();
    assert!(text.starts_with("window 1978-12..1980-11 (24 months)"));
    assert!(text.ends_with("filter none"));
}

#[test]
fn window_beyond_record_is_rejected() {
    let cfg = config().with_window(TimeWindow::new(ym(1978, 12), ym(1981, 2)).unwrap());
    let err = prepare_baseline(&record(), &cfg).unwrap_err();
    match err {
        BaselineError::WindowCoverage { expected, got, detail } => {
            assert_eq!(expected, 27);
            assert_eq!(got, 24);
            assert_eq!(detail, "missing 1980-12");
        }
        other => panic!("expected WindowCoverage, got {other:?}"),
    }
}
