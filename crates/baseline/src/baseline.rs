//! Observation baseline preparation.

use mef_io::GriddedSeries;
use ndarray::{Array2, Axis, s};
use tracing::{debug, info};

use crate::config::BaselineConfig;
use crate::error::BaselineError;
use crate::result::{BaselineSummary, ObservationBaseline};

/// Prepare the observation baseline from raw observations on the reference
/// grid.
///
/// Steps, in order:
/// 1. keep the months of the configured window; every window month must be
///    present, in order;
/// 2. values above the validity threshold become NaN;
/// 3. count months with a value `> 0` per cell;
/// 4. cells whose count is `<= min_valid_count` become NaN at every step;
/// 5. apply the range filter;
/// 6. climatology = NaN-skipping mean over time.
///
/// # Errors
///
/// Returns [`BaselineError::InvalidConfig`] for an invalid configuration and
/// [`BaselineError::WindowCoverage`] when the window is not fully covered.
pub fn prepare_baseline(
    raw: &GriddedSeries,
    config: &BaselineConfig,
) -> Result<ObservationBaseline, BaselineError> {
    config.validate()?;
    let window = config.window();

    let windowed = raw.select_window(window);
    check_coverage(&windowed, config)?;
    let (mut values, times) = windowed.into_parts();

    let threshold = config.validity_threshold();
    let mut n_flagged = 0usize;
    values.mapv_inplace(|v| {
        if v > threshold {
            n_flagged += 1;
            f64::NAN
        } else {
            v
        }
    });
    debug!(n_flagged, threshold, "flagged observations above validity threshold");

    let valid_counts: Array2<usize> = values
        .map_axis(Axis(0), |lane| mef_stats::count_above(lane.iter().copied(), 0.0));

    let min_count = config.min_valid_count();
    let mut n_masked_cells = 0usize;
    for ((j, i), &count) in valid_counts.indexed_iter() {
        if count <= min_count {
            values.slice_mut(s![.., j, i]).fill(f64::NAN);
            n_masked_cells += 1;
        }
    }

    config.range_filter().apply(&mut values);

    let climatology =
        values.map_axis(Axis(0), |lane| mef_stats::nanmean_iter(lane.iter().copied()));

    let n_cells = valid_counts.len();
    let summary = BaselineSummary {
        window: *window,
        n_cells,
        n_valid_cells: n_cells - n_masked_cells,
        n_masked_cells,
        n_finite_climatology: climatology.iter().filter(|v| v.is_finite()).count(),
        range_filter: config.range_filter(),
    };
    info!(%summary, "prepared observation baseline");

    let series = GriddedSeries::new(values, times)?;
    Ok(ObservationBaseline::new(series, climatology, valid_counts, summary))
}

fn check_coverage(windowed: &GriddedSeries, config: &BaselineConfig) -> Result<(), BaselineError> {
    let expected = config.window().months();
    let got = windowed.times();
    if got == expected.as_slice() {
        return Ok(());
    }
    let detail = match expected.iter().find(|m| !got.contains(m)) {
        Some(missing) => format!("missing {missing}"),
        None => match expected.iter().zip(got).find(|(e, g)| e != g) {
            Some((e, g)) => format!("expected {e} but found {g}"),
            None => format!("{} extra month(s)", got.len().saturating_sub(expected.len())),
        },
    };
    Err(BaselineError::WindowCoverage {
        expected: expected.len(),
        got: got.len(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mef_calendar::{TimeWindow, YearMonth, month_sequence};
    use ndarray::Array3;

    use crate::filter::RangeFilter;

    fn window(n: usize) -> TimeWindow {
        let start = YearMonth::new(1978, 12).unwrap();
        let end = *month_sequence(start, n).last().unwrap();
        TimeWindow::new(start, end).unwrap()
    }

    fn series(values: Array3<f64>, start: (i32, u8)) -> GriddedSeries {
        let n = values.len_of(Axis(0));
        let times = month_sequence(YearMonth::new(start.0, start.1).unwrap(), n);
        GriddedSeries::new(values, times).unwrap()
    }

    #[test]
    fn window_slice_drops_months_outside() {
        // two months before the window, four inside
        let values = Array3::from_shape_fn((6, 1, 1), |(t, _, _)| 0.1 * t as f64 + 0.1);
        let raw = series(values, (1978, 10));
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(0);
        let b = prepare_baseline(&raw, &cfg).unwrap();
        assert_eq!(b.series().len(), 4);
        assert_eq!(b.series().times()[0], YearMonth::new(1978, 12).unwrap());
        assert_relative_eq!(b.series().values()[[0, 0, 0]], 0.3);
    }

    #[test]
    fn incomplete_window_is_rejected() {
        let raw = series(Array3::zeros((3, 1, 1)), (1978, 12));
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(0);
        let err = prepare_baseline(&raw, &cfg).unwrap_err();
        assert_eq!(
            err,
            BaselineError::WindowCoverage {
                expected: 4,
                got: 3,
                detail: "missing 1979-03".to_string()
            }
        );
    }

    #[test]
    fn flags_values_above_threshold() {
        let mut values = Array3::from_elem((4, 1, 2), 0.5);
        values[[1, 0, 0]] = 2.52;
        values[[2, 0, 0]] = 2.51;
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(0);
        let b = prepare_baseline(&series(values, (1978, 12)), &cfg).unwrap();
        assert!(b.series().values()[[1, 0, 0]].is_nan());
        assert_eq!(b.series().values()[[2, 0, 0]], 2.51);
        // flagged value does not count as valid
        assert_eq!(b.valid_counts()[[0, 0]], 3);
        assert_eq!(b.valid_counts()[[0, 1]], 4);
    }

    #[test]
    fn cells_at_or_below_min_count_are_masked() {
        // cell 0: 3 non-zero months, cell 1: 2 non-zero months
        let mut values = Array3::zeros((4, 1, 2));
        for t in 0..3 {
            values[[t, 0, 0]] = 0.4;
        }
        for t in 0..2 {
            values[[t, 0, 1]] = 0.4;
        }
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(2);
        let b = prepare_baseline(&series(values, (1978, 12)), &cfg).unwrap();
        assert_relative_eq!(b.climatology()[[0, 0]], 0.3);
        assert!(b.climatology()[[0, 1]].is_nan());
        assert!(b.series().values().slice(s![.., 0, 1]).iter().all(|v| v.is_nan()));
        assert_eq!(b.summary().n_masked_cells, 1);
        assert_eq!(b.summary().n_valid_cells, 1);
    }

    #[test]
    fn range_filter_applies_before_climatology() {
        let values = Array3::from_shape_vec((4, 1, 1), vec![0.1, 0.5, 0.9, 0.7]).unwrap();
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(0)
            .with_range_filter(RangeFilter::Isolate15To80);
        let b = prepare_baseline(&series(values, (1978, 12)), &cfg).unwrap();
        assert_relative_eq!(b.climatology()[[0, 0]], 0.6);
        assert!(b.series().values()[[0, 0, 0]].is_nan());
        assert!(b.series().values()[[2, 0, 0]].is_nan());
    }

    #[test]
    fn climatology_skips_nan() {
        let values =
            Array3::from_shape_vec((4, 1, 1), vec![0.2, f64::NAN, 0.4, 0.6]).unwrap();
        let cfg = BaselineConfig::default()
            .with_window(window(4))
            .with_min_valid_count(0);
        let b = prepare_baseline(&series(values, (1978, 12)), &cfg).unwrap();
        assert_relative_eq!(b.climatology()[[0, 0]], 0.4);
        assert_eq!(b.summary().n_finite_climatology, 1);
    }
}
