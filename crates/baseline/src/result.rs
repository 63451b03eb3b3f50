//! Result types for observation baseline preparation.

use std::fmt;

use mef_calendar::TimeWindow;
use mef_io::GriddedSeries;
use ndarray::Array2;

use crate::filter::RangeFilter;

/// Quality-controlled observations and their per-cell climatology.
///
/// Built once per run and borrowed by every model evaluation.
#[derive(Debug, Clone)]
pub struct ObservationBaseline {
    /// Windowed, flagged, count-masked and range-filtered series.
    series: GriddedSeries,
    /// NaN-skipping temporal mean of `series`, `[y, x]`.
    climatology: Array2<f64>,
    /// Non-zero months per cell after flagging, `[y, x]`.
    valid_counts: Array2<usize>,
    summary: BaselineSummary,
}

impl ObservationBaseline {
    pub(crate) fn new(
        series: GriddedSeries,
        climatology: Array2<f64>,
        valid_counts: Array2<usize>,
        summary: BaselineSummary,
    ) -> Self {
        Self {
            series,
            climatology,
            valid_counts,
            summary,
        }
    }

    /// Observation series on the reference grid.
    pub fn series(&self) -> &GriddedSeries {
        &self.series
    }

    /// Per-cell climatology mean.
    pub fn climatology(&self) -> &Array2<f64> {
        &self.climatology
    }

    /// Per-cell count of non-zero months.
    pub fn valid_counts(&self) -> &Array2<usize> {
        &self.valid_counts
    }

    /// Cell counts and settings for reporting.
    pub fn summary(&self) -> &BaselineSummary {
        &self.summary
    }
}

/// Headline numbers of a prepared baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSummary {
    /// Analysis window.
    pub window: TimeWindow,
    /// Cells of the grid.
    pub n_cells: usize,
    /// Cells that passed the valid-count test.
    pub n_valid_cells: usize,
    /// Cells masked for too few non-zero months.
    pub n_masked_cells: usize,
    /// Cells whose climatology is finite after range filtering.
    pub n_finite_climatology: usize,
    /// Range filter applied.
    pub range_filter: RangeFilter,
}

impl fmt::Display for BaselineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "window {}..{} ({} months), {} cells: {} valid, {} masked, {} with climatology, filter {}",
            self.window.start(),
            self.window.end(),
            self.window.len(),
            self.n_cells,
            self.n_valid_cells,
            self.n_masked_cells,
            self.n_finite_climatology,
            self.range_filter
        )
    }
}
