//! In-memory monthly gridded series.

use mef_calendar::{TimeWindow, YearMonth};
use mef_grid::SourceGrid;
use ndarray::{Array3, Axis};

use crate::error::IoError;

// ---------------------------------------------------------------------------
// GriddedSeries
// ---------------------------------------------------------------------------

/// Monthly `[time, y, x]` field with one month label per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    values: Array3<f64>,
    times: Vec<YearMonth>,
}

impl GriddedSeries {
    /// Pair a field with its time labels.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if the number of labels differs
    /// from the length of the time axis.
    pub fn new(values: Array3<f64>, times: Vec<YearMonth>) -> Result<Self, IoError> {
        let nt = values.len_of(Axis(0));
        if times.len() != nt {
            return Err(IoError::DimensionMismatch {
                name: "time".into(),
                expected: nt,
                got: times.len(),
            });
        }
        Ok(Self { values, times })
    }

    /// Field values, `[time, y, x]`.
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Month label of each time step.
    pub fn times(&self) -> &[YearMonth] {
        &self.times
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series holds no time step.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `(ny, nx)` of each time slice.
    pub fn spatial_shape(&self) -> (usize, usize) {
        let (_, ny, nx) = self.values.dim();
        (ny, nx)
    }

    /// Time steps whose label falls inside `window`, in stored order.
    ///
    /// The result may be shorter than the window; callers that need full
    /// coverage compare its length against [`TimeWindow::len`].
    pub fn select_window(&self, window: &TimeWindow) -> Self {
        let idx = window.select(&self.times);
        Self {
            values: self.values.select(Axis(0), &idx),
            times: idx.iter().map(|&i| self.times[i]).collect(),
        }
    }

    /// Split into field and labels.
    pub fn into_parts(self) -> (Array3<f64>, Vec<YearMonth>) {
        (self.values, self.times)
    }
}

// ---------------------------------------------------------------------------
// ModelSeries
// ---------------------------------------------------------------------------

/// Raw model output on its native grid, values in percent.
///
/// The field is `[time, row, column]` and matches `source` in shape.
#[derive(Debug, Clone)]
pub struct ModelSeries {
    id: String,
    series: GriddedSeries,
    source: SourceGrid,
}

impl ModelSeries {
    /// Bundle a model's field with its identifier and source grid.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if the field's spatial shape
    /// differs from the source grid.
    pub fn new(
        id: impl Into<String>,
        series: GriddedSeries,
        source: SourceGrid,
    ) -> Result<Self, IoError> {
        let (ny, nx) = series.spatial_shape();
        let (n_lat, n_lon) = source.shape();
        if ny != n_lat {
            return Err(IoError::DimensionMismatch {
                name: "lat".into(),
                expected: n_lat,
                got: ny,
            });
        }
        if nx != n_lon {
            return Err(IoError::DimensionMismatch {
                name: "lon".into(),
                expected: n_lon,
                got: nx,
            });
        }
        Ok(Self {
            id: id.into(),
            series,
            source,
        })
    }

    /// Model identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field and time labels.
    pub fn series(&self) -> &GriddedSeries {
        &self.series
    }

    /// Native grid.
    pub fn source(&self) -> &SourceGrid {
        &self.source
    }

    /// Split into identifier, series and grid.
    pub fn into_parts(self) -> (String, GriddedSeries, SourceGrid) {
        (self.id, self.series, self.source)
    }
}
