//! Bilinear interpolation from a model source grid onto a [`Grid`].
//!
//! Weights are computed once per (source, target) pair and reused for every
//! time slice of a series.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use tracing::debug;

use crate::curvilinear::CellIndex;
use crate::error::GridError;
use crate::grid::Grid;

// ---------------------------------------------------------------------------
// SourceGrid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Coordinates {
    Rectilinear { lon: Vec<f64>, lat: Vec<f64> },
    Curvilinear { lon: Array2<f64>, lat: Array2<f64> },
}

/// Native model grid: 1-D longitude/latitude axes, or 2-D fields for
/// curvilinear (e.g. tripolar ocean) grids.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGrid {
    coords: Coordinates,
}

impl SourceGrid {
    /// Rectilinear grid from 1-D axes.
    ///
    /// Longitudes must be strictly increasing (any origin, e.g. `0..360` or
    /// `-180..180`). Latitudes must be strictly monotonic in either direction.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCoordinates`] if an axis is empty, holds
    /// non-finite values, or is not strictly monotonic as described above.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>) -> Result<Self, GridError> {
        if lon.is_empty() || lat.is_empty() {
            return Err(GridError::InvalidCoordinates {
                reason: "source axes must not be empty".to_string(),
            });
        }
        if lon.iter().chain(lat.iter()).any(|v| !v.is_finite()) {
            return Err(GridError::InvalidCoordinates {
                reason: "source axes must be finite".to_string(),
            });
        }
        if !lon.windows(2).all(|w| w[1] > w[0]) {
            return Err(GridError::InvalidCoordinates {
                reason: "source longitude must be strictly increasing".to_string(),
            });
        }
        if lon[lon.len() - 1] - lon[0] >= 360.0 {
            return Err(GridError::InvalidCoordinates {
                reason: "source longitude spans 360 degrees or more".to_string(),
            });
        }
        let increasing = lat.windows(2).all(|w| w[1] > w[0]);
        let decreasing = lat.windows(2).all(|w| w[1] < w[0]);
        if !(increasing || decreasing) {
            return Err(GridError::InvalidCoordinates {
                reason: "source latitude must be strictly monotonic".to_string(),
            });
        }
        Ok(Self {
            coords: Coordinates::Rectilinear { lon, lat },
        })
    }

    /// Curvilinear grid from per-cell `[row, column]` longitude and latitude.
    ///
    /// Cells with a missing (NaN) coordinate never receive a target point.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the two fields differ in
    /// shape, and [`GridError::InvalidCoordinates`] if they are smaller than
    /// 2 x 2, hold no finite point, or a latitude lies outside `[-90, 90]`.
    pub fn curvilinear(lon: Array2<f64>, lat: Array2<f64>) -> Result<Self, GridError> {
        let (ny, nx) = lon.dim();
        if lat.nrows() != ny {
            return Err(GridError::DimensionMismatch {
                name: "source lat rows".into(),
                expected: ny,
                got: lat.nrows(),
            });
        }
        if lat.ncols() != nx {
            return Err(GridError::DimensionMismatch {
                name: "source lat columns".into(),
                expected: nx,
                got: lat.ncols(),
            });
        }
        if ny < 2 || nx < 2 {
            return Err(GridError::InvalidCoordinates {
                reason: format!("curvilinear source must be at least 2 x 2, got {ny} x {nx}"),
            });
        }
        if !lon
            .iter()
            .zip(lat.iter())
            .any(|(x, y)| x.is_finite() && y.is_finite())
        {
            return Err(GridError::InvalidCoordinates {
                reason: "curvilinear source has no finite coordinate".to_string(),
            });
        }
        if lat.iter().any(|v| v.abs() > 90.0) {
            return Err(GridError::InvalidCoordinates {
                reason: "source latitude outside [-90, 90]".to_string(),
            });
        }
        Ok(Self {
            coords: Coordinates::Curvilinear { lon, lat },
        })
    }

    /// Whether coordinates are stored per cell.
    pub fn is_curvilinear(&self) -> bool {
        matches!(self.coords, Coordinates::Curvilinear { .. })
    }

    /// `(rows, columns)`, the spatial shape of fields on this grid.
    pub fn shape(&self) -> (usize, usize) {
        match &self.coords {
            Coordinates::Rectilinear { lon, lat } => (lat.len(), lon.len()),
            Coordinates::Curvilinear { lon, .. } => lon.dim(),
        }
    }
}

// ---------------------------------------------------------------------------
// RegridWeights
// ---------------------------------------------------------------------------

/// One contributing source cell: `(lat index, lon index, weight)`.
type Corner = (usize, usize, f64);

/// Precomputed interpolation stencil for every target cell.
#[derive(Debug, Clone)]
pub struct RegridWeights {
    source_shape: (usize, usize),
    target_shape: (usize, usize),
    /// Row-major over the target grid; `None` where the target point lies
    /// outside the source coverage.
    stencils: Vec<Option<Vec<Corner>>>,
}

impl RegridWeights {
    /// Shape of fields the weights accept, `(n_lat, n_lon)`.
    pub fn source_shape(&self) -> (usize, usize) {
        self.source_shape
    }

    /// Shape of the interpolated output, `(ny, nx)`.
    pub fn target_shape(&self) -> (usize, usize) {
        self.target_shape
    }

    /// Number of target cells without source coverage.
    pub fn n_unmapped(&self) -> usize {
        self.stencils.iter().filter(|s| s.is_none()).count()
    }

    /// Interpolate one `[lat, lon]` slice.
    ///
    /// Any NaN among the contributing corners makes the target value NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the slice shape differs
    /// from [`RegridWeights::source_shape`].
    pub fn apply_slice(&self, field: ArrayView2<'_, f64>) -> Result<Array2<f64>, GridError> {
        self.check_source(field.dim())?;
        let values: Vec<f64> = self
            .stencils
            .iter()
            .map(|stencil| match stencil {
                Some(corners) => corners.iter().map(|&(j, i, w)| w * field[[j, i]]).sum(),
                None => f64::NAN,
            })
            .collect();
        Array2::from_shape_vec(self.target_shape, values).map_err(|e| {
            GridError::InvalidCoordinates {
                reason: e.to_string(),
            }
        })
    }

    /// Interpolate every slice of a `[time, lat, lon]` field.
    ///
    /// # Errors
    ///
    /// Same as [`RegridWeights::apply_slice`].
    pub fn apply(&self, field: ArrayView3<'_, f64>) -> Result<Array3<f64>, GridError> {
        let (nt, n_lat, n_lon) = field.dim();
        self.check_source((n_lat, n_lon))?;
        let (ny, nx) = self.target_shape;
        let mut out = Array3::from_elem((nt, ny, nx), f64::NAN);
        for (src, mut dst) in field.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            dst.assign(&self.apply_slice(src)?);
        }
        Ok(out)
    }

    fn check_source(&self, got: (usize, usize)) -> Result<(), GridError> {
        if got.0 != self.source_shape.0 {
            return Err(GridError::DimensionMismatch {
                name: "source lat".into(),
                expected: self.source_shape.0,
                got: got.0,
            });
        }
        if got.1 != self.source_shape.1 {
            return Err(GridError::DimensionMismatch {
                name: "source lon".into(),
                expected: self.source_shape.1,
                got: got.1,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Regridder
// ---------------------------------------------------------------------------

/// Interpolation method from a model source grid onto a reference [`Grid`].
pub trait Regridder {
    /// Build interpolation weights for a (source, target) pair.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the pair cannot be interpolated.
    fn weights(&self, source: &SourceGrid, target: &Grid) -> Result<RegridWeights, GridError>;

    /// Interpolate a `[time, lat, lon]` field onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] on weight construction or shape failures.
    fn regrid(
        &self,
        field: ArrayView3<'_, f64>,
        source: &SourceGrid,
        target: &Grid,
    ) -> Result<Array3<f64>, GridError> {
        self.weights(source, target)?.apply(field)
    }
}

/// Bilinear interpolation, optionally periodic in longitude.
///
/// With `periodic` set, the gap between the last and first source longitude
/// is bridged across the dateline so every target longitude is covered.
/// Target points outside the source latitude range are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BilinearRegridder {
    periodic: bool,
}

impl Default for BilinearRegridder {
    fn default() -> Self {
        Self { periodic: true }
    }
}

impl BilinearRegridder {
    /// Enable or disable periodic longitude wrapping.
    pub fn with_periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    /// Whether longitude wraps periodically.
    pub fn periodic(&self) -> bool {
        self.periodic
    }
}

impl Regridder for BilinearRegridder {
    fn weights(&self, source: &SourceGrid, target: &Grid) -> Result<RegridWeights, GridError> {
        let points = target.lon().iter().zip(target.lat().iter());
        let stencils: Vec<Option<Vec<Corner>>> = match &source.coords {
            Coordinates::Rectilinear { lon, lat } => points
                .map(|(&t_lon, &t_lat)| {
                    let (i0, i1, fx) = if self.periodic {
                        periodic_bracket(lon, t_lon)?
                    } else {
                        bracket(lon, t_lon)?
                    };
                    let (j0, j1, fy) = bracket(lat, t_lat)?;
                    Some(stencil(j0, j1, i0, i1, fx, fy))
                })
                .collect(),
            Coordinates::Curvilinear { lon, lat } => {
                let index = CellIndex::build(lon.view(), lat.view(), self.periodic);
                debug!(n_quads = index.n_quads(), "indexed curvilinear source");
                points
                    .map(|(&t_lon, &t_lat)| {
                        let at = index.locate(t_lon, t_lat)?;
                        Some(stencil(at.j0, at.j1, at.i0, at.i1, at.fx, at.fy))
                    })
                    .collect()
            }
        };

        let weights = RegridWeights {
            source_shape: source.shape(),
            target_shape: target.shape(),
            stencils,
        };
        debug!(
            periodic = self.periodic,
            curvilinear = source.is_curvilinear(),
            n_unmapped = weights.n_unmapped(),
            "built bilinear weights"
        );
        Ok(weights)
    }
}

/// Bilinear corners of one target point with zero-weight corners dropped, so
/// a masked neighbour exactly on an edge does not blank the value.
fn stencil(j0: usize, j1: usize, i0: usize, i1: usize, fx: f64, fy: f64) -> Vec<Corner> {
    [
        (j0, i0, (1.0 - fx) * (1.0 - fy)),
        (j0, i1, fx * (1.0 - fy)),
        (j1, i0, (1.0 - fx) * fy),
        (j1, i1, fx * fy),
    ]
    .into_iter()
    .filter(|&(_, _, w)| w > 0.0)
    .collect()
}

/// Locate `v` on a monotonic axis.
///
/// Returns `(i0, i1, f)` such that `v = axis[i0] + f * (axis[i1] - axis[i0])`
/// with `f` in `[0, 1]`, or `None` if `v` lies outside the axis.
fn bracket(axis: &[f64], v: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if v.is_nan() || n == 0 {
        return None;
    }
    if n == 1 {
        return (v == axis[0]).then_some((0, 0, 0.0));
    }
    let ascending = axis[n - 1] > axis[0];
    let (lo, hi) = if ascending {
        (axis[0], axis[n - 1])
    } else {
        (axis[n - 1], axis[0])
    };
    if v < lo || v > hi {
        return None;
    }
    let k = if ascending {
        axis.partition_point(|&a| a <= v)
    } else {
        axis.partition_point(|&a| a >= v)
    };
    let i1 = k.clamp(1, n - 1);
    let i0 = i1 - 1;
    let f = (v - axis[i0]) / (axis[i1] - axis[i0]);
    Some((i0, i1, f))
}

/// Locate a longitude on a strictly increasing axis, wrapping through 360°.
fn periodic_bracket(lon: &[f64], v: f64) -> Option<(usize, usize, f64)> {
    if v.is_nan() {
        return None;
    }
    let n = lon.len();
    let first = lon[0];
    let last = lon[n - 1];
    let t = first + (v - first).rem_euclid(360.0);
    if t <= last {
        return bracket(lon, t);
    }
    // between the last longitude and the first one shifted by a full turn
    let span = first + 360.0 - last;
    Some((n - 1, 0, (t - last) / span))
}
