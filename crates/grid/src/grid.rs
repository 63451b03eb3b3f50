//! Reference grid with its multiplicative land mask.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, s};
use tracing::debug;

use crate::bbox::BoundingBox;
use crate::error::GridError;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Target grid every model is interpolated onto.
///
/// All 2-D fields are indexed `[y, x]`. The mask is multiplicative: `1.0` over
/// ocean and `NaN` over land or outside a bounding-box restriction, so that
/// `field * mask` removes excluded cells while keeping ocean values intact.
///
/// A `Grid` is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    x: Vec<f64>,
    y: Vec<f64>,
    lon: Array2<f64>,
    lat: Array2<f64>,
    mask: Array2<f64>,
    /// `(ny, nx)` of the grid this one was restricted from.
    parent_shape: (usize, usize),
    /// `(row, column)` of this grid's first cell within the parent.
    offset: (usize, usize),
}

impl Grid {
    /// Build a grid from a land-mask field.
    ///
    /// A cell is land (mask `NaN`) when its land-mask value is `> 0`; every
    /// other cell, including a missing land-mask value, is ocean (mask `1`).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `lon`, `lat` and `landmask`
    /// differ in shape, or if `x`/`y` lengths disagree with that shape.
    pub fn from_landmask(
        x: Vec<f64>,
        y: Vec<f64>,
        lon: Array2<f64>,
        lat: Array2<f64>,
        landmask: ArrayView2<'_, f64>,
    ) -> Result<Self, GridError> {
        let mask = landmask.mapv(|v| if v > 0.0 { f64::NAN } else { 1.0 });
        Self::with_mask(x, y, lon, lat, mask)
    }

    /// Build a grid from an already multiplicative mask (`1` / `NaN`).
    ///
    /// # Errors
    ///
    /// Same shape checks as [`Grid::from_landmask`].
    pub fn with_mask(
        x: Vec<f64>,
        y: Vec<f64>,
        lon: Array2<f64>,
        lat: Array2<f64>,
        mask: Array2<f64>,
    ) -> Result<Self, GridError> {
        let (ny, nx) = mask.dim();
        check_shape("lon", lon.dim(), (ny, nx))?;
        check_shape("lat", lat.dim(), (ny, nx))?;
        if x.len() != nx {
            return Err(GridError::DimensionMismatch {
                name: "x".into(),
                expected: nx,
                got: x.len(),
            });
        }
        if y.len() != ny {
            return Err(GridError::DimensionMismatch {
                name: "y".into(),
                expected: ny,
                got: y.len(),
            });
        }
        Ok(Self {
            x,
            y,
            lon,
            lat,
            mask,
            parent_shape: (ny, nx),
            offset: (0, 0),
        })
    }

    /// Restrict the grid to a bounding box.
    ///
    /// The result is the smallest `[y, x]` rectangle containing every cell
    /// whose coordinates fall inside `bbox`. Cells of that rectangle lying
    /// outside the box are masked to `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySelection`] if no cell lies inside the box.
    pub fn restrict(&self, bbox: &BoundingBox) -> Result<Self, GridError> {
        let inside = ndarray::Zip::from(&self.lon)
            .and(&self.lat)
            .map_collect(|&lon, &lat| bbox.contains(lon, lat));

        let rows: Vec<usize> = inside
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&b| b))
            .map(|(j, _)| j)
            .collect();
        let cols: Vec<usize> = inside
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, col)| col.iter().any(|&b| b))
            .map(|(i, _)| i)
            .collect();

        let (Some(&j0), Some(&j1), Some(&i0), Some(&i1)) =
            (rows.first(), rows.last(), cols.first(), cols.last())
        else {
            return Err(GridError::EmptySelection {
                bbox: bbox.to_string(),
            });
        };

        let mut mask = self.mask.slice(s![j0..=j1, i0..=i1]).to_owned();
        ndarray::Zip::from(&mut mask)
            .and(inside.slice(s![j0..=j1, i0..=i1]))
            .for_each(|m, &keep| {
                if !keep {
                    *m = f64::NAN;
                }
            });

        debug!(
            ny = j1 - j0 + 1,
            nx = i1 - i0 + 1,
            %bbox,
            "restricted reference grid"
        );

        Ok(Self {
            x: self.x[i0..=i1].to_vec(),
            y: self.y[j0..=j1].to_vec(),
            lon: self.lon.slice(s![j0..=j1, i0..=i1]).to_owned(),
            lat: self.lat.slice(s![j0..=j1, i0..=i1]).to_owned(),
            mask,
            parent_shape: self.parent_shape,
            offset: (self.offset.0 + j0, self.offset.1 + i0),
        })
    }

    /// Cut a `[time, y, x]` field stored on the unrestricted grid down to
    /// this grid's rectangle.
    ///
    /// For a grid that was never restricted this is a shape-checked copy.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the field's spatial shape
    /// differs from the unrestricted grid.
    pub fn subset(&self, field: ArrayView3<'_, f64>) -> Result<Array3<f64>, GridError> {
        let (_, ny, nx) = field.dim();
        check_shape("field", (ny, nx), self.parent_shape)?;
        let (j0, i0) = self.offset;
        let (h, w) = self.shape();
        Ok(field.slice(s![.., j0..j0 + h, i0..i0 + w]).to_owned())
    }

    /// Multiply every time slice of a `[time, y, x]` field by the mask.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the spatial shape differs
    /// from the grid.
    pub fn apply_mask(&self, field: &mut Array3<f64>) -> Result<(), GridError> {
        let (_, ny, nx) = field.dim();
        check_shape("field", (ny, nx), self.shape())?;
        for mut slice in field.axis_iter_mut(Axis(0)) {
            slice *= &self.mask;
        }
        Ok(())
    }

    /// `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Projection x-axis labels.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Projection y-axis labels.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Per-cell longitude, `[y, x]`.
    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    /// Per-cell latitude, `[y, x]`.
    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    /// Multiplicative mask, `[y, x]`.
    pub fn mask(&self) -> &Array2<f64> {
        &self.mask
    }

    /// Number of cells whose mask is finite.
    pub fn n_ocean_cells(&self) -> usize {
        self.mask.iter().filter(|v| !v.is_nan()).count()
    }
}

fn check_shape(
    name: &str,
    got: (usize, usize),
    expected: (usize, usize),
) -> Result<(), GridError> {
    if got.0 != expected.0 {
        return Err(GridError::DimensionMismatch {
            name: format!("{name} y"),
            expected: expected.0,
            got: got.0,
        });
    }
    if got.1 != expected.1 {
        return Err(GridError::DimensionMismatch {
            name: format!("{name} x"),
            expected: expected.1,
            got: got.1,
        });
    }
    Ok(())
}
