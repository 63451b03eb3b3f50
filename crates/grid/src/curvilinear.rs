//! Enclosing-cell search on curvilinear source grids (2-D lon/lat).
//!
//! Source quads are binned on a coarse lon/lat lattice once. A target point
//! is then tested only against the quads of its bin, by inverting the
//! bilinear map of each candidate in index space.

use ndarray::ArrayView2;

/// Bin size of the lookup lattice, in degrees.
const BIN_DEG: f64 = 2.0;
const N_LON_BINS: usize = 180;
const N_LAT_BINS: usize = 90;

/// Slack on the unit square when accepting an inverted position.
const INSIDE_TOL: f64 = 1e-9;
const MAX_NEWTON_STEPS: usize = 30;

/// Quad spanning rows `j..=j + 1` and columns `i`, `i1`. `i1` is `i + 1`,
/// or `0` for the seam quad of a periodic grid.
#[derive(Debug, Clone, Copy)]
struct Quad {
    j: usize,
    i: usize,
    i1: usize,
}

/// Position of a target point inside a source quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Location {
    pub(crate) j0: usize,
    pub(crate) j1: usize,
    pub(crate) i0: usize,
    pub(crate) i1: usize,
    /// Fraction along the column direction.
    pub(crate) fx: f64,
    /// Fraction along the row direction.
    pub(crate) fy: f64,
}

/// Binned quads of one curvilinear grid.
pub(crate) struct CellIndex<'a> {
    lon: ArrayView2<'a, f64>,
    lat: ArrayView2<'a, f64>,
    quads: Vec<Quad>,
    bins: Vec<Vec<usize>>,
}

impl<'a> CellIndex<'a> {
    /// Bin every quad whose four corners have finite coordinates.
    ///
    /// With `periodic` set, the last column is joined to the first.
    pub(crate) fn build(lon: ArrayView2<'a, f64>, lat: ArrayView2<'a, f64>, periodic: bool) -> Self {
        let (ny, nx) = lon.dim();
        let mut quads = Vec::new();
        let mut bins = vec![Vec::new(); N_LAT_BINS * N_LON_BINS];
        if ny >= 2 && nx >= 2 {
            let n_cols = if periodic { nx } else { nx - 1 };
            for j in 0..ny - 1 {
                for i in 0..n_cols {
                    let quad = Quad { j, i, i1: (i + 1) % nx };
                    let Some(corners) = corners(lon, lat, quad) else {
                        continue;
                    };
                    let id = quads.len();
                    quads.push(quad);
                    for b in covered_bins(&corners) {
                        bins[b].push(id);
                    }
                }
            }
        }
        Self {
            lon,
            lat,
            quads,
            bins,
        }
    }

    /// Number of quads in the index.
    pub(crate) fn n_quads(&self) -> usize {
        self.quads.len()
    }

    /// Find the quad enclosing `(lon, lat)`. The first match in row-major
    /// quad order wins on shared edges.
    pub(crate) fn locate(&self, lon: f64, lat: f64) -> Option<Location> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let bin = lat_bin(lat) * N_LON_BINS + lon_bin(lon);
        self.bins[bin].iter().find_map(|&id| {
            let quad = self.quads[id];
            let corners = corners(self.lon, self.lat, quad)?;
            let (fx, fy) = invert(&corners, lon, lat)?;
            Some(Location {
                j0: quad.j,
                j1: quad.j + 1,
                i0: quad.i,
                i1: quad.i1,
                fx,
                fy,
            })
        })
    }
}

/// Corners in the order `(j, i)`, `(j, i1)`, `(j + 1, i)`, `(j + 1, i1)`.
fn corners(lon: ArrayView2<'_, f64>, lat: ArrayView2<'_, f64>, q: Quad) -> Option<[(f64, f64); 4]> {
    let c = [
        (lon[[q.j, q.i]], lat[[q.j, q.i]]),
        (lon[[q.j, q.i1]], lat[[q.j, q.i1]]),
        (lon[[q.j + 1, q.i]], lat[[q.j + 1, q.i]]),
        (lon[[q.j + 1, q.i1]], lat[[q.j + 1, q.i1]]),
    ];
    c.iter()
        .all(|(x, y)| x.is_finite() && y.is_finite())
        .then_some(c)
}

/// Lattice bins touched by the lon/lat extent of a quad.
fn covered_bins(corners: &[(f64, f64); 4]) -> Vec<usize> {
    let lon0 = corners[0].0;
    let offsets = corners.map(|(x, _)| wrap_offset(x - lon0));
    let d_min = offsets.iter().copied().fold(f64::INFINITY, f64::min);
    let d_max = offsets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lat_min = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let lat_max = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let lon_bins: Vec<usize> = if d_max - d_min >= 180.0 {
        // quad around a pole
        (0..N_LON_BINS).collect()
    } else {
        let first = ((lon0 + d_min) / BIN_DEG).floor() as i64;
        let last = ((lon0 + d_max) / BIN_DEG).floor() as i64;
        (first..=last)
            .map(|b| b.rem_euclid(N_LON_BINS as i64) as usize)
            .collect()
    };
    let mut out = Vec::new();
    for lb in lat_bin(lat_min)..=lat_bin(lat_max) {
        out.extend(lon_bins.iter().map(|&b| lb * N_LON_BINS + b));
    }
    out
}

fn lat_bin(lat: f64) -> usize {
    (((lat + 90.0) / BIN_DEG).floor().max(0.0) as usize).min(N_LAT_BINS - 1)
}

fn lon_bin(lon: f64) -> usize {
    ((lon.rem_euclid(360.0) / BIN_DEG).floor() as usize).min(N_LON_BINS - 1)
}

/// Longitude difference wrapped into `[-180, 180)`.
fn wrap_offset(d: f64) -> f64 {
    (d + 180.0).rem_euclid(360.0) - 180.0
}

/// Solve `P(fx, fy) = (lon, lat)` for the bilinear map of a quad.
///
/// Coordinates are taken relative to the target, with longitude differences
/// wrapped, so quads across the dateline invert like any other. Returns
/// `None` if the point lies outside the quad or the map is degenerate.
fn invert(corners: &[(f64, f64); 4], lon: f64, lat: f64) -> Option<(f64, f64)> {
    let p = corners.map(|(x, y)| (wrap_offset(x - lon), y - lat));
    let a = p[0];
    let b = (p[1].0 - p[0].0, p[1].1 - p[0].1);
    let c = (p[2].0 - p[0].0, p[2].1 - p[0].1);
    let d = (
        p[0].0 - p[1].0 - p[2].0 + p[3].0,
        p[0].1 - p[1].1 - p[2].1 + p[3].1,
    );
    let scale = b.0.abs() + b.1.abs() + c.0.abs() + c.1.abs();
    if scale == 0.0 {
        return None;
    }

    let (mut s, mut t) = (0.5, 0.5);
    for _ in 0..MAX_NEWTON_STEPS {
        let fx = a.0 + b.0 * s + c.0 * t + d.0 * s * t;
        let fy = a.1 + b.1 * s + c.1 * t + d.1 * s * t;
        let (js_x, js_y) = (b.0 + d.0 * t, b.1 + d.1 * t);
        let (jt_x, jt_y) = (c.0 + d.0 * s, c.1 + d.1 * s);
        let det = js_x * jt_y - jt_x * js_y;
        if det.abs() <= f64::EPSILON * scale * scale {
            return None;
        }
        let ds = (fx * jt_y - fy * jt_x) / det;
        let dt = (js_x * fy - js_y * fx) / det;
        s -= ds;
        t -= dt;
        if ds.abs() + dt.abs() < 1e-14 {
            break;
        }
    }

    let rx = a.0 + b.0 * s + c.0 * t + d.0 * s * t;
    let ry = a.1 + b.1 * s + c.1 * t + d.1 * s * t;
    if rx.abs() + ry.abs() > 1e-9 * scale {
        return None;
    }
    let range = -INSIDE_TOL..=1.0 + INSIDE_TOL;
    if !(range.contains(&s) && range.contains(&t)) {
        return None;
    }
    Some((snap_unit(s), snap_unit(t)))
}

/// Clamp to `[0, 1]` and snap values within tolerance of an edge onto it, so
/// the far corners of a point on an edge get exactly zero weight.
fn snap_unit(v: f64) -> f64 {
    if v < INSIDE_TOL {
        0.0
    } else if v > 1.0 - INSIDE_TOL {
        1.0
    } else {
        v
    }
}
