//! # mef-grid
//!
//! Reference-grid geometry for comparing gridded model output against an
//! observational product: the ocean/land mask, bounding-box restriction and
//! bilinear interpolation from a rectilinear or curvilinear model grid.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `bbox` | Longitude/latitude bounding boxes |
//! | `grid` | Reference grid with its multiplicative mask |
//! | `regrid` | `Regridder` trait and bilinear implementation |
//! | `curvilinear` | Enclosing-cell search on 2-D lon/lat source grids |
//! | `error` | Error types |

mod bbox;
mod curvilinear;
mod error;
mod grid;
mod regrid;

pub use bbox::{BoundingBox, wrap_longitude};
pub use error::GridError;
pub use grid::Grid;
pub use regrid::{BilinearRegridder, RegridWeights, Regridder, SourceGrid};
