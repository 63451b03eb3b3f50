//! # mef-io
//!
//! Read reference grids, observations and model output from NetCDF, decode
//! CF time axes to month labels, resolve model files through a
//! [`ModelSource`], and write gridded monthly series back to NetCDF.

mod catalog;
mod combine;
mod error;
mod netcdf_read;
mod reader;
mod series;
mod time;
mod writer;

pub use catalog::{CatalogQuery, LocalCatalog, ModelSource};
pub use combine::{CombineConfig, CombinedObservations, combine_monthly};
pub use error::IoError;
pub use reader::{ReaderConfig, read_grid, read_gridded, read_model};
pub use series::{GriddedSeries, ModelSeries};
pub use time::{CfCalendar, TimeAxis};
pub use writer::{GriddedVariable, write_gridded};
