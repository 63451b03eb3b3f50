//! # mef-normalize
//!
//! Bring raw model output onto the reference grid and the observation time
//! axis: window selection, flagging, bilinear regridding, land masking,
//! checked time alignment and unit rescaling.

mod align;
mod config;
mod error;
mod normalize;

pub use align::align_time;
pub use config::NormalizeConfig;
pub use error::NormalizeError;
pub use normalize::{RegriddedModelSeries, normalize_model};
