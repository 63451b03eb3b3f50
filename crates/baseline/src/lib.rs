//! # mef-baseline
//!
//! Turn raw monthly observations on the reference grid into the baseline
//! every model is scored against: window selection, flag removal,
//! valid-count masking, concentration-band filtering and the per-cell
//! climatology.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `baseline` | [`prepare_baseline`] |
//! | `config` | Thresholds, window and filter selection |
//! | `filter` | Concentration-band range filters |
//! | `result` | Prepared baseline and its summary |
//! | `error` | Error types |

mod baseline;
mod config;
mod error;
mod filter;
mod result;

pub use baseline::prepare_baseline;
pub use config::BaselineConfig;
pub use error::BaselineError;
pub use filter::RangeFilter;
pub use result::{BaselineSummary, ObservationBaseline};
