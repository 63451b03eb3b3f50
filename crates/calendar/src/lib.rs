//! # mef-calendar
//!
//! Month-resolution calendar arithmetic for monthly climate time series.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mef_calendar::{Season, TimeWindow, YearMonth, month_sequence};
//!
//! let window = TimeWindow::default(); // 1978-12 ..= 2014-11
//! assert_eq!(window.len(), 432);
//!
//! let dec = YearMonth::new(1978, 12).unwrap();
//! assert_eq!(dec.season(), Season::Djf);
//! let months = month_sequence(dec, 3); // 1978-12, 1979-01, 1979-02
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `month` | `YearMonth` label with `YYYY-MM` parsing |
//! | `season` | DJF/MAM/JJA/SON grouping |
//! | `sequence` | Contiguous month sequences |
//! | `window` | Inclusive analysis windows |
//! | `error` | Error types |

mod error;
mod month;
mod season;
mod sequence;
mod window;

pub use error::CalendarError;
pub use month::YearMonth;
pub use season::Season;
pub use sequence::month_sequence;
pub use window::TimeWindow;
