//! Concentration-band filters applied to the observation series.

use std::fmt;
use std::str::FromStr;

use ndarray::Array3;

use crate::error::BaselineError;

/// Keeps observations inside one concentration band; the rest become NaN.
///
/// Bands are stated in percent and compared against the fractional series as
/// `pct / 100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeFilter {
    /// Keep every value.
    #[default]
    None,
    /// Keep `v > 15%`.
    ExcludeLow,
    /// Keep `v == 0`.
    IsolateZero,
    /// Keep `0 < v <= 15%`.
    Isolate0To15,
    /// Keep `15% < v <= 80%`.
    Isolate15To80,
    /// Keep `80% < v <= 100%`.
    Isolate80To100,
}

impl RangeFilter {
    /// Every filter, in declaration order.
    pub const ALL: [RangeFilter; 6] = [
        RangeFilter::None,
        RangeFilter::ExcludeLow,
        RangeFilter::IsolateZero,
        RangeFilter::Isolate0To15,
        RangeFilter::Isolate15To80,
        RangeFilter::Isolate80To100,
    ];

    /// Kebab-case name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExcludeLow => "exclude-low",
            Self::IsolateZero => "isolate-zero",
            Self::Isolate0To15 => "isolate-0-15",
            Self::Isolate15To80 => "isolate-15-80",
            Self::Isolate80To100 => "isolate-80-100",
        }
    }

    /// Whether a fractional concentration survives the filter. NaN never does.
    pub fn keeps(self, v: f64) -> bool {
        const P15: f64 = 15.0 / 100.0;
        const P80: f64 = 80.0 / 100.0;
        const P100: f64 = 100.0 / 100.0;
        if v.is_nan() {
            return false;
        }
        match self {
            Self::None => true,
            Self::ExcludeLow => v > P15,
            Self::IsolateZero => v == 0.0,
            Self::Isolate0To15 => v > 0.0 && v <= P15,
            Self::Isolate15To80 => v > P15 && v <= P80,
            Self::Isolate80To100 => v > P80 && v <= P100,
        }
    }

    /// Set every value outside the band to NaN.
    pub fn apply(self, values: &mut Array3<f64>) {
        if self == Self::None {
            return;
        }
        values.mapv_inplace(|v| if self.keeps(v) { v } else { f64::NAN });
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RangeFilter {
    type Err = BaselineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|f| f.name() == key)
            .ok_or_else(|| BaselineError::UnknownRangeFilter {
                name: s.to_string(),
                expected: Self::ALL.map(RangeFilter::name).join(", "),
            })
    }
}
