//! Inclusive month windows used to slice every time series.

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::month::YearMonth;
use crate::sequence::month_sequence;

/// An inclusive range of months, `start..=end`.
///
/// The [`Default`] window is December 1978 through November 2014: 36 full
/// December-to-November years, 432 months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: YearMonth,
    end: YearMonth,
}

#[derive(Deserialize)]
struct RawWindow {
    start: YearMonth,
    end: YearMonth,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = CalendarError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: YearMonth::new(1978, 12).expect("12 is a valid month"),
            end: YearMonth::new(2014, 11).expect("11 is a valid month"),
        }
    }
}

impl TimeWindow {
    /// Creates a window covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidWindow`] if `end < start`.
    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self, CalendarError> {
        if end < start {
            return Err(CalendarError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// First month of the window.
    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Last month of the window (inclusive).
    pub fn end(&self) -> YearMonth {
        self.end
    }

    /// Number of months in the window.
    pub fn len(&self) -> usize {
        // end >= start is a construction invariant
        (self.start.months_until(self.end) + 1) as usize
    }

    /// Always `false`: a window holds at least one month.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `month` falls inside the window.
    pub fn contains(&self, month: YearMonth) -> bool {
        self.start <= month && month <= self.end
    }

    /// Every month of the window in order.
    pub fn months(&self) -> Vec<YearMonth> {
        month_sequence(self.start, self.len())
    }

    /// Indices of `labels` that fall inside the window, in input order.
    pub fn select(&self, labels: &[YearMonth]) -> Vec<usize> {
        labels
            .iter()
            .enumerate()
            .filter(|(_, m)| self.contains(**m))
            .map(|(i, _)| i)
            .collect()
    }
}
