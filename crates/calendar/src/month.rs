//! Year-month labels for monthly time axes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::season::Season;

/// A calendar month with year context, e.g. `1978-12`.
///
/// Ordering is chronological. Serializes as a `YYYY-MM` string so it can be
/// used directly in TOML configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Creates a new `YearMonth`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn new(year: i32, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Zero-based month index (January = 0).
    pub fn month_index(self) -> usize {
        usize::from(self.month - 1)
    }

    /// Meteorological season this month belongs to.
    pub fn season(self) -> Season {
        Season::from_month(self.month)
    }

    /// Returns the following month, wrapping December into January.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Months elapsed since year 0, January.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month - 1)
    }

    /// Inverse of [`YearMonth::ordinal`]. `None` if the year overflows `i32`.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
        let month = u8::try_from(ordinal.rem_euclid(12) + 1).ok()?;
        Some(Self { year, month })
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(self, other: Self) -> i64 {
        other.ordinal() - self.ordinal()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidLabel {
            label: s.to_string(),
        };
        // rsplit so that negative years ("-001-03") still parse
        let (year, month) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid() {
        let ym = YearMonth::new(1978, 12).unwrap();
        assert_eq!(ym.year(), 1978);
        assert_eq!(ym.month(), 12);
        assert_eq!(ym.month_index(), 11);
    }

    #[test]
    fn new_invalid_month() {
        assert_eq!(
            YearMonth::new(2000, 0).unwrap_err(),
            CalendarError::InvalidMonth { month: 0 }
        );
        assert_eq!(
            YearMonth::new(2000, 13).unwrap_err(),
            CalendarError::InvalidMonth { month: 13 }
        );
    }

    #[test]
    fn next_wraps_year() {
        let dec = YearMonth::new(1978, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(1979, 1).unwrap());
        let jun = YearMonth::new(2000, 6).unwrap();
        assert_eq!(jun.next(), YearMonth::new(2000, 7).unwrap());
    }

    #[test]
    fn months_until_counts_span() {
        let start = YearMonth::new(1978, 12).unwrap();
        let end = YearMonth::new(2014, 11).unwrap();
        assert_eq!(start.months_until(end), 431);
        assert_eq!(end.months_until(start), -431);
    }

    #[test]
    fn from_ordinal_inverts_ordinal() {
        for ym in [
            YearMonth::new(1978, 12).unwrap(),
            YearMonth::new(2000, 1).unwrap(),
            YearMonth::new(-1, 6).unwrap(),
        ] {
            assert_eq!(YearMonth::from_ordinal(ym.ordinal()), Some(ym));
        }
        assert_eq!(YearMonth::from_ordinal(i64::MAX), None);
    }

    #[test]
    fn display_and_parse() {
        let ym = YearMonth::new(1979, 3).unwrap();
        assert_eq!(ym.to_string(), "1979-03");
        assert_eq!("1979-03".parse::<YearMonth>().unwrap(), ym);
        assert_eq!(" 2014-11 ".parse::<YearMonth>().unwrap().month(), 11);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "1979/03".parse::<YearMonth>(),
            Err(CalendarError::InvalidLabel { .. })
        ));
        assert!(matches!(
            "1979-xx".parse::<YearMonth>(),
            Err(CalendarError::InvalidLabel { .. })
        ));
        assert!(matches!(
            "1979-13".parse::<YearMonth>(),
            Err(CalendarError::InvalidMonth { month: 13 })
        ));
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::new(1999, 12).unwrap();
        let b = YearMonth::new(2000, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_as_string() {
        let ym = YearMonth::new(1978, 12).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"1978-12\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
