//! CF-convention time decoding to month labels.
//!
//! Monthly climate files store time as an offset from a reference date in a
//! model-specific calendar. Only the month an offset falls in matters here, so
//! decoding stops at [`YearMonth`].

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use mef_calendar::YearMonth;

use crate::error::IoError;

const NOLEAP_CUMULATIVE: [i64; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];
const ALL_LEAP_CUMULATIVE: [i64; 13] =
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

// ---------------------------------------------------------------------------
// Calendar / unit enums
// ---------------------------------------------------------------------------

/// CF calendar attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfCalendar {
    /// `standard`, `gregorian`, `proleptic_gregorian`, `julian`.
    Standard,
    /// `noleap`, `365_day`.
    NoLeap,
    /// `all_leap`, `366_day`.
    AllLeap,
    /// `360_day`.
    Day360,
}

impl FromStr for CfCalendar {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" | "julian" => Ok(Self::Standard),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(IoError::InvalidTime {
                reason: format!("unsupported calendar '{other}'"),
            }),
        }
    }
}

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Seconds,
    Hours,
    Days,
    Months,
}

impl TimeUnit {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "s" => Some(Self::Seconds),
            "hours" | "hour" | "hrs" | "h" => Some(Self::Hours),
            "days" | "day" | "d" => Some(Self::Days),
            "months" | "month" => Some(Self::Months),
            _ => None,
        }
    }

    /// Offset in days, for the day-based units.
    fn to_days(self, offset: f64) -> f64 {
        match self {
            Self::Seconds => offset / 86_400.0,
            Self::Hours => offset / 24.0,
            Self::Days | Self::Months => offset,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeAxis
// ---------------------------------------------------------------------------

/// Parsed `units` + `calendar` pair of a time coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    unit: TimeUnit,
    /// Reference date as `(year, month, day)`; kept raw because a 360-day
    /// reference such as `2000-02-30` is not a Gregorian date.
    reference: (i32, u32, u32),
    calendar: CfCalendar,
}

impl TimeAxis {
    /// Parse a CF `units` string such as `"days since 1850-01-01 00:00:00"`.
    ///
    /// `calendar` defaults to `standard` when the attribute is absent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidTime`] for an unrecognized unit, a malformed
    /// reference date, or an unsupported calendar.
    pub fn parse(units: &str, calendar: Option<&str>) -> Result<Self, IoError> {
        let mut parts = units.split_whitespace();
        let (Some(unit_word), Some("since"), Some(date)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(IoError::InvalidTime {
                reason: format!("unexpected time units format: '{units}'"),
            });
        };
        let unit = TimeUnit::parse(unit_word).ok_or_else(|| IoError::InvalidTime {
            reason: format!("unsupported time unit '{unit_word}'"),
        })?;
        let reference = parse_reference_date(date)?;
        let calendar = match calendar {
            Some(c) => c.parse()?,
            None => CfCalendar::Standard,
        };
        Ok(Self {
            unit,
            reference,
            calendar,
        })
    }

    /// Calendar of the axis.
    pub fn calendar(&self) -> CfCalendar {
        self.calendar
    }

    /// Month containing the instant `offset` units after the reference date.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidTime`] for a non-finite offset or a date
    /// outside the representable range.
    pub fn decode(&self, offset: f64) -> Result<YearMonth, IoError> {
        if !offset.is_finite() {
            return Err(IoError::InvalidTime {
                reason: format!("non-finite time offset {offset}"),
            });
        }
        let (ry, rm, rd) = self.reference;

        if self.unit == TimeUnit::Months {
            let base = YearMonth::new(ry, rm as u8)?;
            return YearMonth::from_ordinal(base.ordinal() + offset.floor() as i64).ok_or_else(
                || IoError::InvalidTime {
                    reason: format!("offset {offset} months overflows"),
                },
            );
        }

        let days = self.unit.to_days(offset).floor() as i64;
        let (year, month) = match self.calendar {
            CfCalendar::Standard => {
                let base = NaiveDate::from_ymd_opt(ry, rm, rd).ok_or_else(|| {
                    IoError::InvalidTime {
                        reason: format!("invalid reference date {ry:04}-{rm:02}-{rd:02}"),
                    }
                })?;
                let date = base
                    .checked_add_signed(chrono::TimeDelta::days(days))
                    .ok_or_else(|| IoError::InvalidTime {
                        reason: format!("date overflow adding {days} days to {base}"),
                    })?;
                (date.year(), date.month())
            }
            CfCalendar::NoLeap => fixed_year(&NOLEAP_CUMULATIVE, (ry, rm, rd), days),
            CfCalendar::AllLeap => fixed_year(&ALL_LEAP_CUMULATIVE, (ry, rm, rd), days),
            CfCalendar::Day360 => {
                let start = i64::from(ry) * 360 + i64::from(rm - 1) * 30 + i64::from(rd) - 1;
                let t = start + days;
                (
                    t.div_euclid(360) as i32,
                    (t.rem_euclid(360) / 30 + 1) as u32,
                )
            }
        };
        Ok(YearMonth::new(year, month as u8)?)
    }

    /// Decode every offset of a time coordinate.
    ///
    /// # Errors
    ///
    /// Same as [`TimeAxis::decode`].
    pub fn decode_all(&self, offsets: &[f64]) -> Result<Vec<YearMonth>, IoError> {
        offsets.iter().map(|&t| self.decode(t)).collect()
    }
}

/// Year/month of `reference + days` in a calendar whose years all have the
/// same length.
fn fixed_year(cumulative: &[i64; 13], reference: (i32, u32, u32), days: i64) -> (i32, u32) {
    let year_len = cumulative[12];
    let (ry, rm, rd) = reference;
    let start = i64::from(ry) * year_len + cumulative[(rm - 1) as usize] + i64::from(rd) - 1;
    let t = start + days;
    let doy = t.rem_euclid(year_len);
    let month = cumulative[1..].partition_point(|&c| c <= doy) as u32 + 1;
    (t.div_euclid(year_len) as i32, month)
}

/// Parse `YYYY-M-D`, ignoring any time-of-day suffix after `T` or a space.
fn parse_reference_date(text: &str) -> Result<(i32, u32, u32), IoError> {
    let date = text.split('T').next().unwrap_or(text);
    let invalid = || IoError::InvalidTime {
        reason: format!("failed to parse reference date '{text}'"),
    };
    let mut fields = date.splitn(3, '-');
    let year: i32 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(invalid)?;
    let month: u32 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(invalid)?;
    let day: u32 = match fields.next() {
        Some(v) => v.parse().map_err(|_| invalid())?,
        None => 1,
    };
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }
    Ok((year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u8) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn parse_units_with_time_of_day() {
        let axis = TimeAxis::parse("days since 1850-01-01 00:00:00", Some("noleap")).unwrap();
        assert_eq!(axis.calendar(), CfCalendar::NoLeap);
        assert_eq!(axis.decode(15.5).unwrap(), ym(1850, 1));
    }

    #[test]
    fn parse_rejects_bad_units() {
        assert!(TimeAxis::parse("days after 1850-01-01", None).is_err());
        assert!(TimeAxis::parse("fortnights since 1850-01-01", None).is_err());
        assert!(TimeAxis::parse("days since 1850-13-01", None).is_err());
        assert!(TimeAxis::parse("days since 1850-01-01", Some("martian")).is_err());
    }

    #[test]
    fn noleap_mid_month_offsets() {
        let axis = TimeAxis::parse("days since 1850-01-01", Some("365_day")).unwrap();
        // 1978-12-16 in a 365-day calendar
        let dec_1978 = (1978 - 1850) as f64 * 365.0 + 334.0 + 15.0;
        assert_eq!(axis.decode(dec_1978).unwrap(), ym(1978, 12));
        assert_eq!(axis.decode(dec_1978 + 31.0).unwrap(), ym(1979, 1));
        assert_eq!(axis.decode(364.9).unwrap(), ym(1850, 12));
        assert_eq!(axis.decode(365.0).unwrap(), ym(1851, 1));
    }

    #[test]
    fn day360_months_are_thirty_days() {
        let axis = TimeAxis::parse("days since 2000-01-01", Some("360_day")).unwrap();
        assert_eq!(axis.decode(29.9).unwrap(), ym(2000, 1));
        assert_eq!(axis.decode(30.0).unwrap(), ym(2000, 2));
        assert_eq!(axis.decode(359.0).unwrap(), ym(2000, 12));
        assert_eq!(axis.decode(360.0).unwrap(), ym(2001, 1));
    }

    #[test]
    fn all_leap_february_has_29_days() {
        let axis = TimeAxis::parse("days since 2001-01-01", Some("all_leap")).unwrap();
        assert_eq!(axis.decode(59.0).unwrap(), ym(2001, 2));
        assert_eq!(axis.decode(60.0).unwrap(), ym(2001, 3));
    }

    #[test]
    fn gregorian_respects_leap_years() {
        let axis = TimeAxis::parse("days since 2000-01-01", Some("gregorian")).unwrap();
        assert_eq!(axis.decode(59.0).unwrap(), ym(2000, 2));
        assert_eq!(axis.decode(60.0).unwrap(), ym(2000, 3));
    }

    #[test]
    fn hours_and_seconds() {
        let axis = TimeAxis::parse("hours since 1979-01-01", None).unwrap();
        assert_eq!(axis.decode(31.0 * 24.0).unwrap(), ym(1979, 2));
        let axis = TimeAxis::parse("seconds since 1979-01-01", None).unwrap();
        assert_eq!(axis.decode(86_400.0 * 31.0 - 1.0).unwrap(), ym(1979, 1));
    }

    #[test]
    fn months_since() {
        let axis = TimeAxis::parse("months since 1978-12-01", Some("360_day")).unwrap();
        assert_eq!(axis.decode(0.5).unwrap(), ym(1978, 12));
        assert_eq!(axis.decode(1.0).unwrap(), ym(1979, 1));
        assert_eq!(axis.decode(431.0).unwrap(), ym(2014, 11));
    }

    #[test]
    fn negative_offsets_go_backwards() {
        let axis = TimeAxis::parse("days since 1979-01-01", Some("noleap")).unwrap();
        assert_eq!(axis.decode(-1.0).unwrap(), ym(1978, 12));
    }

    #[test]
    fn non_finite_offset_rejected() {
        let axis = TimeAxis::parse("days since 1979-01-01", None).unwrap();
        assert!(axis.decode(f64::NAN).is_err());
    }
}
