//! Error types for the mef-calendar crate.

/// Error type for all fallible operations in the mef-calendar crate.
///
/// Covers invalid month numbers, unparseable `YYYY-MM` labels, and analysis
/// windows whose end precedes their start.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a `YYYY-MM` label cannot be parsed.
    #[error("invalid year-month label '{label}': expected YYYY-MM")]
    InvalidLabel {
        /// The label that failed to parse.
        label: String,
    },

    /// Returned when a window's end month precedes its start month.
    #[error("invalid window: end {end} precedes start {start}")]
    InvalidWindow {
        /// Requested first month of the window.
        start: String,
        /// Requested last month of the window.
        end: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_month() {
        let err = CalendarError::InvalidMonth { month: 13 };
        assert_eq!(err.to_string(), "invalid month: 13 (must be 1..=12)");
    }

    #[test]
    fn error_invalid_label() {
        let err = CalendarError::InvalidLabel {
            label: "1978/12".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid year-month label '1978/12': expected YYYY-MM"
        );
    }

    #[test]
    fn error_invalid_window() {
        let err = CalendarError::InvalidWindow {
            start: "2014-11".to_string(),
            end: "1978-12".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid window: end 1978-12 precedes start 2014-11"
        );
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<CalendarError>();
    }
}
