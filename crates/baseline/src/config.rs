//! Configuration for observation baseline preparation.

use mef_calendar::TimeWindow;

use crate::error::BaselineError;
use crate::filter::RangeFilter;

/// Settings for [`prepare_baseline`](crate::prepare_baseline).
///
/// The [`Default`] reproduces the reference analysis: window 1978-12..2014-11,
/// values above 2.51 flagged (the observation product stores flags such as
/// land and coast as values above 2.5), at least 21 non-zero months per cell,
/// no range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineConfig {
    /// Analysis window; the observations must cover all of it.
    window: TimeWindow,
    /// Values strictly above this are treated as missing.
    validity_threshold: f64,
    /// Cells with this many or fewer non-zero months are masked entirely.
    min_valid_count: usize,
    /// Concentration band kept after masking.
    range_filter: RangeFilter,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            window: TimeWindow::default(),
            validity_threshold: 2.51,
            min_valid_count: 20,
            range_filter: RangeFilter::None,
        }
    }
}

impl BaselineConfig {
    /// Set the analysis window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the validity threshold.
    pub fn with_validity_threshold(mut self, threshold: f64) -> Self {
        self.validity_threshold = threshold;
        self
    }

    /// Set the minimum valid count.
    pub fn with_min_valid_count(mut self, count: usize) -> Self {
        self.min_valid_count = count;
        self
    }

    /// Set the range filter.
    pub fn with_range_filter(mut self, filter: RangeFilter) -> Self {
        self.range_filter = filter;
        self
    }

    /// Analysis window.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Validity threshold.
    pub fn validity_threshold(&self) -> f64 {
        self.validity_threshold
    }

    /// Minimum valid count.
    pub fn min_valid_count(&self) -> usize {
        self.min_valid_count
    }

    /// Range filter.
    pub fn range_filter(&self) -> RangeFilter {
        self.range_filter
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::InvalidConfig`] if the validity threshold is
    /// not finite, or if `min_valid_count` leaves no cell able to pass
    /// (`min_valid_count >= window length`).
    pub fn validate(&self) -> Result<(), BaselineError> {
        if !self.validity_threshold.is_finite() {
            return Err(BaselineError::InvalidConfig {
                reason: format!(
                    "validity_threshold must be finite, got {}",
                    self.validity_threshold
                ),
            });
        }
        if self.min_valid_count >= self.window.len() {
            return Err(BaselineError::InvalidConfig {
                reason: format!(
                    "min_valid_count {} masks every cell of a {}-month window",
                    self.min_valid_count,
                    self.window.len()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mef_calendar::YearMonth;

    #[test]
    fn defaults() {
        let c = BaselineConfig::default();
        assert_eq!(c.window().len(), 432);
        assert_eq!(c.validity_threshold(), 2.51);
        assert_eq!(c.min_valid_count(), 20);
        assert_eq!(c.range_filter(), RangeFilter::None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_threshold() {
        let c = BaselineConfig::default().with_validity_threshold(f64::NAN);
        assert!(matches!(
            c.validate(),
            Err(BaselineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_count_longer_than_window() {
        let start = YearMonth::new(2000, 1).unwrap();
        let window = TimeWindow::new(start, YearMonth::new(2000, 12).unwrap()).unwrap();
        let c = BaselineConfig::default().with_window(window);
        assert!(c.validate().is_err());
        assert!(c.with_min_valid_count(11).validate().is_ok());
    }
}
