//! Configuration for model normalization.

use mef_calendar::TimeWindow;

use crate::error::NormalizeError;

/// Settings for [`normalize_model`](crate::normalize_model).
///
/// The [`Default`] takes model output in percent: values above 100 are
/// flagged, and the result is divided by 100 to match fractional
/// observations.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    window: TimeWindow,
    validity_threshold: f64,
    percent_scale: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            window: TimeWindow::default(),
            validity_threshold: 100.0,
            percent_scale: 100.0,
        }
    }
}

impl NormalizeConfig {
    /// Set the analysis window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the threshold above which model values are treated as missing.
    pub fn with_validity_threshold(mut self, threshold: f64) -> Self {
        self.validity_threshold = threshold;
        self
    }

    /// Set the divisor converting model units to fractions.
    pub fn with_percent_scale(mut self, scale: f64) -> Self {
        self.percent_scale = scale;
        self
    }

    /// Analysis window.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Validity threshold, in model units.
    pub fn validity_threshold(&self) -> f64 {
        self.validity_threshold
    }

    /// Unit divisor.
    pub fn percent_scale(&self) -> f64 {
        self.percent_scale
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidConfig`] if the threshold is not
    /// finite or the scale is not a finite positive number.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if !self.validity_threshold.is_finite() {
            return Err(NormalizeError::InvalidConfig {
                reason: format!(
                    "validity_threshold must be finite, got {}",
                    self.validity_threshold
                ),
            });
        }
        if !(self.percent_scale.is_finite() && self.percent_scale > 0.0) {
            return Err(NormalizeError::InvalidConfig {
                reason: format!("percent_scale must be positive, got {}", self.percent_scale),
            });
        }
        Ok(())
    }
}
