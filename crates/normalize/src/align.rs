//! Time-axis alignment onto the observation labels.

use mef_calendar::YearMonth;
use mef_io::GriddedSeries;
use tracing::warn;

use crate::error::NormalizeError;

/// Relabel `series` with the observation time labels, position by position.
///
/// The two axes must have the same length; the series is never truncated or
/// padded. Positions whose months disagree are relabeled anyway and reported
/// with a warning.
///
/// # Errors
///
/// Returns [`NormalizeError::TimeAlignment`] if the lengths differ.
pub fn align_time(
    model: &str,
    series: GriddedSeries,
    reference: &[YearMonth],
) -> Result<GriddedSeries, NormalizeError> {
    if series.len() != reference.len() {
        return Err(NormalizeError::TimeAlignment {
            model: model.to_string(),
            expected: reference.len(),
            got: series.len(),
        });
    }

    let mismatched: Vec<(YearMonth, YearMonth)> = series
        .times()
        .iter()
        .zip(reference)
        .filter(|(m, r)| m != r)
        .map(|(&m, &r)| (m, r))
        .collect();
    if let Some(&(found, expected)) = mismatched.first() {
        warn!(
            model,
            n_mismatched = mismatched.len(),
            %found,
            %expected,
            "model months disagree with observation months; relabeling by position"
        );
    }

    let (values, _) = series.into_parts();
    Ok(GriddedSeries::new(values, reference.to_vec())?)
}
