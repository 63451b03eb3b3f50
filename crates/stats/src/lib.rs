//! NaN-aware reductions shared by the baseline and metric crates.
//!
//! Masked grid cells are carried as `NaN`. Every reduction here skips `NaN`
//! terms, and returns `NaN` when no finite term is left, so a masked value
//! never contributes a finite number to a result.

/// Sum of the non-NaN values. Returns NaN if every value is NaN or the slice is empty.
pub fn nansum(data: &[f64]) -> f64 {
    nansum_iter(data.iter().copied())
}

/// [`nansum`] over an iterator, for strided array lanes.
pub fn nansum_iter(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut any = false;
    for v in values {
        if !v.is_nan() {
            total += v;
            any = true;
        }
    }
    if any { total } else { f64::NAN }
}

/// Mean of the non-NaN values. Returns NaN if no value is finite.
pub fn nanmean(data: &[f64]) -> f64 {
    nanmean_iter(data.iter().copied())
}

/// [`nanmean`] over an iterator.
pub fn nanmean_iter(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut n = 0usize;
    for v in values {
        if !v.is_nan() {
            total += v;
            n += 1;
        }
    }
    if n == 0 { f64::NAN } else { total / n as f64 }
}

/// Number of values strictly greater than `floor`. NaN never counts.
pub fn count_above(values: impl IntoIterator<Item = f64>, floor: f64) -> usize {
    values.into_iter().filter(|&v| v > floor).count()
}

/// Squared difference `(a - b)^2`; NaN if either side is NaN.
pub fn squared_error(a: f64, b: f64) -> f64 {
    let d = a - b;
    d * d
}

/// Relative size below which a denominator counts as zero.
pub const DEGENERATE_RTOL: f64 = f64::EPSILON;

/// Efficiency ratio `1 - numerator / denominator`.
///
/// `scale` is the sum of squared observations over the same terms. A
/// denominator at or below `DEGENERATE_RTOL * scale` is the rounding residue
/// of a constant series and yields NaN, as do a zero or NaN denominator and a
/// NaN numerator. No clamping is applied: the result may be arbitrarily
/// negative.
pub fn efficiency(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() || is_degenerate(denominator, scale) {
        return f64::NAN;
    }
    1.0 - numerator / denominator
}

/// Whether `denominator` vanishes relative to `scale`. A NaN scale only
/// catches an exact zero.
pub fn is_degenerate(denominator: f64, scale: f64) -> bool {
    denominator == 0.0 || denominator <= DEGENERATE_RTOL * scale.abs()
}
