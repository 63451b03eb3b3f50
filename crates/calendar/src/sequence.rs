//! Month sequence generation.

use crate::month::YearMonth;

/// Generates a contiguous sequence of months.
///
/// Starting from `start`, produces exactly `n_months` consecutive labels.
/// Year boundaries are handled automatically (December wraps to January of
/// the following year).
///
/// # Example
///
/// ```ignore
/// let start = YearMonth::new(1978, 12).unwrap();
/// let months = month_sequence(start, 3);
/// // 1978-12, 1979-01, 1979-02
/// ```
pub fn month_sequence(start: YearMonth, n_months: usize) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(n_months);
    if n_months == 0 {
        return months;
    }
    months.push(start);
    let mut current = start;
    for _ in 1..n_months {
        current = current.next();
        months.push(current);
    }
    months
}
