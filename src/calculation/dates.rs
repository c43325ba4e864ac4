//! Calendar helpers shared by payroll and the entitlement calculators.
//!
//! Dates are timezone-naive calendar days. Ranges are inclusive on both ends.

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};

/// Fails with `InvalidDateRange` when `start` is after `end`.
pub fn ensure_range(start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if start > end {
        return Err(EngineError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Returns true for Saturdays and Sundays.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Iterates every day of the inclusive range.
pub fn days_in(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Number of calendar days in the inclusive range; zero if inverted.
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::calendar_days;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 5, 11).unwrap();
/// assert_eq!(calendar_days(start, end), 7);
/// assert_eq!(calendar_days(end, start), 0);
/// ```
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }
    (end - start).num_days() + 1
}

/// Number of Monday–Friday days in the inclusive range.
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::work_days;
/// use chrono::NaiveDate;
///
/// // Friday to Monday
/// let start = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// assert_eq!(work_days(start, end), 2);
/// ```
pub fn work_days(start: NaiveDate, end: NaiveDate) -> i64 {
    let total = calendar_days(start, end);
    let full_weeks = total / 7;
    let remainder = days_in(start + chrono::Duration::days(full_weeks * 7), end)
        .filter(|day| !is_weekend(*day))
        .count() as i64;
    full_weeks * 5 + remainder
}

/// First day of the rolling twelve-month window that ends on `as_of`.
pub fn rolling_year_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(12))
        .and_then(|d| d.succ_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// First day of the calendar year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Last day of the calendar year containing `date`.
pub fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// Number of overlapping days between two inclusive ranges, counted with `counter`.
pub fn overlap_days(
    a: (NaiveDate, NaiveDate),
    b: (NaiveDate, NaiveDate),
    counter: fn(NaiveDate, NaiveDate) -> i64,
) -> i64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    counter(start, end)
}
