//! Pay period and public holiday models.
//!
//! This module contains the [`PayPeriod`] and [`PublicHoliday`] types used to define
//! the calculation window for payroll runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a public holiday within a pay period.
///
/// # Example
///
/// ```
/// use transport_pay_engine::models::PublicHoliday;
/// use chrono::NaiveDate;
///
/// let holiday = PublicHoliday {
///     date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
///     name: "Juledag".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// The date of the public holiday.
    pub date: NaiveDate,
    /// The name of the public holiday.
    pub name: String,
}

/// Represents a pay period with its date range and associated public holidays.
///
/// # Example
///
/// ```
/// use transport_pay_engine::models::{PayPeriod, PublicHoliday};
/// use chrono::NaiveDate;
///
/// let pay_period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2025, 12, 22).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
///     public_holidays: vec![PublicHoliday {
///         date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
///         name: "Juledag".to_string(),
///     }],
/// };
///
/// assert!(pay_period.contains_date(NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()));
/// assert!(pay_period.is_public_holiday(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// Public holidays that fall within this pay period.
    #[serde(default)]
    pub public_holidays: Vec<PublicHoliday>,
}

impl PayPeriod {
    /// Creates a period without public holidays.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            public_holidays: Vec::new(),
        }
    }

    /// Fails with `InvalidDateRange` when the period ends before it starts.
    pub fn ensure_valid(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Checks if a given date falls within this pay period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Checks if a given date is a public holiday within this pay period.
    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.public_holidays.iter().any(|h| h.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn christmas_period() -> PayPeriod {
        PayPeriod {
            start_date: date(2025, 12, 22),
            end_date: date(2026, 1, 4),
            public_holidays: vec![
                PublicHoliday {
                    date: date(2025, 12, 25),
                    name: "Juledag".to_string(),
                },
                PublicHoliday {
                    date: date(2025, 12, 26),
                    name: "2. juledag".to_string(),
                },
            ],
        }
    }

    /// PP-001: boundaries are inclusive
    #[test]
    fn test_contains_date_boundaries() {
        let period = christmas_period();
        assert!(period.contains_date(date(2025, 12, 22)));
        assert!(period.contains_date(date(2026, 1, 4)));
        assert!(!period.contains_date(date(2025, 12, 21)));
        assert!(!period.contains_date(date(2026, 1, 5)));
    }

    /// PP-002: holiday lookup
    #[test]
    fn test_is_public_holiday() {
        let period = christmas_period();
        assert!(period.is_public_holiday(date(2025, 12, 26)));
        assert!(!period.is_public_holiday(date(2025, 12, 24)));
    }

    /// PP-003: inverted period is rejected
    #[test]
    fn test_inverted_period_is_invalid() {
        let period = PayPeriod::new(date(2025, 3, 31), date(2025, 3, 1));
        let err = period.ensure_valid().unwrap_err();
        assert!(matches!(err, EngineError::InvalidDateRange { .. }));
    }

    /// PP-004: single-day period is valid
    #[test]
    fn test_single_day_period_is_valid() {
        let period = PayPeriod::new(date(2025, 3, 3), date(2025, 3, 3));
        assert!(period.ensure_valid().is_ok());
    }

    #[test]
    fn test_deserialize_without_holidays() {
        let json = r#"{"start_date": "2025-03-01", "end_date": "2025-03-31"}"#;
        let period: PayPeriod = serde_json::from_str(json).unwrap();
        assert!(period.public_holidays.is_empty());
    }
}
