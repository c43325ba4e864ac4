//! Daily time categorization.
//!
//! This module splits one day's worked time into the hour buckets payroll
//! pays for: regular hours up to the agreement's normal daily hours, overtime
//! in two tiers, and the night/weekend/holiday premium buckets.
//!
//! ## Bucket Structure
//!
//! - Regular: min(worked, normal daily hours)
//! - Overtime tier 1: the first 3 hours beyond normal daily hours
//! - Overtime tier 2: any overtime beyond that
//! - Night, weekend, holiday: tracked independently and may overlap with
//!   regular or overtime hours; they drive premiums, not base pay.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::dates::is_weekend;
use crate::models::{AuditStep, TimeEntry};

/// The number of overtime hours per day paid at the first-tier rate.
pub const OVERTIME_TIER1_MAX_HOURS: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Clause reference for the working time and overtime split.
pub const WORKING_TIME_CLAUSE: &str = "§ 6 Arbejdstid, § 7 Overarbejde";

/// Hours per bucket for a day or a whole period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBuckets {
    /// Hours up to normal daily hours.
    pub regular: Decimal,
    /// First-tier overtime hours.
    pub overtime_tier1: Decimal,
    /// Second-tier overtime hours.
    pub overtime_tier2: Decimal,
    /// Night or shifted-time hours.
    pub night: Decimal,
    /// Weekend hours.
    pub weekend: Decimal,
    /// Public holiday hours.
    pub holiday: Decimal,
}

impl HourBuckets {
    /// Adds another set of buckets into this one.
    pub fn accumulate(&mut self, other: &HourBuckets) {
        self.regular += other.regular;
        self.overtime_tier1 += other.overtime_tier1;
        self.overtime_tier2 += other.overtime_tier2;
        self.night += other.night;
        self.weekend += other.weekend;
        self.holiday += other.holiday;
    }

    /// Total overtime hours across both tiers.
    pub fn overtime(&self) -> Decimal {
        self.overtime_tier1 + self.overtime_tier2
    }

    /// Worked hours: regular plus overtime.
    pub fn worked(&self) -> Decimal {
        self.regular + self.overtime()
    }
}

/// The split of worked hours into regular and tiered overtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// Hours up to the threshold.
    pub regular: Decimal,
    /// First-tier overtime hours.
    pub tier1: Decimal,
    /// Second-tier overtime hours.
    pub tier2: Decimal,
}

/// Splits worked hours against the daily threshold.
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::split_overtime;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let split = split_overtime(Decimal::from(12), Decimal::from_str("7.4").unwrap());
/// assert_eq!(split.regular, Decimal::from_str("7.4").unwrap());
/// assert_eq!(split.tier1, Decimal::from(3));
/// assert_eq!(split.tier2, Decimal::from_str("1.6").unwrap());
/// ```
pub fn split_overtime(worked_hours: Decimal, normal_daily_hours: Decimal) -> OvertimeSplit {
    let worked_hours = worked_hours.max(Decimal::ZERO);
    let regular = worked_hours.min(normal_daily_hours);
    let overtime = (worked_hours - normal_daily_hours).max(Decimal::ZERO);
    let tier1 = overtime.min(OVERTIME_TIER1_MAX_HOURS);
    OvertimeSplit {
        regular,
        tier1,
        tier2: overtime - tier1,
    }
}

/// The result of categorizing one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCategorization {
    /// The day that was categorized.
    pub date: NaiveDate,
    /// Net worked hours over all entries of the day.
    pub worked_hours: Decimal,
    /// The hour buckets.
    pub buckets: HourBuckets,
    /// The audit step recording this categorization.
    pub audit_step: AuditStep,
}

/// Categorizes one day's approved time entries.
///
/// Net minutes per entry are end − start − break (an open or zero-length
/// entry contributes nothing). An entry counts toward the night bucket when
/// flagged night or irregular, toward the weekend bucket when flagged weekend
/// or dated on a Saturday/Sunday, and toward the holiday bucket when flagged
/// holiday or `public_holiday` is set for the day.
///
/// # Arguments
///
/// * `date` - The day being categorized
/// * `entries` - The approved entries booked on that day
/// * `normal_daily_hours` - The agreement's weekly hours divided by five
/// * `public_holiday` - Whether the day is a public holiday in the pay period
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::categorize_day;
/// use transport_pay_engine::models::{ApprovalStatus, EntryFlags, TimeEntry};
/// use chrono::{DateTime, NaiveDate};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let entry = TimeEntry {
///     id: "te_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
///     start: DateTime::parse_from_rfc3339("2025-03-04T07:00:00+01:00").unwrap(),
///     end: Some(DateTime::parse_from_rfc3339("2025-03-04T15:30:00+01:00").unwrap()),
///     break_minutes: 30,
///     flags: EntryFlags::default(),
///     task_type: "distribution".to_string(),
///     status: ApprovalStatus::Approved,
/// };
///
/// let day = categorize_day(entry.date, &[&entry], Decimal::from_str("7.4").unwrap(), false, 1);
/// assert_eq!(day.buckets.regular, Decimal::from_str("7.4").unwrap());
/// assert_eq!(day.buckets.overtime_tier1, Decimal::from_str("0.6").unwrap());
/// assert_eq!(day.buckets.overtime_tier2, Decimal::ZERO);
/// ```
pub fn categorize_day(
    date: NaiveDate,
    entries: &[&TimeEntry],
    normal_daily_hours: Decimal,
    public_holiday: bool,
    step_number: u32,
) -> DayCategorization {
    let weekend_day = is_weekend(date);
    let mut worked_minutes: i64 = 0;
    let mut night_minutes: i64 = 0;
    let mut weekend_minutes: i64 = 0;
    let mut holiday_minutes: i64 = 0;

    for entry in entries {
        let minutes = entry.net_minutes();
        worked_minutes += minutes;
        if entry.flags.night || entry.flags.irregular {
            night_minutes += minutes;
        }
        if entry.flags.weekend || weekend_day {
            weekend_minutes += minutes;
        }
        if entry.flags.holiday || public_holiday {
            holiday_minutes += minutes;
        }
    }

    let worked_hours = minutes_to_hours(worked_minutes);
    let split = split_overtime(worked_hours, normal_daily_hours);
    let buckets = HourBuckets {
        regular: split.regular,
        overtime_tier1: split.tier1,
        overtime_tier2: split.tier2,
        night: minutes_to_hours(night_minutes),
        weekend: minutes_to_hours(weekend_minutes),
        holiday: minutes_to_hours(holiday_minutes),
    };

    let reasoning = if buckets.overtime() > Decimal::ZERO {
        format!(
            "{} hours worked exceeds {} normal daily hours by {} hours ({} tier 1, {} tier 2)",
            worked_hours.normalize(),
            normal_daily_hours.normalize(),
            buckets.overtime().normalize(),
            buckets.overtime_tier1.normalize(),
            buckets.overtime_tier2.normalize()
        )
    } else {
        format!(
            "{} hours worked within {} normal daily hours, no overtime",
            worked_hours.normalize(),
            normal_daily_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "daily_time_categorization".to_string(),
        rule_name: "Daily Time Categorization".to_string(),
        clause_ref: WORKING_TIME_CLAUSE.to_string(),
        input: serde_json::json!({
            "date": date.to_string(),
            "entries": entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            "worked_hours": worked_hours.normalize().to_string(),
            "normal_daily_hours": normal_daily_hours.normalize().to_string(),
            "public_holiday": public_holiday
        }),
        output: serde_json::json!({
            "regular": buckets.regular.normalize().to_string(),
            "overtime_tier1": buckets.overtime_tier1.normalize().to_string(),
            "overtime_tier2": buckets.overtime_tier2.normalize().to_string(),
            "night": buckets.night.normalize().to_string(),
            "weekend": buckets.weekend.normalize().to_string(),
            "holiday": buckets.holiday.normalize().to_string()
        }),
        reasoning,
    };

    DayCategorization {
        date,
        worked_hours,
        buckets,
        audit_step,
    }
}

fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::entry;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // ==========================================================================
    // TC-001: 8h net on a 37h agreement - 7.4 regular, 0.6 tier 1
    // ==========================================================================
    #[test]
    fn test_tc_001_eight_hours_on_37_hour_week() {
        let e = entry("TC-001", "2025-03-04", "07:00:00", "15:30:00", 30);
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);

        assert_eq!(result.worked_hours, dec("8"));
        assert_eq!(result.buckets.regular, dec("7.4"));
        assert_eq!(result.buckets.overtime_tier1, dec("0.6"));
        assert_eq!(result.buckets.overtime_tier2, Decimal::ZERO);
    }

    // ==========================================================================
    // TC-002: exactly normal daily hours - no overtime
    // ==========================================================================
    #[test]
    fn test_tc_002_exactly_normal_hours() {
        let e = entry("TC-002", "2025-03-04", "07:00:00", "14:24:00", 0);
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);

        assert_eq!(result.buckets.regular, dec("7.4"));
        assert_eq!(result.buckets.overtime(), Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("no overtime"));
    }

    // ==========================================================================
    // TC-003: 12h day - overtime splits 3 + 1.6
    // ==========================================================================
    #[test]
    fn test_tc_003_long_day_splits_tiers() {
        let e = entry("TC-003", "2025-03-04", "06:00:00", "18:00:00", 0);
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);

        assert_eq!(result.buckets.regular, dec("7.4"));
        assert_eq!(result.buckets.overtime_tier1, dec("3"));
        assert_eq!(result.buckets.overtime_tier2, dec("1.6"));
    }

    // ==========================================================================
    // TC-004: two entries on one day are summed before the split
    // ==========================================================================
    #[test]
    fn test_tc_004_entries_summed_per_day() {
        let morning = entry("TC-004a", "2025-03-04", "06:00:00", "11:00:00", 0);
        let evening = entry("TC-004b", "2025-03-04", "15:00:00", "19:00:00", 0);
        let result = categorize_day(morning.date, &[&morning, &evening], dec("7.4"), false, 1);

        assert_eq!(result.worked_hours, dec("9"));
        assert_eq!(result.buckets.overtime_tier1, dec("1.6"));
    }

    // ==========================================================================
    // TC-005: open entry yields zero hours, no error
    // ==========================================================================
    #[test]
    fn test_tc_005_open_entry_is_zero() {
        let mut e = entry("TC-005", "2025-03-04", "07:00:00", "15:00:00", 0);
        e.end = None;
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);

        assert_eq!(result.worked_hours, Decimal::ZERO);
        assert_eq!(result.buckets, HourBuckets::default());
    }

    // ==========================================================================
    // TC-006: night flag overlaps with overtime
    // ==========================================================================
    #[test]
    fn test_tc_006_night_hours_overlap_with_overtime() {
        let mut e = entry("TC-006", "2025-03-04", "18:00:00", "23:00:00", 0);
        e.end = Some(
            chrono::DateTime::parse_from_rfc3339("2025-03-05T04:00:00+01:00").unwrap(),
        );
        e.flags.night = true;
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);

        assert_eq!(result.buckets.night, dec("10"));
        assert_eq!(result.buckets.regular, dec("7.4"));
        assert_eq!(result.buckets.overtime(), dec("2.6"));
    }

    // ==========================================================================
    // TC-007: irregular (shifted) time counts toward the night bucket
    // ==========================================================================
    #[test]
    fn test_tc_007_irregular_counts_as_night() {
        let mut e = entry("TC-007", "2025-03-04", "04:00:00", "10:00:00", 0);
        e.flags.irregular = true;
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 1);
        assert_eq!(result.buckets.night, dec("6"));
    }

    // ==========================================================================
    // TC-008: Saturday counts as weekend without a flag
    // ==========================================================================
    #[test]
    fn test_tc_008_saturday_is_weekend() {
        let e = entry("TC-008", "2025-03-08", "08:00:00", "12:00:00", 0);
        let result = categorize_day(day("2025-03-08"), &[&e], dec("7.4"), false, 1);
        assert_eq!(result.buckets.weekend, dec("4"));
        assert_eq!(result.buckets.holiday, Decimal::ZERO);
    }

    // ==========================================================================
    // TC-009: public holiday from the period and from the flag
    // ==========================================================================
    #[test]
    fn test_tc_009_holiday_from_period_or_flag() {
        let e = entry("TC-009", "2025-12-25", "08:00:00", "12:00:00", 0);
        let from_period = categorize_day(e.date, &[&e], dec("7.4"), true, 1);
        assert_eq!(from_period.buckets.holiday, dec("4"));

        let mut flagged = entry("TC-009b", "2025-06-05", "08:00:00", "10:00:00", 0);
        flagged.flags.holiday = true;
        let from_flag = categorize_day(flagged.date, &[&flagged], dec("7.4"), false, 1);
        assert_eq!(from_flag.buckets.holiday, dec("2"));
    }

    #[test]
    fn test_split_overtime_negative_input_is_zero() {
        let split = split_overtime(dec("-1"), dec("7.4"));
        assert_eq!(split.regular, Decimal::ZERO);
        assert_eq!(split.tier1, Decimal::ZERO);
        assert_eq!(split.tier2, Decimal::ZERO);
    }

    #[test]
    fn test_buckets_accumulate() {
        let mut total = HourBuckets::default();
        let day = HourBuckets {
            regular: dec("7.4"),
            overtime_tier1: dec("0.6"),
            night: dec("2"),
            ..HourBuckets::default()
        };
        total.accumulate(&day);
        total.accumulate(&day);
        assert_eq!(total.regular, dec("14.8"));
        assert_eq!(total.overtime(), dec("1.2"));
        assert_eq!(total.worked(), dec("16"));
        assert_eq!(total.night, dec("4"));
    }

    #[test]
    fn test_audit_step_records_clause() {
        let e = entry("TC-010", "2025-03-04", "07:00:00", "17:00:00", 0);
        let result = categorize_day(e.date, &[&e], dec("7.4"), false, 4);
        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.clause_ref, WORKING_TIME_CLAUSE);
        assert_eq!(result.audit_step.output["overtime_tier1"], "2.6");
    }
}
