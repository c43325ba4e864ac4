//! Calculation logic for the pay engine.
//!
//! This module contains the payroll pipeline: money and calendar helpers,
//! per-day time categorization into regular/overtime/premium buckets,
//! hourly allowance composition, the payroll aggregator and the parallel
//! batch runner.

pub mod batch;
mod allowance_composer;
mod dates;
mod money;
mod payroll_aggregator;
mod time_categorizer;

pub use allowance_composer::{
    ALLOWANCE_CLAUSE, AllowanceBundle, AllowanceKind, AllowanceLine, CityZone, YOUTH_CLAUSE,
    city_zone, compose_allowances, seniority_allowance, youth_percentage,
    youth_percentage_for_age,
};
pub use batch::{BatchOutcome, calculate_batch};
pub use dates::{
    calendar_days, days_in, ensure_range, is_weekend, overlap_days, rolling_year_start,
    work_days, year_end, year_start,
};
pub use money::{GuaranteeOutcome, HUNDRED, apply_guarantee, percent_of, round_money};
pub use payroll_aggregator::{
    BASE_WAGE_CLAUSE, ENGINE_VERSION, HOLIDAY_CLAUSE, NIGHT_CLAUSE, OVERTIME_CLAUSE,
    PENSION_CLAUSE, SPECIAL_ALLOWANCE_CLAUSE, VACATION_CLAUSE, WEEKEND_CLAUSE,
    calculate_payroll,
};
pub use time_categorizer::{
    DayCategorization, HourBuckets, OVERTIME_TIER1_MAX_HOURS, OvertimeSplit,
    WORKING_TIME_CLAUSE, categorize_day, split_overtime,
};
