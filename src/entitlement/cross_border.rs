//! Cross-border driving pay.
//!
//! A cross-border week is priced per trip day: a flat day rate, a kilometre
//! rate on the distance beyond the daily minimum (capped), a foreign daily
//! allowance and pass-through of parking and tolls. Fixed-route drivers are
//! guaranteed a weekly minimum; the guarantee tops up earnings, never
//! expenses.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::{apply_guarantee, is_weekend, round_money};
use crate::error::{EngineError, EngineResult};
use crate::models::Employee;
use crate::validation::ValidationResult;

use super::EntitlementCalculator;

/// Cross-border rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossBorderPolicy {
    /// Flat rate for a Monday–Friday trip day.
    pub weekday_day_rate: Decimal,
    /// Flat rate for a Saturday or Sunday trip day.
    pub weekend_day_rate: Decimal,
    /// Rate per kilometre beyond the minimum.
    pub per_km_rate: Decimal,
    /// Kilometres per day included in the day rate.
    pub minimum_km: Decimal,
    /// Kilometres per day paid at most.
    pub max_km_per_day: Decimal,
    /// Allowance per day abroad.
    pub foreign_daily_allowance: Decimal,
    /// Weekly minimum for fixed-route drivers.
    pub weekly_guarantee: Decimal,
    /// Clause citation.
    pub legal_reference: String,
}

impl Default for CrossBorderPolicy {
    fn default() -> Self {
        Self {
            weekday_day_rate: Decimal::new(35000, 2),
            weekend_day_rate: Decimal::new(50000, 2),
            per_km_rate: Decimal::new(125, 2),
            minimum_km: Decimal::from(100),
            max_km_per_day: Decimal::from(800),
            foreign_daily_allowance: Decimal::new(22500, 2),
            weekly_guarantee: Decimal::new(650000, 2),
            legal_reference: "§ 14 Grænseoverskridende kørsel".to_string(),
        }
    }
}

/// One day of a cross-border trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDay {
    /// The trip date.
    pub date: NaiveDate,
    /// Kilometres driven.
    pub kilometres: Decimal,
    /// Whether the day was spent abroad.
    #[serde(default = "default_abroad")]
    pub abroad: bool,
    /// Parking expenses.
    #[serde(default)]
    pub parking: Decimal,
    /// Toll expenses.
    #[serde(default)]
    pub tolls: Decimal,
}

fn default_abroad() -> bool {
    true
}

/// One cross-border week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossBorderRequest {
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Trip days in the week.
    pub trips: Vec<TripDay>,
}

/// Pay for one trip day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDayPay {
    /// The trip date.
    pub date: NaiveDate,
    /// Flat day rate.
    pub day_rate: Decimal,
    /// Kilometres driven.
    pub kilometres: Decimal,
    /// Kilometres paid at the kilometre rate.
    pub paid_km: Decimal,
    /// Kilometre pay.
    pub km_pay: Decimal,
    /// True when the distance exceeded the daily cap.
    pub km_capped: bool,
    /// Foreign daily allowance.
    pub foreign_allowance: Decimal,
    /// Parking and tolls as claimed.
    pub claimed_expenses: Decimal,
    /// Parking and tolls reimbursed.
    pub reimbursed_expenses: Decimal,
    /// Earnings for the day (without expenses).
    pub earnings: Decimal,
}

/// A priced cross-border week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossBorderCalculation {
    /// The driver.
    pub employee_id: String,
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Per-day breakdown in date order.
    pub days: Vec<TripDayPay>,
    /// Sum of day rates.
    pub total_day_rates: Decimal,
    /// Sum of kilometre pay.
    pub total_km_pay: Decimal,
    /// Sum of foreign allowances.
    pub total_foreign_allowance: Decimal,
    /// Earnings before the guarantee.
    pub actual_earnings: Decimal,
    /// Weekly guarantee (zero for variable routes).
    pub weekly_guarantee: Decimal,
    /// Guarantee − earnings when positive.
    pub guarantee_top_up: Decimal,
    /// Earnings after the guarantee.
    pub payable_earnings: Decimal,
    /// Reimbursed parking and tolls.
    pub total_expenses: Decimal,
    /// Payable earnings plus expenses.
    pub total_payment: Decimal,
    /// True when a trip day exceeded the kilometre cap.
    pub has_exceeded_limit: bool,
    /// Trip dates outside the week.
    pub dates_outside_week: Vec<NaiveDate>,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices cross-border weeks.
#[derive(Debug, Clone, Default)]
pub struct CrossBorderCalculator {
    policy: CrossBorderPolicy,
}

impl CrossBorderCalculator {
    /// Creates a calculator with the given rates.
    pub fn new(policy: CrossBorderPolicy) -> Self {
        Self { policy }
    }

    fn price_day(&self, trip: &TripDay) -> TripDayPay {
        let policy = &self.policy;
        let day_rate = if is_weekend(trip.date) {
            policy.weekend_day_rate
        } else {
            policy.weekday_day_rate
        };
        let km_capped = trip.kilometres > policy.max_km_per_day;
        let paid_km = (trip.kilometres.min(policy.max_km_per_day) - policy.minimum_km)
            .max(Decimal::ZERO);
        let km_pay = round_money(paid_km * policy.per_km_rate);
        let foreign_allowance = if trip.abroad {
            policy.foreign_daily_allowance
        } else {
            Decimal::ZERO
        };
        let claimed_expenses = trip.parking + trip.tolls;
        let reimbursed_expenses =
            trip.parking.max(Decimal::ZERO) + trip.tolls.max(Decimal::ZERO);

        TripDayPay {
            date: trip.date,
            day_rate,
            kilometres: trip.kilometres,
            paid_km,
            km_pay,
            km_capped,
            foreign_allowance,
            claimed_expenses,
            reimbursed_expenses,
            earnings: day_rate + km_pay + foreign_allowance,
        }
    }
}

impl EntitlementCalculator for CrossBorderCalculator {
    type Request = CrossBorderRequest;
    type Calculation = CrossBorderCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &CrossBorderRequest,
    ) -> EngineResult<CrossBorderCalculation> {
        if let Some(trip) = request
            .trips
            .iter()
            .find(|trip| !employee.has_valid_license_on(trip.date))
        {
            return Err(EngineError::InvalidEmployee {
                field: "driver_license".to_string(),
                message: format!("no valid driver license on {}", trip.date),
            });
        }

        let week_end = request.week_start + Duration::days(6);
        let mut trips: Vec<&TripDay> = request.trips.iter().collect();
        trips.sort_by_key(|trip| trip.date);

        let days: Vec<TripDayPay> = trips.iter().map(|trip| self.price_day(trip)).collect();
        let dates_outside_week = trips
            .iter()
            .filter(|trip| trip.date < request.week_start || trip.date > week_end)
            .map(|trip| trip.date)
            .collect();

        let total_day_rates: Decimal = days.iter().map(|d| d.day_rate).sum();
        let total_km_pay: Decimal = days.iter().map(|d| d.km_pay).sum();
        let total_foreign_allowance: Decimal = days.iter().map(|d| d.foreign_allowance).sum();
        let total_expenses: Decimal = days.iter().map(|d| d.reimbursed_expenses).sum();
        let actual_earnings = total_day_rates + total_km_pay + total_foreign_allowance;

        let weekly_guarantee = if employee.is_fixed_route() {
            self.policy.weekly_guarantee
        } else {
            Decimal::ZERO
        };
        let guarantee = apply_guarantee(actual_earnings, weekly_guarantee);

        debug!(
            employee_id = %employee.id,
            trip_days = days.len(),
            actual_earnings = %actual_earnings,
            top_up = %guarantee.top_up,
            "Cross-border week priced"
        );

        Ok(CrossBorderCalculation {
            employee_id: employee.id.clone(),
            week_start: request.week_start,
            has_exceeded_limit: days.iter().any(|d| d.km_capped),
            days,
            total_day_rates,
            total_km_pay,
            total_foreign_allowance,
            actual_earnings,
            weekly_guarantee,
            guarantee_top_up: guarantee.top_up,
            payable_earnings: guarantee.payable,
            total_expenses,
            total_payment: guarantee.payable + total_expenses,
            dates_outside_week,
            legal_reference: self.policy.legal_reference.clone(),
        })
    }

    fn validate(
        &self,
        _employee: &Employee,
        calculation: &CrossBorderCalculation,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        for day in &calculation.days {
            if day.claimed_expenses != day.reimbursed_expenses {
                result.push_error(
                    "CROSS_BORDER_NEGATIVE_EXPENSE",
                    format!("negative parking or toll amount on {}", day.date),
                );
            }
            if day.km_capped {
                result.push_warning(
                    "CROSS_BORDER_KM_CAP_EXCEEDED",
                    format!(
                        "{} km driven on {}, {} km paid",
                        day.kilometres.normalize(),
                        day.date,
                        self.policy.max_km_per_day.normalize()
                    ),
                );
            }
        }
        for date in &calculation.dates_outside_week {
            result.push_error(
                "CROSS_BORDER_DATE_OUTSIDE_WEEK",
                format!("trip on {} is outside the week starting {}", date, calculation.week_start),
            );
        }

        result
    }
}
