//! Sickness pay.
//!
//! Sickness is counted both in work days (Monday to Friday, which determine
//! pay) and calendar days (which determine the duration limit and whether a
//! doctor's note is needed). The maximum paid period is date-versioned and is
//! resolved from the first day of sickness.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{calendar_days, ensure_range, percent_of, round_money, work_days};
use crate::config::AgreementBook;
use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceEntry, AbsenceType, Employee};
use crate::validation::ValidationResult;

use super::rules::{DatedRule, RuleTimeline};
use super::{AbsenceCalculation, EntitlementCalculator, overlapping_absences, resolve_wage};

/// Sickness rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SicknessPolicy {
    /// Maximum paid weeks by first day of sickness.
    pub max_paid_weeks: RuleTimeline<u32>,
    /// Longest absence that may be self-certified, in calendar days.
    pub self_certification_days: i64,
    /// Paid hours per sick work day.
    pub hours_per_day: Decimal,
    /// Pension contribution percentage on sick pay.
    pub pension_percent: Decimal,
    /// Vacation accrual percentage on sick pay.
    pub vacation_percent: Decimal,
    /// Clause citation.
    pub legal_reference: String,
}

impl Default for SicknessPolicy {
    fn default() -> Self {
        Self {
            max_paid_weeks: RuleTimeline::new(vec![
                DatedRule {
                    effective_from: NaiveDate::MIN,
                    value: 9,
                },
                DatedRule {
                    effective_from: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap_or(NaiveDate::MIN),
                    value: 11,
                },
            ]),
            self_certification_days: 3,
            hours_per_day: Decimal::new(74, 1),
            pension_percent: Decimal::from(11),
            vacation_percent: Decimal::new(125, 1),
            legal_reference: "§ 16 Sygdom".to_string(),
        }
    }
}

/// A sickness period to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SicknessRequest {
    /// First day of sickness.
    pub first_day: NaiveDate,
    /// Last day of sickness; `None` while the employee is still sick.
    #[serde(default)]
    pub last_day: Option<NaiveDate>,
    /// Counting date for ongoing sickness.
    pub as_of: NaiveDate,
    /// Whether a doctor's note was supplied.
    #[serde(default)]
    pub doctor_note: bool,
    /// Absences already on record, for overlap detection.
    #[serde(default)]
    pub existing_absences: Vec<AbsenceEntry>,
}

/// Priced sickness period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SicknessCalculation {
    /// The sick employee.
    pub employee_id: String,
    /// The agreement version the wage came from.
    pub agreement_id: String,
    /// First day of sickness.
    pub first_day: NaiveDate,
    /// Last day of sickness, if known.
    pub last_day: Option<NaiveDate>,
    /// Last day counted (the last day, or the as-of date while ongoing).
    pub counted_through: NaiveDate,
    /// Monday–Friday days in the counted range.
    pub work_days: i64,
    /// Calendar days in the counted range.
    pub calendar_days: i64,
    /// Maximum paid weeks in force on the first day.
    pub max_paid_weeks: u32,
    /// Work days paid after the limit.
    pub payable_work_days: i64,
    /// True when the calendar days exceed the paid period.
    pub has_exceeded_limit: bool,
    /// True when the absence is too long to self-certify.
    pub requires_doctor_note: bool,
    /// Whether a doctor's note was supplied.
    pub doctor_note_provided: bool,
    /// Wage per hour used for pay.
    pub effective_hourly_wage: Decimal,
    /// Pay per sick work day.
    pub daily_pay: Decimal,
    /// Total sick pay.
    pub payment_amount: Decimal,
    /// Pension contribution on sick pay.
    pub pension_contribution: Decimal,
    /// Vacation accrual on sick pay.
    pub vacation_accrual: Decimal,
    /// Existing absences sharing a day with this one.
    pub overlapping_absences: Vec<Uuid>,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices sickness absences.
#[derive(Debug, Clone)]
pub struct SicknessCalculator {
    agreements: AgreementBook,
    policy: SicknessPolicy,
}

impl SicknessCalculator {
    /// Creates a calculator over the given agreements and policy.
    pub fn new(agreements: AgreementBook, policy: SicknessPolicy) -> Self {
        Self { agreements, policy }
    }

    /// Closes an open sickness absence on `last_day`, recomputing its days and pay.
    pub fn end_absence(
        &self,
        employee: &Employee,
        absence: &AbsenceEntry,
        last_day: NaiveDate,
    ) -> EngineResult<AbsenceEntry> {
        if absence.employee_id != employee.id {
            return Err(EngineError::InvalidEmployee {
                field: "id".to_string(),
                message: format!(
                    "absence {} belongs to {}, not {}",
                    absence.id, absence.employee_id, employee.id
                ),
            });
        }
        if absence.absence_type != AbsenceType::Sickness {
            return Err(EngineError::CalculationError {
                message: format!("absence {} is {}, not sickness", absence.id, absence.absence_type),
            });
        }
        let request = SicknessRequest {
            first_day: absence.start_date,
            last_day: Some(last_day),
            as_of: last_day,
            doctor_note: true,
            existing_absences: Vec::new(),
        };
        let calculation = self.calculate(employee, &request)?;
        absence.close(
            last_day,
            Decimal::from(calculation.payable_work_days),
            calculation.payment_amount,
        )
    }
}

impl EntitlementCalculator for SicknessCalculator {
    type Request = SicknessRequest;
    type Calculation = SicknessCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &SicknessRequest,
    ) -> EngineResult<SicknessCalculation> {
        if request.first_day < employee.employment_date {
            return Err(EngineError::InvalidEmployee {
                field: "employment_date".to_string(),
                message: format!(
                    "sickness starting {} precedes employment on {}",
                    request.first_day, employee.employment_date
                ),
            });
        }
        let counted_through = request.last_day.unwrap_or(request.as_of);
        ensure_range(request.first_day, counted_through)?;

        let max_paid_weeks = *self
            .policy
            .max_paid_weeks
            .value_on(request.first_day)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no sickness period rule in force on {}", request.first_day),
            })?;

        let wage = resolve_wage(employee, &self.agreements, request.first_day)?;

        let work = work_days(request.first_day, counted_through);
        let calendar = calendar_days(request.first_day, counted_through);
        let weeks = i64::from(max_paid_weeks);
        let has_exceeded_limit = calendar > weeks * 7;
        let payable_work_days = work.min(weeks * 5);

        let daily_pay = round_money(wage.effective_hourly_wage * self.policy.hours_per_day);
        let payment_amount = round_money(daily_pay * Decimal::from(payable_work_days));

        debug!(
            employee_id = %employee.id,
            work_days = work,
            calendar_days = calendar,
            max_paid_weeks = max_paid_weeks,
            "Sickness period counted"
        );

        Ok(SicknessCalculation {
            employee_id: employee.id.clone(),
            agreement_id: wage.agreement_id,
            first_day: request.first_day,
            last_day: request.last_day,
            counted_through,
            work_days: work,
            calendar_days: calendar,
            max_paid_weeks,
            payable_work_days,
            has_exceeded_limit,
            requires_doctor_note: calendar > self.policy.self_certification_days,
            doctor_note_provided: request.doctor_note,
            effective_hourly_wage: wage.effective_hourly_wage,
            daily_pay,
            payment_amount,
            pension_contribution: percent_of(payment_amount, self.policy.pension_percent),
            vacation_accrual: percent_of(payment_amount, self.policy.vacation_percent),
            overlapping_absences: overlapping_absences(
                employee,
                &request.existing_absences,
                request.first_day,
                counted_through,
            ),
            legal_reference: self.policy.legal_reference.clone(),
        })
    }

    fn validate(&self, _employee: &Employee, calculation: &SicknessCalculation) -> ValidationResult {
        let mut result = ValidationResult::new();

        if calculation.requires_doctor_note && !calculation.doctor_note_provided {
            result.push_error(
                "SICKNESS_DOCTOR_NOTE_REQUIRED",
                format!(
                    "{} calendar days of sickness exceed the {} day self-certification limit",
                    calculation.calendar_days, self.policy.self_certification_days
                ),
            );
        }
        if calculation.has_exceeded_limit {
            result.push_warning(
                "SICKNESS_PERIOD_EXCEEDED",
                format!(
                    "{} calendar days exceed the {} week paid period; {} of {} work days paid",
                    calculation.calendar_days,
                    calculation.max_paid_weeks,
                    calculation.payable_work_days,
                    calculation.work_days
                ),
            );
        }
        if !calculation.overlapping_absences.is_empty() {
            result.push_error(
                "ABSENCE_OVERLAP",
                format!(
                    "sickness overlaps {} recorded absence(s)",
                    calculation.overlapping_absences.len()
                ),
            );
        }
        if calculation.last_day.is_none() {
            result.push_warning(
                "SICKNESS_ONGOING",
                format!("sickness still open, counted through {}", calculation.counted_through),
            );
        }

        result
    }
}

impl AbsenceCalculation for SicknessCalculation {
    fn absence_type(&self) -> AbsenceType {
        AbsenceType::Sickness
    }

    fn start_date(&self) -> NaiveDate {
        self.first_day
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.last_day
    }

    fn counted_days(&self) -> Decimal {
        Decimal::from(self.payable_work_days)
    }

    fn payment_amount(&self) -> Decimal {
        self.payment_amount
    }

    fn legal_reference(&self) -> &str {
        &self.legal_reference
    }
}
