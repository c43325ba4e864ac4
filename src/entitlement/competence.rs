//! Competence development and child care days.
//!
//! Each absence type has a yearly cap of paid work days. Usage is read from
//! the supplied absence history: calendar-year caps count days from 1 January,
//! the child hospitalization cap counts the twelve months ending on the first
//! requested day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{
    ensure_range, overlap_days, rolling_year_start, round_money, work_days, year_end, year_start,
};
use crate::config::AgreementBook;
use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceEntry, AbsenceType, Employee};
use crate::validation::ValidationResult;

use super::{AbsenceCalculation, EntitlementCalculator, overlapping_absences, resolve_wage};

/// How usage is counted for a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitWindow {
    /// 1 January to 31 December.
    CalendarYear,
    /// The twelve months ending on the first requested day.
    RollingTwelveMonths,
}

/// Caps and rules for competence development and care days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetencePolicy {
    /// Self-selected education days per year.
    pub self_selected_education_days: u32,
    /// Agreed education days per year.
    pub agreed_education_days: u32,
    /// Child care days per year.
    pub child_care_days: u32,
    /// Grandchild care days per year.
    pub grandchild_care_days: u32,
    /// Child hospitalization days per rolling twelve months.
    pub child_hospitalization_days: u32,
    /// Notice required for self-selected education, in days.
    pub self_selected_notice_days: i64,
    /// Paid hours per day.
    pub hours_per_day: Decimal,
    /// Clause citation for education.
    pub education_reference: String,
    /// Clause citation for care days.
    pub care_reference: String,
}

impl Default for CompetencePolicy {
    fn default() -> Self {
        Self {
            self_selected_education_days: 5,
            agreed_education_days: 10,
            child_care_days: 2,
            grandchild_care_days: 2,
            child_hospitalization_days: 7,
            self_selected_notice_days: 14,
            hours_per_day: Decimal::new(74, 1),
            education_reference: "§ 19 Kompetenceudvikling".to_string(),
            care_reference: "§ 18 Barns sygdom og omsorgsdage".to_string(),
        }
    }
}

impl CompetencePolicy {
    /// The cap and counting window for an absence type, `None` if not handled here.
    pub fn limit_for(&self, absence_type: AbsenceType) -> Option<(u32, LimitWindow)> {
        match absence_type {
            AbsenceType::SelfSelectedEducation => {
                Some((self.self_selected_education_days, LimitWindow::CalendarYear))
            }
            AbsenceType::AgreedEducation => {
                Some((self.agreed_education_days, LimitWindow::CalendarYear))
            }
            AbsenceType::ChildCare => Some((self.child_care_days, LimitWindow::CalendarYear)),
            AbsenceType::GrandchildCare => {
                Some((self.grandchild_care_days, LimitWindow::CalendarYear))
            }
            AbsenceType::ChildHospitalization => Some((
                self.child_hospitalization_days,
                LimitWindow::RollingTwelveMonths,
            )),
            _ => None,
        }
    }

    fn reference_for(&self, absence_type: AbsenceType) -> &str {
        match absence_type {
            AbsenceType::SelfSelectedEducation | AbsenceType::AgreedEducation => {
                &self.education_reference
            }
            _ => &self.care_reference,
        }
    }
}

/// A competence development or care absence to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetenceRequest {
    /// The absence type.
    pub absence_type: AbsenceType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// When the request was made.
    pub requested_on: NaiveDate,
    /// Absence history used for usage and overlap checks.
    #[serde(default)]
    pub existing_absences: Vec<AbsenceEntry>,
}

/// A priced competence development or care absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetenceCalculation {
    /// The employee.
    pub employee_id: String,
    /// The agreement version the wage came from.
    pub agreement_id: String,
    /// The absence type.
    pub absence_type: AbsenceType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Work days requested.
    pub requested_days: i64,
    /// Cap for the window.
    pub annual_limit: u32,
    /// How usage is counted.
    pub window: LimitWindow,
    /// First day of the counting window.
    pub window_start: NaiveDate,
    /// Days already used, summed over each calendar year the request touches.
    pub used_days: i64,
    /// Days left before this request, summed the same way.
    pub remaining_days: i64,
    /// Work days paid.
    pub payable_days: i64,
    /// True when more days were requested than remain.
    pub has_exceeded_limit: bool,
    /// Days between the request and the first day.
    pub notice_days: i64,
    /// Wage per hour used for pay.
    pub effective_hourly_wage: Decimal,
    /// Total pay.
    pub payment_amount: Decimal,
    /// Existing absences sharing a day with this one.
    pub overlapping_absences: Vec<Uuid>,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices competence development and care days.
#[derive(Debug, Clone)]
pub struct CompetenceCalculator {
    agreements: AgreementBook,
    policy: CompetencePolicy,
}

impl CompetenceCalculator {
    /// Creates a calculator over the given agreements and policy.
    pub fn new(agreements: AgreementBook, policy: CompetencePolicy) -> Self {
        Self { agreements, policy }
    }

    fn used_days(
        employee: &Employee,
        history: &[AbsenceEntry],
        absence_type: AbsenceType,
        window: (NaiveDate, NaiveDate),
    ) -> i64 {
        history
            .iter()
            .filter(|a| a.employee_id == employee.id && a.absence_type == absence_type)
            .map(|a| {
                overlap_days(
                    (a.start_date, a.effective_end(window.1)),
                    window,
                    work_days,
                )
            })
            .sum()
    }

    fn window_start(window: LimitWindow, date: NaiveDate) -> NaiveDate {
        match window {
            LimitWindow::CalendarYear => year_start(date),
            LimitWindow::RollingTwelveMonths => rolling_year_start(date),
        }
    }
}

impl EntitlementCalculator for CompetenceCalculator {
    type Request = CompetenceRequest;
    type Calculation = CompetenceCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &CompetenceRequest,
    ) -> EngineResult<CompetenceCalculation> {
        let (annual_limit, window) =
            self.policy
                .limit_for(request.absence_type)
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!(
                        "{} is not a competence development or care absence",
                        request.absence_type
                    ),
                })?;
        ensure_range(request.start_date, request.end_date)?;
        let wage = resolve_wage(employee, &self.agreements, request.start_date)?;

        // calendar-year caps are charged per year the request touches
        let mut segments = Vec::new();
        let mut segment_start = request.start_date;
        loop {
            let segment_end = match window {
                LimitWindow::CalendarYear => year_end(segment_start).min(request.end_date),
                LimitWindow::RollingTwelveMonths => request.end_date,
            };
            segments.push((segment_start, segment_end));
            match segment_end.succ_opt() {
                Some(next) if segment_end < request.end_date => segment_start = next,
                _ => break,
            }
        }

        let window_start = Self::window_start(window, request.start_date);
        let mut used_days = 0;
        let mut remaining_days = 0;
        let mut payable_days = 0;
        for (segment_start, segment_end) in segments {
            // usage is counted before the segment starts
            let usage_end = segment_start.pred_opt().unwrap_or(segment_start);
            let used = Self::used_days(
                employee,
                &request.existing_absences,
                request.absence_type,
                (Self::window_start(window, segment_start), usage_end),
            );
            let remaining = (i64::from(annual_limit) - used).max(0);
            used_days += used;
            remaining_days += remaining;
            payable_days += work_days(segment_start, segment_end).min(remaining);
        }

        let requested_days = work_days(request.start_date, request.end_date);
        let daily_pay = round_money(wage.effective_hourly_wage * self.policy.hours_per_day);

        Ok(CompetenceCalculation {
            employee_id: employee.id.clone(),
            agreement_id: wage.agreement_id,
            absence_type: request.absence_type,
            start_date: request.start_date,
            end_date: request.end_date,
            requested_days,
            annual_limit,
            window,
            window_start,
            used_days,
            remaining_days,
            payable_days,
            has_exceeded_limit: requested_days > payable_days,
            notice_days: (request.start_date - request.requested_on).num_days(),
            effective_hourly_wage: wage.effective_hourly_wage,
            payment_amount: round_money(daily_pay * Decimal::from(payable_days)),
            overlapping_absences: overlapping_absences(
                employee,
                &request.existing_absences,
                request.start_date,
                request.end_date,
            ),
            legal_reference: self.policy.reference_for(request.absence_type).to_string(),
        })
    }

    fn validate(
        &self,
        _employee: &Employee,
        calculation: &CompetenceCalculation,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        if calculation.absence_type == AbsenceType::SelfSelectedEducation
            && calculation.notice_days < self.policy.self_selected_notice_days
        {
            result.push_error(
                "EDUCATION_NOTICE_TOO_SHORT",
                format!(
                    "requested {} days ahead, {} days' notice required",
                    calculation.notice_days, self.policy.self_selected_notice_days
                ),
            );
        }
        if !calculation.overlapping_absences.is_empty() {
            result.push_error(
                "ABSENCE_OVERLAP",
                format!(
                    "{} overlaps {} recorded absence(s)",
                    calculation.absence_type,
                    calculation.overlapping_absences.len()
                ),
            );
        }
        if calculation.has_exceeded_limit {
            result.push_warning(
                "ABSENCE_LIMIT_EXCEEDED",
                format!(
                    "{} days requested, {} of {} left; {} paid",
                    calculation.requested_days,
                    calculation.remaining_days,
                    calculation.annual_limit,
                    calculation.payable_days
                ),
            );
        }

        result
    }
}

impl AbsenceCalculation for CompetenceCalculation {
    fn absence_type(&self) -> AbsenceType {
        self.absence_type
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> Option<NaiveDate> {
        Some(self.end_date)
    }

    fn counted_days(&self) -> Decimal {
        Decimal::from(self.payable_days)
    }

    fn payment_amount(&self) -> Decimal {
        self.payment_amount
    }

    fn legal_reference(&self) -> &str {
        &self.legal_reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{absence, driver, transport_agreement};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculator() -> CompetenceCalculator {
        CompetenceCalculator::new(
            AgreementBook::new(vec![transport_agreement()]).unwrap(),
            CompetencePolicy::default(),
        )
    }

    fn request(
        absence_type: AbsenceType,
        start: NaiveDate,
        end: NaiveDate,
        history: Vec<AbsenceEntry>,
    ) -> CompetenceRequest {
        CompetenceRequest {
            absence_type,
            start_date: start,
            end_date: end,
            requested_on: date(2025, 1, 2),
            existing_absences: history,
        }
    }

    /// CD-001: first child care day of the year
    #[test]
    fn test_cd_001_child_care_day() {
        let calculation = calculator()
            .calculate(
                &driver(),
                &request(AbsenceType::ChildCare, date(2025, 3, 4), date(2025, 3, 4), Vec::new()),
            )
            .unwrap();

        assert_eq!(calculation.used_days, 0);
        assert_eq!(calculation.payable_days, 1);
        assert_eq!(calculation.payment_amount, dec("1313.50"));
        assert_eq!(calculation.legal_reference, "§ 18 Barns sygdom og omsorgsdage");
    }

    /// CD-002: third child care day in a year is not paid
    #[test]
    fn test_cd_002_child_care_cap() {
        let history = vec![absence(
            AbsenceType::ChildCare,
            date(2025, 2, 3),
            Some(date(2025, 2, 4)),
            2,
        )];
        let calc = calculator();
        let calculation = calc
            .calculate(
                &driver(),
                &request(AbsenceType::ChildCare, date(2025, 3, 4), date(2025, 3, 4), history),
            )
            .unwrap();

        assert_eq!(calculation.used_days, 2);
        assert_eq!(calculation.payable_days, 0);
        assert!(calculation.has_exceeded_limit);
        assert_eq!(calculation.payment_amount, Decimal::ZERO);
        assert!(calc
            .validate(&driver(), &calculation)
            .has_warning("ABSENCE_LIMIT_EXCEEDED"));
    }

    /// CD-003: last year's days do not count against a calendar-year cap
    #[test]
    fn test_cd_003_previous_year_ignored() {
        let history = vec![absence(
            AbsenceType::ChildCare,
            date(2025, 12, 30),
            Some(date(2025, 12, 31)),
            2,
        )];
        let calculation = calculator()
            .calculate(
                &driver(),
                &request(AbsenceType::ChildCare, date(2026, 1, 5), date(2026, 1, 5), history),
            )
            .unwrap();
        assert_eq!(calculation.used_days, 0);
        assert_eq!(calculation.payable_days, 1);
    }

    /// CD-007: days after new year draw on the new year's cap
    #[test]
    fn test_cd_007_request_across_new_year() {
        let history = vec![absence(
            AbsenceType::ChildCare,
            date(2025, 3, 4),
            Some(date(2025, 3, 5)),
            2,
        )];
        let calculation = calculator()
            .calculate(
                &driver(),
                &request(AbsenceType::ChildCare, date(2025, 12, 31), date(2026, 1, 2), history),
            )
            .unwrap();

        assert_eq!(calculation.requested_days, 3);
        assert_eq!(calculation.used_days, 2);
        assert_eq!(calculation.remaining_days, 2);
        assert_eq!(calculation.payable_days, 2);
        assert!(calculation.has_exceeded_limit);
        assert_eq!(calculation.window_start, date(2025, 1, 1));
        assert_eq!(calculation.payment_amount, dec("2627.00"));
    }

    /// CD-004: child hospitalization counts the rolling twelve months
    #[test]
    fn test_cd_004_hospitalization_rolling_window() {
        let history = vec![absence(
            AbsenceType::ChildHospitalization,
            date(2024, 9, 2),
            Some(date(2024, 9, 6)),
            5,
        )];
        let calculation = calculator()
            .calculate(
                &driver(),
                &request(
                    AbsenceType::ChildHospitalization,
                    date(2025, 3, 3),
                    date(2025, 3, 7),
                    history,
                ),
            )
            .unwrap();

        assert_eq!(calculation.window, LimitWindow::RollingTwelveMonths);
        assert_eq!(calculation.used_days, 5);
        assert_eq!(calculation.remaining_days, 2);
        assert_eq!(calculation.payable_days, 2);
    }

    /// CD-005: self-selected education needs 14 days' notice
    #[test]
    fn test_cd_005_education_notice() {
        let calc = calculator();
        let mut req = request(
            AbsenceType::SelfSelectedEducation,
            date(2025, 3, 10),
            date(2025, 3, 12),
            Vec::new(),
        );
        req.requested_on = date(2025, 3, 1);
        let calculation = calc.calculate(&driver(), &req).unwrap();
        assert_eq!(calculation.notice_days, 9);
        assert!(calc
            .validate(&driver(), &calculation)
            .has_error("EDUCATION_NOTICE_TOO_SHORT"));

        req.requested_on = date(2025, 2, 24);
        let calculation = calc.calculate(&driver(), &req).unwrap();
        assert!(calc.validate(&driver(), &calculation).is_valid);
    }

    /// CD-006: overlap with recorded sickness
    #[test]
    fn test_cd_006_overlap() {
        let history = vec![absence(
            AbsenceType::Sickness,
            date(2025, 3, 3),
            Some(date(2025, 3, 5)),
            3,
        )];
        let calc = calculator();
        let calculation = calc
            .calculate(
                &driver(),
                &request(AbsenceType::AgreedEducation, date(2025, 3, 5), date(2025, 3, 6), history),
            )
            .unwrap();
        assert!(calc.validate(&driver(), &calculation).has_error("ABSENCE_OVERLAP"));
    }

    #[test]
    fn test_sickness_is_not_a_competence_absence() {
        let result = calculator().calculate(
            &driver(),
            &request(AbsenceType::Sickness, date(2025, 3, 4), date(2025, 3, 4), Vec::new()),
        );
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
