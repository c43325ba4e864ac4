//! Parental leave pay.
//!
//! Leave is counted in calendar days. The birthing parent's leave is split
//! around the expected due date: up to 4 weeks before it and 14 weeks from it.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{calendar_days, ensure_range, percent_of, round_money};
use crate::config::AgreementBook;
use crate::error::EngineResult;
use crate::models::{AbsenceEntry, AbsenceType, Employee};
use crate::validation::ValidationResult;

use super::{AbsenceCalculation, EntitlementCalculator, overlapping_absences, resolve_wage};

/// The kind of parental leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentalLeaveType {
    /// Maternity leave of the birthing parent.
    BirthingParent,
    /// Leave of the other parent around the birth.
    NonBirthingParent,
    /// Leave of a social (co-)parent.
    SocialParent,
    /// Pregnancy-related absence.
    PregnancyRelated,
}

impl ParentalLeaveType {
    /// The absence type recorded for this leave.
    pub fn absence_type(self) -> AbsenceType {
        match self {
            ParentalLeaveType::BirthingParent => AbsenceType::BirthingParent,
            ParentalLeaveType::NonBirthingParent => AbsenceType::NonBirthingParent,
            ParentalLeaveType::SocialParent => AbsenceType::SocialParent,
            ParentalLeaveType::PregnancyRelated => AbsenceType::PregnancyRelated,
        }
    }
}

/// Paid parental leave entitlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentalPolicy {
    /// Total paid weeks for the birthing parent.
    pub birthing_parent_weeks: u32,
    /// Weeks the birthing parent may take before the due date.
    pub pre_birth_weeks: u32,
    /// Weeks the birthing parent may take from the due date.
    pub post_birth_weeks: u32,
    /// Paid weeks for the non-birthing parent.
    pub non_birthing_parent_weeks: u32,
    /// Paid weeks for a social parent.
    pub social_parent_weeks: u32,
    /// Paid weeks of pregnancy-related absence.
    pub pregnancy_related_weeks: u32,
    /// Pension percentage during parental leave.
    pub pension_percent: Decimal,
    /// Ordinary pension percentage; the difference is the enhanced benefit.
    pub standard_pension_percent: Decimal,
    /// Months of notice expected before the due date.
    pub notice_months: u32,
    /// Clause citation.
    pub legal_reference: String,
}

impl Default for ParentalPolicy {
    fn default() -> Self {
        Self {
            birthing_parent_weeks: 18,
            pre_birth_weeks: 4,
            post_birth_weeks: 14,
            non_birthing_parent_weeks: 2,
            social_parent_weeks: 2,
            pregnancy_related_weeks: 12,
            pension_percent: Decimal::new(135, 1),
            standard_pension_percent: Decimal::from(11),
            notice_months: 3,
            legal_reference: "§ 17 Barsel".to_string(),
        }
    }
}

impl ParentalPolicy {
    /// Paid weeks for a leave type.
    pub fn entitled_weeks(&self, leave_type: ParentalLeaveType) -> u32 {
        match leave_type {
            ParentalLeaveType::BirthingParent => self.birthing_parent_weeks,
            ParentalLeaveType::NonBirthingParent => self.non_birthing_parent_weeks,
            ParentalLeaveType::SocialParent => self.social_parent_weeks,
            ParentalLeaveType::PregnancyRelated => self.pregnancy_related_weeks,
        }
    }
}

/// A parental leave period to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentalRequest {
    /// The kind of leave.
    pub leave_type: ParentalLeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Expected due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// When the employer was notified.
    pub notified_on: NaiveDate,
    /// Absences already on record, for overlap detection.
    #[serde(default)]
    pub existing_absences: Vec<AbsenceEntry>,
}

/// Priced parental leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentalCalculation {
    /// The employee on leave.
    pub employee_id: String,
    /// The agreement version the wage came from.
    pub agreement_id: String,
    /// The kind of leave.
    pub leave_type: ParentalLeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Expected due date, if given.
    pub due_date: Option<NaiveDate>,
    /// Calendar days requested.
    pub requested_days: i64,
    /// Paid weeks for the leave type.
    pub entitled_weeks: u32,
    /// Calendar days paid.
    pub payable_days: i64,
    /// True when more days were requested than are paid, in total or on
    /// either side of the due date.
    pub has_exceeded_limit: bool,
    /// Requested days before the due date (birthing parent).
    pub pre_birth_days: i64,
    /// Requested days from the due date (birthing parent).
    pub post_birth_days: i64,
    /// True when more than the pre-birth weeks fall before the due date.
    pub pre_birth_exceeded: bool,
    /// True when more than the post-birth weeks fall from the due date.
    pub post_birth_exceeded: bool,
    /// Wage per hour used for pay.
    pub effective_hourly_wage: Decimal,
    /// Effective wage × weekly hours / 7.
    pub daily_pay: Decimal,
    /// Total leave pay.
    pub payment_amount: Decimal,
    /// Pension contribution at the parental leave rate.
    pub pension_contribution: Decimal,
    /// Part of the pension contribution above the ordinary rate.
    pub enhanced_pension_benefit: Decimal,
    /// Days between notification and the due date.
    pub notice_days: Option<i64>,
    /// True when notification came later than the notice period.
    pub late_notification: bool,
    /// Existing absences sharing a day with this one.
    pub overlapping_absences: Vec<Uuid>,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices parental leave.
#[derive(Debug, Clone)]
pub struct ParentalCalculator {
    agreements: AgreementBook,
    policy: ParentalPolicy,
}

impl ParentalCalculator {
    /// Creates a calculator over the given agreements and policy.
    pub fn new(agreements: AgreementBook, policy: ParentalPolicy) -> Self {
        Self { agreements, policy }
    }
}

impl EntitlementCalculator for ParentalCalculator {
    type Request = ParentalRequest;
    type Calculation = ParentalCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &ParentalRequest,
    ) -> EngineResult<ParentalCalculation> {
        ensure_range(request.start_date, request.end_date)?;
        let wage = resolve_wage(employee, &self.agreements, request.start_date)?;

        let requested_days = calendar_days(request.start_date, request.end_date);
        let entitled_weeks = self.policy.entitled_weeks(request.leave_type);
        let entitled_days = i64::from(entitled_weeks) * 7;
        let pre_birth_limit = i64::from(self.policy.pre_birth_weeks) * 7;
        let post_birth_limit = i64::from(self.policy.post_birth_weeks) * 7;

        let (pre_birth_days, post_birth_days) = match (request.leave_type, request.due_date) {
            (ParentalLeaveType::BirthingParent, Some(due)) => {
                let pre_end = due.pred_opt().unwrap_or(due);
                (
                    calendar_days(request.start_date, request.end_date.min(pre_end)),
                    calendar_days(request.start_date.max(due), request.end_date),
                )
            }
            _ => (0, 0),
        };

        // each side of the due date is paid up to its own share
        let payable_days = match (request.leave_type, request.due_date) {
            (ParentalLeaveType::BirthingParent, Some(_)) => {
                let split = pre_birth_days.min(pre_birth_limit)
                    + post_birth_days.min(post_birth_limit);
                split.min(entitled_days)
            }
            _ => requested_days.min(entitled_days),
        };

        let notice_days = request
            .due_date
            .map(|due| (due - request.notified_on).num_days());
        let late_notification = request.due_date.is_some_and(|due| {
            due.checked_sub_months(Months::new(self.policy.notice_months))
                .is_some_and(|deadline| request.notified_on > deadline)
        });

        let daily_pay = wage.effective_hourly_wage * wage.weekly_hours / Decimal::from(7);
        let payment_amount = round_money(daily_pay * Decimal::from(payable_days));
        let enhancement = self.policy.pension_percent - self.policy.standard_pension_percent;

        Ok(ParentalCalculation {
            employee_id: employee.id.clone(),
            agreement_id: wage.agreement_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            due_date: request.due_date,
            requested_days,
            entitled_weeks,
            payable_days,
            has_exceeded_limit: requested_days > payable_days,
            pre_birth_days,
            post_birth_days,
            pre_birth_exceeded: pre_birth_days > pre_birth_limit,
            post_birth_exceeded: post_birth_days > post_birth_limit,
            effective_hourly_wage: wage.effective_hourly_wage,
            daily_pay: round_money(daily_pay),
            payment_amount,
            pension_contribution: percent_of(payment_amount, self.policy.pension_percent),
            enhanced_pension_benefit: percent_of(payment_amount, enhancement.max(Decimal::ZERO)),
            notice_days,
            late_notification,
            overlapping_absences: overlapping_absences(
                employee,
                &request.existing_absences,
                request.start_date,
                request.end_date,
            ),
            legal_reference: self.policy.legal_reference.clone(),
        })
    }

    fn validate(&self, _employee: &Employee, calculation: &ParentalCalculation) -> ValidationResult {
        let mut result = ValidationResult::new();

        if calculation.leave_type == ParentalLeaveType::BirthingParent
            && calculation.due_date.is_none()
        {
            result.push_error(
                "PARENTAL_DUE_DATE_REQUIRED",
                "birthing parent leave needs the expected due date",
            );
        }
        if !calculation.overlapping_absences.is_empty() {
            result.push_error(
                "ABSENCE_OVERLAP",
                format!(
                    "parental leave overlaps {} recorded absence(s)",
                    calculation.overlapping_absences.len()
                ),
            );
        }
        if calculation.has_exceeded_limit {
            result.push_warning(
                "PARENTAL_LIMIT_EXCEEDED",
                format!(
                    "{} days requested, {} weeks ({} days) paid",
                    calculation.requested_days, calculation.entitled_weeks, calculation.payable_days
                ),
            );
        }
        if calculation.pre_birth_exceeded {
            result.push_warning(
                "PARENTAL_PRE_BIRTH_EXCEEDED",
                format!(
                    "{} days before the due date, at most {} weeks are pre-birth leave",
                    calculation.pre_birth_days, self.policy.pre_birth_weeks
                ),
            );
        }
        if calculation.post_birth_exceeded {
            result.push_warning(
                "PARENTAL_POST_BIRTH_EXCEEDED",
                format!(
                    "{} days from the due date, at most {} weeks are post-birth leave",
                    calculation.post_birth_days, self.policy.post_birth_weeks
                ),
            );
        }
        if calculation.late_notification {
            result.push_warning(
                "PARENTAL_LATE_NOTIFICATION",
                format!(
                    "employer notified {} days before the due date, {} months expected",
                    calculation.notice_days.unwrap_or_default(),
                    self.policy.notice_months
                ),
            );
        }

        result
    }
}

impl AbsenceCalculation for ParentalCalculation {
    fn absence_type(&self) -> AbsenceType {
        self.leave_type.absence_type()
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

    fn calculator() -> ParentalCalculator {
        ParentalCalculator::new(
            AgreementBook::new(vec![transport_agreement()]).unwrap(),
            ParentalPolicy::default(),
        )
    }

    fn birthing(start: NaiveDate, end: NaiveDate, due: NaiveDate) -> ParentalRequest {
        ParentalRequest {
            leave_type: ParentalLeaveType::BirthingParent,
            start_date: start,
            end_date: end,
            due_date: Some(due),
            notified_on: date(2025, 1, 15),
            existing_absences: Vec::new(),
        }
    }

    /// PL-001: two weeks for the non-birthing parent
    #[test]
    fn test_pl_001_non_birthing_parent_pay() {
        let request = ParentalRequest {
            leave_type: ParentalLeaveType::NonBirthingParent,
            start_date: date(2025, 6, 2),
            end_date: date(2025, 6, 15),
            due_date: None,
            notified_on: date(2025, 3, 1),
            existing_absences: Vec::new(),
        };
        let calculation = calculator().calculate(&driver(), &request).unwrap();

        assert_eq!(calculation.requested_days, 14);
        assert_eq!(calculation.payable_days, 14);
        assert!(!calculation.has_exceeded_limit);
        // 177.50 × 37 / 7 × 14
        assert_eq!(calculation.payment_amount, dec("13135.00"));
        assert_eq!(calculation.pension_contribution, dec("1773.23"));
        assert_eq!(calculation.enhanced_pension_benefit, dec("328.38"));
    }

    /// PL-002: 4 weeks before and 14 weeks from the due date is within limits
    #[test]
    fn test_pl_002_birthing_parent_split() {
        let due = date(2025, 6, 2);
        let calc = calculator();
        let calculation = calc
            .calculate(&driver(), &birthing(date(2025, 5, 5), date(2025, 9, 7), due))
            .unwrap();

        assert_eq!(calculation.pre_birth_days, 28);
        assert_eq!(calculation.post_birth_days, 98);
        assert_eq!(calculation.payable_days, 126);
        assert!(!calculation.pre_birth_exceeded);
        assert!(!calculation.post_birth_exceeded);
        let validation = calc.validate(&driver(), &calculation);
        assert!(validation.is_valid);
        assert!(validation.warnings.is_empty());
    }

    /// PL-003: leave starting five weeks early is flagged
    #[test]
    fn test_pl_003_pre_birth_exceeded() {
        let due = date(2025, 6, 2);
        let calc = calculator();
        let calculation = calc
            .calculate(&driver(), &birthing(date(2025, 4, 28), date(2025, 8, 31), due))
            .unwrap();

        assert_eq!(calculation.requested_days, 126);
        assert_eq!(calculation.pre_birth_days, 35);
        assert_eq!(calculation.post_birth_days, 91);
        assert!(calculation.pre_birth_exceeded);
        // the fifth week before the due date is unpaid
        assert_eq!(calculation.payable_days, 28 + 91);
        assert!(calculation.has_exceeded_limit);
        let validation = calc.validate(&driver(), &calculation);
        assert!(validation.has_warning("PARENTAL_PRE_BIRTH_EXCEEDED"));
        assert!(validation.has_warning("PARENTAL_LIMIT_EXCEEDED"));
    }

    /// PL-008: six weeks before the due date pays only four
    #[test]
    fn test_pl_008_pre_birth_days_clamped() {
        let due = date(2025, 6, 2);
        let calculation = calculator()
            .calculate(&driver(), &birthing(date(2025, 4, 21), date(2025, 8, 24), due))
            .unwrap();

        assert_eq!(calculation.pre_birth_days, 42);
        assert_eq!(calculation.post_birth_days, 84);
        assert_eq!(calculation.requested_days, 126);
        assert_eq!(calculation.payable_days, 28 + 84);
        assert!(calculation.has_exceeded_limit);
        // 177.50 × 37 / 7 × 112
        assert_eq!(calculation.payment_amount, dec("105080.00"));
    }

    /// PL-009: sixteen weeks after the due date pays only fourteen
    #[test]
    fn test_pl_009_post_birth_days_clamped() {
        let due = date(2025, 6, 2);
        let calc = calculator();
        let calculation = calc
            .calculate(&driver(), &birthing(due, date(2025, 9, 21), due))
            .unwrap();

        assert_eq!(calculation.pre_birth_days, 0);
        assert_eq!(calculation.post_birth_days, 112);
        assert_eq!(calculation.requested_days, 112);
        assert_eq!(calculation.payable_days, 98);
        assert!(calculation.post_birth_exceeded);
        assert!(calculation.has_exceeded_limit);
        // 177.50 × 37 / 7 × 98
        assert_eq!(calculation.payment_amount, dec("91945.00"));
        assert!(calc
            .validate(&driver(), &calculation)
            .has_warning("PARENTAL_POST_BIRTH_EXCEEDED"));
    }

    /// PL-004: birthing parent without a due date
    #[test]
    fn test_pl_004_due_date_required() {
        let calc = calculator();
        let mut request = birthing(date(2025, 5, 5), date(2025, 6, 1), date(2025, 6, 2));
        request.due_date = None;
        let calculation = calc.calculate(&driver(), &request).unwrap();
        assert!(calc
            .validate(&driver(), &calculation)
            .has_error("PARENTAL_DUE_DATE_REQUIRED"));
    }

    /// PL-005: late notification is a warning
    #[test]
    fn test_pl_005_late_notification() {
        let calc = calculator();
        let mut request = birthing(date(2025, 5, 5), date(2025, 6, 1), date(2025, 6, 2));
        request.notified_on = date(2025, 4, 1);
        let calculation = calc.calculate(&driver(), &request).unwrap();

        assert_eq!(calculation.notice_days, Some(62));
        assert!(calculation.late_notification);
        let validation = calc.validate(&driver(), &calculation);
        assert!(validation.is_valid);
        assert!(validation.has_warning("PARENTAL_LATE_NOTIFICATION"));
    }

    /// PL-006: more than the entitlement is capped
    #[test]
    fn test_pl_006_limit_exceeded() {
        let request = ParentalRequest {
            leave_type: ParentalLeaveType::SocialParent,
            start_date: date(2025, 6, 2),
            end_date: date(2025, 6, 22),
            due_date: None,
            notified_on: date(2025, 1, 1),
            existing_absences: Vec::new(),
        };
        let calculation = calculator().calculate(&driver(), &request).unwrap();
        assert_eq!(calculation.requested_days, 21);
        assert_eq!(calculation.payable_days, 14);
        assert!(calculation.has_exceeded_limit);
    }

    /// PL-007: overlap with recorded sickness
    #[test]
    fn test_pl_007_overlap() {
        let calc = calculator();
        let mut request = birthing(date(2025, 5, 5), date(2025, 6, 1), date(2025, 6, 2));
        request.existing_absences = vec![absence(
            AbsenceType::Sickness,
            date(2025, 4, 28),
            None,
            0,
        )];
        let calculation = calc.calculate(&driver(), &request).unwrap();
        assert!(calc.validate(&driver(), &calculation).has_error("ABSENCE_OVERLAP"));
    }

    #[test]
    fn test_inverted_range() {
        let request = birthing(date(2025, 6, 1), date(2025, 5, 1), date(2025, 6, 2));
        assert!(calculator().calculate(&driver(), &request).is_err());
    }
}
