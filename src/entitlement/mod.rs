//! Entitlement calculators for leave, absence and special pay schemes.
//!
//! Every calculator follows the same contract ([`EntitlementCalculator`]):
//! `calculate` turns a request into a calculation record, keeping the
//! requested figures and clamping only what is payable, and `validate`
//! inspects a finished record without changing it. Fatal input problems are
//! `EngineError`s; policy violations are [`ValidationResult`] issues.
//!
//! Calculators that produce absences (sickness, parental leave, competence
//! development and child care) also implement [`AbsenceCalculation`] on their
//! record type so [`create_absence`] can persist them.

mod competence;
mod cross_border;
pub mod lifecycle;
mod parental;
mod rules;
mod sickness;
mod waste_collection;
mod warehouse;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::compose_allowances;
use crate::config::AgreementBook;
use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceEntry, AbsenceType, Employee};
use crate::validation::ValidationResult;

pub use competence::{
    CompetenceCalculation, CompetenceCalculator, CompetencePolicy, CompetenceRequest,
    LimitWindow,
};
pub use cross_border::{
    CrossBorderCalculation, CrossBorderCalculator, CrossBorderPolicy, CrossBorderRequest,
    TripDay, TripDayPay,
};
pub use parental::{
    ParentalCalculation, ParentalCalculator, ParentalLeaveType, ParentalPolicy, ParentalRequest,
};
pub use rules::{DatedRule, RuleTimeline};
pub use sickness::{SicknessCalculation, SicknessCalculator, SicknessPolicy, SicknessRequest};
pub use waste_collection::{
    ContainerPickup, ContainerSize, WasteCalculation, WasteCalculator, WasteCategory,
    WastePolicy, WasteRequest, WeatherCondition,
};
pub use warehouse::{
    GeographicZone, TemperatureZone, TerminalWork, WarehouseCalculation, WarehouseCalculator,
    WarehousePolicy, WarehouseRequest,
};

/// Shared contract of every entitlement calculator.
pub trait EntitlementCalculator {
    /// The calculator's input.
    type Request;
    /// The calculator's output record.
    type Calculation;

    /// Computes the calculation record.
    fn calculate(
        &self,
        employee: &Employee,
        request: &Self::Request,
    ) -> EngineResult<Self::Calculation>;

    /// Checks a calculation record against policy.
    fn validate(&self, employee: &Employee, calculation: &Self::Calculation) -> ValidationResult;
}

/// A calculation record that results in a persisted absence.
pub trait AbsenceCalculation {
    /// The absence type to record.
    fn absence_type(&self) -> AbsenceType;
    /// First day of absence.
    fn start_date(&self) -> NaiveDate;
    /// Last day of absence, `None` while ongoing.
    fn end_date(&self) -> Option<NaiveDate>;
    /// Counted (payable) days.
    fn counted_days(&self) -> Decimal;
    /// Payable amount.
    fn payment_amount(&self) -> Decimal;
    /// Clause citation.
    fn legal_reference(&self) -> &str;
}

/// The hourly wage an absence is paid at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageSnapshot {
    /// The agreement version used.
    pub agreement_id: String,
    /// Base rate before the youth percentage.
    pub base_hourly_rate: Decimal,
    /// Youth percentage applied.
    pub youth_percentage: Decimal,
    /// Sum of hourly allowances.
    pub hourly_allowances: Decimal,
    /// Base rate × youth percentage + allowances.
    pub effective_hourly_wage: Decimal,
    /// Normal weekly hours of the agreement.
    pub weekly_hours: Decimal,
}

/// Resolves the employee's effective hourly wage on a date.
pub fn resolve_wage(
    employee: &Employee,
    agreements: &AgreementBook,
    on: NaiveDate,
) -> EngineResult<WageSnapshot> {
    let agreement = agreements.active_for(employee.agreement_type, on)?;
    let base_hourly_rate = employee
        .base_hourly_rate
        .unwrap_or(agreement.base_hourly_rate);
    let bundle = compose_allowances(employee, &agreement.allowances, on, 1);
    Ok(WageSnapshot {
        agreement_id: agreement.id.clone(),
        base_hourly_rate,
        youth_percentage: bundle.youth_percentage,
        hourly_allowances: bundle.total_hourly_allowance,
        effective_hourly_wage: bundle.effective_hourly_wage(base_hourly_rate),
        weekly_hours: agreement.weekly_hours,
    })
}

/// Ids of existing absences of this employee that share a day with the range.
pub(crate) fn overlapping_absences(
    employee: &Employee,
    existing: &[AbsenceEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Uuid> {
    existing
        .iter()
        .filter(|a| a.employee_id == employee.id && a.overlaps(start, end))
        .map(|a| a.id)
        .collect()
}

/// Validates a calculation and turns it into a new absence entry.
///
/// # Errors
///
/// * `ValidationFailed` if the calculator's validation reports errors
/// * `AbsenceAlreadyRecorded` if `existing` already holds an absence of the
///   same type starting on the same day for this employee
pub fn create_absence<C>(
    calculator: &C,
    employee: &Employee,
    calculation: &C::Calculation,
    existing: &[AbsenceEntry],
) -> EngineResult<AbsenceEntry>
where
    C: EntitlementCalculator,
    C::Calculation: AbsenceCalculation,
{
    let validation = calculator.validate(employee, calculation);
    if !validation.is_valid {
        warn!(
            employee_id = %employee.id,
            absence_type = %calculation.absence_type(),
            errors = validation.errors.len(),
            "Absence rejected by validation"
        );
        return Err(EngineError::ValidationFailed {
            count: validation.errors.len(),
            summary: validation.error_summary(),
        });
    }

    let absence_type = calculation.absence_type();
    let start = calculation.start_date();
    if existing.iter().any(|a| {
        a.employee_id == employee.id && a.absence_type == absence_type && a.start_date == start
    }) {
        return Err(EngineError::AbsenceAlreadyRecorded {
            employee_id: employee.id.clone(),
            absence_type: absence_type.to_string(),
            start,
        });
    }

    let note = validation
        .warnings
        .iter()
        .map(|w| w.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let entry = AbsenceEntry {
        id: Uuid::new_v4(),
        employee_id: employee.id.clone(),
        absence_type,
        start_date: start,
        end_date: calculation.end_date(),
        days: calculation.counted_days(),
        paid: calculation.payment_amount() > Decimal::ZERO,
        payment_amount: calculation.payment_amount(),
        note,
        legal_reference: calculation.legal_reference().to_string(),
    };
    info!(
        absence_id = %entry.id,
        employee_id = %employee.id,
        absence_type = %absence_type,
        days = %entry.days,
        "Absence recorded"
    );
    Ok(entry)
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

    fn book() -> AgreementBook {
        AgreementBook::new(vec![transport_agreement()]).unwrap()
    }

    fn calculator() -> SicknessCalculator {
        SicknessCalculator::new(book(), SicknessPolicy::default())
    }

    fn request(first: NaiveDate, last: NaiveDate, doctor_note: bool) -> SicknessRequest {
        SicknessRequest {
            first_day: first,
            last_day: Some(last),
            as_of: last,
            doctor_note,
            existing_absences: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_wage_for_driver() {
        let wage = resolve_wage(&driver(), &book(), date(2025, 5, 5)).unwrap();
        assert_eq!(wage.agreement_id, "transport_2025");
        assert_eq!(wage.hourly_allowances, dec("17.50"));
        assert_eq!(wage.effective_hourly_wage, dec("177.50"));
        assert_eq!(wage.weekly_hours, dec("37"));
    }

    #[test]
    fn test_create_absence_from_valid_calculation() {
        let calculator = calculator();
        let employee = driver();
        let calculation = calculator
            .calculate(&employee, &request(date(2025, 5, 5), date(2025, 5, 7), false))
            .unwrap();
        let entry = create_absence(&calculator, &employee, &calculation, &[]).unwrap();

        assert_eq!(entry.absence_type, AbsenceType::Sickness);
        assert_eq!(entry.start_date, date(2025, 5, 5));
        assert_eq!(entry.end_date, Some(date(2025, 5, 7)));
        assert_eq!(entry.days, dec("3"));
        assert!(entry.paid);
    }

    #[test]
    fn test_create_absence_refuses_invalid_calculation() {
        let calculator = calculator();
        let employee = driver();
        // five calendar days without a doctor's note
        let calculation = calculator
            .calculate(&employee, &request(date(2025, 5, 5), date(2025, 5, 9), false))
            .unwrap();

        match create_absence(&calculator, &employee, &calculation, &[]) {
            Err(EngineError::ValidationFailed { count, summary }) => {
                assert_eq!(count, 1);
                assert!(summary.contains("SICKNESS_DOCTOR_NOTE_REQUIRED"));
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_create_absence_refuses_duplicate() {
        let calculator = calculator();
        let employee = driver();
        let calculation = calculator
            .calculate(&employee, &request(date(2025, 5, 5), date(2025, 5, 6), false))
            .unwrap();
        let existing = vec![absence(
            AbsenceType::Sickness,
            date(2025, 5, 5),
            Some(date(2025, 5, 6)),
            2,
        )];

        assert!(matches!(
            create_absence(&calculator, &employee, &calculation, &existing),
            Err(EngineError::AbsenceAlreadyRecorded { .. })
        ));
    }
}
