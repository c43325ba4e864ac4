//! Payroll aggregation for one employee and one pay period.
//!
//! The aggregator resolves the agreement in force at the start of the period,
//! composes the employee's allowances, categorizes every worked day and turns
//! the summed hour buckets into itemized, legally referenced pay components.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::allowance_composer::{ALLOWANCE_CLAUSE, compose_allowances};
use crate::calculation::money::{HUNDRED, percent_of, round_money};
use crate::calculation::time_categorizer::{HourBuckets, categorize_day};
use crate::config::AgreementBook;
use crate::error::EngineResult;
use crate::models::{
    Agreement, AuditStep, AuditTrace, AuditWarning, ComponentType, Employee, PayPeriod,
    PayrollCalculation, PayrollComponent, PayrollStatus, PayrollTotals, TimeEntry, WageType,
};

/// Version stamped on every calculation.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Clause reference for the base wage.
pub const BASE_WAGE_CLAUSE: &str = "§ 4 Løn";
/// Clause reference for overtime.
pub const OVERTIME_CLAUSE: &str = "§ 7 Overarbejde";
/// Clause reference for night and shifted time.
pub const NIGHT_CLAUSE: &str = "§ 8 Natarbejde og forskudt tid";
/// Clause reference for weekend work.
pub const WEEKEND_CLAUSE: &str = "§ 9 Weekendarbejde";
/// Clause reference for public holidays.
pub const HOLIDAY_CLAUSE: &str = "§ 10 Søgnehelligdage";
/// Clause reference for the special allowance.
pub const SPECIAL_ALLOWANCE_CLAUSE: &str = "§ 11 Fritvalgskonto";
/// Clause reference for pension.
pub const PENSION_CLAUSE: &str = "§ 12 Pension";
/// Clause reference for vacation pay.
pub const VACATION_CLAUSE: &str = "§ 13 Ferie";

/// Calculates payroll for one employee over one period.
///
/// Only approved entries belonging to the employee and dated inside the
/// period are paid; everything else is skipped with an audit warning.
///
/// # Errors
///
/// * `InvalidDateRange` if the period ends before it starts
/// * `AgreementNotFound` if no active agreement of the employee's type covers
///   the period start
///
/// # Example
///
/// ```
/// use transport_pay_engine::calculation::calculate_payroll;
/// use transport_pay_engine::config::AgreementBook;
/// use transport_pay_engine::models::{
///     AgreementType, Capabilities, Employee, JobCategory, PayPeriod, WageType,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     job_category: JobCategory::Mover,
///     agreement_type: AgreementType::Moving,
///     employment_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     seniority_months: 0,
///     wage_type: WageType::Hourly,
///     base_hourly_rate: None,
///     postal_code: "6000".to_string(),
///     vehicle_class: None,
///     capabilities: Capabilities::default(),
///     local_salary_supplement: None,
///     youth_worker: false,
///     birth_date: None,
///     route_type: None,
/// };
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// );
///
/// // Without a moving agreement the calculation cannot start.
/// let result = calculate_payroll(&employee, &AgreementBook::default(), &period, &[]);
/// assert!(result.is_err());
/// ```
pub fn calculate_payroll(
    employee: &Employee,
    agreements: &AgreementBook,
    period: &PayPeriod,
    entries: &[TimeEntry],
) -> EngineResult<PayrollCalculation> {
    let start_time = Instant::now();
    period.ensure_valid()?;

    let agreement = agreements.active_for(employee.agreement_type, period.start_date)?;
    let calculation_id = Uuid::new_v4();

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let base_rate = employee
        .base_hourly_rate
        .unwrap_or(agreement.base_hourly_rate);
    steps.push(base_rate_step(employee, agreement, base_rate, step_number));
    step_number += 1;

    let bundle = compose_allowances(
        employee,
        &agreement.allowances,
        period.start_date,
        step_number,
    );
    steps.push(bundle.audit_step.clone());
    step_number += 1;

    let days = select_entries(employee, period, entries, &mut warnings);

    let normal_daily_hours = agreement.normal_daily_hours();
    let mut buckets = HourBuckets::default();
    for (date, day_entries) in &days {
        let day = categorize_day(
            *date,
            day_entries,
            normal_daily_hours,
            period.is_public_holiday(*date),
            step_number,
        );
        debug!(
            employee_id = %employee.id,
            date = %date,
            worked_hours = %day.worked_hours,
            "Categorized day"
        );
        buckets.accumulate(&day.buckets);
        steps.push(day.audit_step);
        step_number += 1;
    }

    let adjusted_base = bundle.adjusted_base_rate(base_rate);
    let effective_wage = bundle.effective_hourly_wage(base_rate);
    let mut components: Vec<PayrollComponent> = Vec::new();

    let base_wage = hourly_component(
        ComponentType::BaseWage,
        "Base wage".to_string(),
        buckets.regular,
        adjusted_base,
        BASE_WAGE_CLAUSE,
    );
    let mut base_pay = base_wage.amount;
    components.push(base_wage);

    for line in &bundle.lines {
        let component = hourly_component(
            ComponentType::Allowance,
            line.description.clone(),
            buckets.regular,
            line.hourly_rate,
            ALLOWANCE_CLAUSE,
        );
        base_pay += component.amount;
        push_nonzero(&mut components, component);
    }

    let tier1 = hourly_component(
        ComponentType::OvertimeTier1,
        "Overtime, first hours".to_string(),
        buckets.overtime_tier1,
        agreement.overtime_tier1_rate,
        OVERTIME_CLAUSE,
    );
    let tier2 = hourly_component(
        ComponentType::OvertimeTier2,
        "Overtime, further hours".to_string(),
        buckets.overtime_tier2,
        agreement.overtime_tier2_rate,
        OVERTIME_CLAUSE,
    );
    let overtime_pay = tier1.amount + tier2.amount;
    push_nonzero(&mut components, tier1);
    push_nonzero(&mut components, tier2);

    let night = hourly_component(
        ComponentType::Night,
        "Night and shifted time supplement".to_string(),
        buckets.night,
        agreement.night_rate,
        NIGHT_CLAUSE,
    );
    let night_pay = night.amount;
    push_nonzero(&mut components, night);

    let weekend = hourly_component(
        ComponentType::Weekend,
        format!("Weekend premium ({}%)", agreement.weekend_premium_percent.normalize()),
        buckets.weekend,
        effective_wage * agreement.weekend_premium_percent / HUNDRED,
        WEEKEND_CLAUSE,
    );
    let weekend_pay = weekend.amount;
    push_nonzero(&mut components, weekend);

    let holiday = hourly_component(
        ComponentType::Holiday,
        format!("Public holiday premium ({}%)", agreement.holiday_premium_percent.normalize()),
        buckets.holiday,
        effective_wage * agreement.holiday_premium_percent / HUNDRED,
        HOLIDAY_CLAUSE,
    );
    let holiday_pay = holiday.amount;
    push_nonzero(&mut components, holiday);

    let vacation_eligible_pay = base_pay + overtime_pay;

    let special = percent_component(
        ComponentType::SpecialAllowance,
        "Special allowance",
        vacation_eligible_pay,
        agreement.special_allowance_percent,
        SPECIAL_ALLOWANCE_CLAUSE,
    );
    let special_allowance = special.amount;
    push_nonzero(&mut components, special);

    let employer = percent_component(
        ComponentType::PensionEmployer,
        "Employer pension contribution",
        vacation_eligible_pay,
        agreement.pension_employer_percent,
        PENSION_CLAUSE,
    );
    let pension_employer = employer.amount;
    push_nonzero(&mut components, employer);

    let withheld = percent_component(
        ComponentType::PensionEmployee,
        "Employee pension contribution",
        vacation_eligible_pay,
        agreement.pension_employee_percent,
        PENSION_CLAUSE,
    );
    let pension_employee = withheld.amount;
    push_nonzero(&mut components, withheld);

    let (vacation_label, vacation_percent) = match employee.wage_type {
        WageType::Hourly => ("Vacation pay", agreement.vacation_percent),
        WageType::Salaried => (
            "Vacation supplement",
            agreement.salaried_vacation_supplement_percent,
        ),
    };
    let vacation = percent_component(
        ComponentType::VacationPay,
        vacation_label,
        vacation_eligible_pay,
        vacation_percent,
        VACATION_CLAUSE,
    );
    let vacation_pay = vacation.amount;
    push_nonzero(&mut components, vacation);

    let total_gross_pay =
        base_pay + overtime_pay + night_pay + weekend_pay + holiday_pay + special_allowance;
    let total_employer_cost = total_gross_pay + pension_employer + vacation_pay;

    let totals = PayrollTotals {
        regular_hours: buckets.regular,
        overtime_tier1_hours: buckets.overtime_tier1,
        overtime_tier2_hours: buckets.overtime_tier2,
        night_hours: buckets.night,
        weekend_hours: buckets.weekend,
        holiday_hours: buckets.holiday,
        youth_percentage: bundle.youth_percentage,
        effective_hourly_wage: effective_wage,
        base_pay,
        overtime_pay,
        night_pay,
        weekend_pay,
        holiday_pay,
        vacation_eligible_pay,
        special_allowance,
        pension_employer,
        pension_employee,
        vacation_pay,
        total_gross_pay,
        total_employer_cost,
    };

    steps.push(totals_step(&totals, days.len(), step_number));

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        calculation_id = %calculation_id,
        employee_id = %employee.id,
        agreement_id = %agreement.id,
        days = days.len(),
        gross_pay = %total_gross_pay,
        warnings = warnings.len(),
        duration_us = duration_us,
        "Payroll calculated"
    );

    Ok(PayrollCalculation {
        calculation_id,
        calculated_at: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        employee_id: employee.id.clone(),
        agreement_id: agreement.id.clone(),
        period: period.clone(),
        totals,
        components,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
        status: PayrollStatus::PendingReview,
        exported_at: None,
        export_reference: None,
    })
}

/// Groups the payable entries by date, recording a warning for every skipped one.
fn select_entries<'a>(
    employee: &Employee,
    period: &PayPeriod,
    entries: &'a [TimeEntry],
    warnings: &mut Vec<AuditWarning>,
) -> BTreeMap<NaiveDate, Vec<&'a TimeEntry>> {
    let mut days: BTreeMap<NaiveDate, Vec<&TimeEntry>> = BTreeMap::new();

    for entry in entries {
        if entry.employee_id != employee.id {
            warnings.push(warning(
                "FOREIGN_ENTRY",
                format!(
                    "Entry {} belongs to employee {} and was skipped",
                    entry.id, entry.employee_id
                ),
                "medium",
            ));
            continue;
        }
        if !period.contains_date(entry.date) {
            warnings.push(warning(
                "OUT_OF_PERIOD_ENTRY",
                format!(
                    "Entry {} dated {} is outside {} to {} and was skipped",
                    entry.id, entry.date, period.start_date, period.end_date
                ),
                "low",
            ));
            continue;
        }
        if !entry.is_payroll_eligible() {
            warnings.push(warning(
                "UNAPPROVED_ENTRY",
                format!("Entry {} is {} and was skipped", entry.id, entry.status),
                "low",
            ));
            continue;
        }
        if entry.end.is_none() {
            warnings.push(warning(
                "OPEN_ENTRY",
                format!("Entry {} has no end time and counts as zero hours", entry.id),
                "medium",
            ));
        }
        days.entry(entry.date).or_default().push(entry);
    }

    days
}

fn warning(code: &str, message: String, severity: &str) -> AuditWarning {
    AuditWarning {
        code: code.to_string(),
        message,
        severity: severity.to_string(),
    }
}

fn hourly_component(
    component_type: ComponentType,
    description: String,
    hours: Decimal,
    rate: Decimal,
    legal_reference: &str,
) -> PayrollComponent {
    PayrollComponent {
        component_type,
        description,
        hours: Some(hours),
        rate,
        amount: round_money(hours * rate),
        legal_reference: legal_reference.to_string(),
    }
}

fn percent_component(
    component_type: ComponentType,
    description: &str,
    base: Decimal,
    percent: Decimal,
    legal_reference: &str,
) -> PayrollComponent {
    PayrollComponent {
        component_type,
        description: format!("{} ({}%)", description, percent.normalize()),
        hours: None,
        rate: percent,
        amount: percent_of(base, percent),
        legal_reference: legal_reference.to_string(),
    }
}

fn push_nonzero(components: &mut Vec<PayrollComponent>, component: PayrollComponent) {
    if !component.amount.is_zero() {
        components.push(component);
    }
}

fn base_rate_step(
    employee: &Employee,
    agreement: &Agreement,
    base_rate: Decimal,
    step_number: u32,
) -> AuditStep {
    let source = if employee.base_hourly_rate.is_some() {
        "employee"
    } else {
        "agreement"
    };
    AuditStep {
        step_number,
        rule_id: "base_rate_lookup".to_string(),
        rule_name: "Base Rate Lookup".to_string(),
        clause_ref: BASE_WAGE_CLAUSE.to_string(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "agreement_id": agreement.id,
            "employee_override": employee.base_hourly_rate.map(|r| r.normalize().to_string())
        }),
        output: serde_json::json!({
            "base_hourly_rate": base_rate.normalize().to_string(),
            "source": source
        }),
        reasoning: format!(
            "Base rate {} taken from {} ({})",
            base_rate.normalize(),
            source,
            agreement.name
        ),
    }
}

fn totals_step(totals: &PayrollTotals, day_count: usize, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "payroll_totals".to_string(),
        rule_name: "Payroll Totals".to_string(),
        clause_ref: format!("{}, {}, {}", SPECIAL_ALLOWANCE_CLAUSE, PENSION_CLAUSE, VACATION_CLAUSE),
        input: serde_json::json!({
            "days": day_count,
            "regular_hours": totals.regular_hours.normalize().to_string(),
            "overtime_hours": (totals.overtime_tier1_hours + totals.overtime_tier2_hours)
                .normalize()
                .to_string()
        }),
        output: serde_json::json!({
            "vacation_eligible_pay": totals.vacation_eligible_pay.to_string(),
            "total_gross_pay": totals.total_gross_pay.to_string(),
            "total_employer_cost": totals.total_employer_cost.to_string()
        }),
        reasoning: format!(
            "Gross pay {} over {} day(s); percentage components based on {}",
            totals.total_gross_pay, day_count, totals.vacation_eligible_pay
        ),
    }
}
