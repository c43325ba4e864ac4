//! Hourly allowance composition.
//!
//! This module maps an employee's attributes to the bundle of hourly
//! allowances they qualify for, plus the youth worker percentage that scales
//! the base rate. Allowances are always paid in full; the youth percentage
//! never touches them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::money::HUNDRED;
use crate::models::{AdrType, AllowanceRates, AuditStep, Employee, JobCategory, VehicleClass};

/// Clause reference for hourly allowances.
pub const ALLOWANCE_CLAUSE: &str = "§ 5 Tillæg";

/// Clause reference for youth worker pay.
pub const YOUTH_CLAUSE: &str = "§ 4 stk. 3 Unge under 20 år";

/// City zone derived from a Danish postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityZone {
    /// Greater Copenhagen (1000–2999).
    Capital,
    /// Rest of Zealand and the islands (3000–4999).
    Zealand,
    /// Odense, Aarhus and Aalborg areas (5000–5999, 8000–8999, 9000–9999).
    RegionalCity,
    /// Everywhere else, including unparseable codes.
    Provincial,
}

/// Derives the city zone from a postal code.
///
/// ```
/// use transport_pay_engine::calculation::{city_zone, CityZone};
///
/// assert_eq!(city_zone("2300"), CityZone::Capital);
/// assert_eq!(city_zone("8000"), CityZone::RegionalCity);
/// assert_eq!(city_zone("6000"), CityZone::Provincial);
/// assert_eq!(city_zone("n/a"), CityZone::Provincial);
/// ```
pub fn city_zone(postal_code: &str) -> CityZone {
    match postal_code.trim().parse::<u32>() {
        Ok(1000..=2999) => CityZone::Capital,
        Ok(3000..=4999) => CityZone::Zealand,
        Ok(5000..=5999) | Ok(8000..=9999) => CityZone::RegionalCity,
        _ => CityZone::Provincial,
    }
}

/// The kind of an hourly allowance line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceKind {
    /// Job category allowance (driver, warehouse, mover, renovation).
    JobCategory,
    /// Vocational degree.
    VocationalDegree,
    /// Seniority.
    Seniority,
    /// ADR certificate.
    Adr,
    /// Forklift certificate.
    Forklift,
    /// Crane certificate.
    Crane,
    /// Local salary supplement.
    LocalSupplement,
}

/// One qualifying hourly allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceLine {
    /// The allowance kind.
    pub kind: AllowanceKind,
    /// Human-readable description.
    pub description: String,
    /// Amount per hour.
    pub hourly_rate: Decimal,
}

/// Every allowance an employee qualifies for, plus the youth percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceBundle {
    /// Qualifying allowances in a stable order.
    pub lines: Vec<AllowanceLine>,
    /// Sum of all qualifying hourly allowances.
    pub total_hourly_allowance: Decimal,
    /// Percentage of the base rate paid (100 for adults).
    pub youth_percentage: Decimal,
    /// The audit step recording the composition.
    pub audit_step: AuditStep,
}

impl AllowanceBundle {
    /// Base rate scaled by the youth percentage.
    pub fn adjusted_base_rate(&self, base_rate: Decimal) -> Decimal {
        base_rate * self.youth_percentage / HUNDRED
    }

    /// Effective hourly wage: adjusted base rate plus all allowances.
    pub fn effective_hourly_wage(&self, base_rate: Decimal) -> Decimal {
        self.adjusted_base_rate(base_rate) + self.total_hourly_allowance
    }
}

/// Returns the youth worker percentage of the base rate.
///
/// Only employees on youth terms with a known birth date are reduced:
/// under 18 → 50%, 18 → 70%, 19 → 85%, 20 and over → 100%.
///
/// ```
/// use transport_pay_engine::calculation::youth_percentage_for_age;
/// use rust_decimal::Decimal;
///
/// assert_eq!(youth_percentage_for_age(17), Decimal::from(50));
/// assert_eq!(youth_percentage_for_age(19), Decimal::from(85));
/// assert_eq!(youth_percentage_for_age(25), Decimal::from(100));
/// ```
pub fn youth_percentage_for_age(age: u32) -> Decimal {
    match age {
        0..=17 => Decimal::from(50),
        18 => Decimal::from(70),
        19 => Decimal::from(85),
        _ => HUNDRED,
    }
}

/// Youth percentage for an employee on a given date.
pub fn youth_percentage(employee: &Employee, on: NaiveDate) -> Decimal {
    if !employee.youth_worker {
        return HUNDRED;
    }
    employee
        .age_on(on)
        .map(youth_percentage_for_age)
        .unwrap_or(HUNDRED)
}

/// Seniority allowance: months capped at the cap, times the monthly rate.
pub fn seniority_allowance(seniority_months: u32, rates: &AllowanceRates) -> Decimal {
    Decimal::from(seniority_months.min(rates.seniority_cap_months)) * rates.seniority_per_month
}

/// Composes the hourly allowance bundle for an employee.
///
/// # Arguments
///
/// * `employee` - The employee snapshot
/// * `rates` - The allowance rate table
/// * `on` - Reference date for license expiry and age
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::compose_allowances;
/// use transport_pay_engine::models::{
///     AgreementType, AllowanceRates, Capabilities, DriverLicense, Employee, JobCategory, VehicleClass, WageType,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     job_category: JobCategory::Driver,
///     agreement_type: AgreementType::Transport,
///     employment_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     seniority_months: 100,
///     wage_type: WageType::Hourly,
///     base_hourly_rate: None,
///     postal_code: "6000".to_string(),
///     vehicle_class: Some(VehicleClass::MediumTruck),
///     capabilities: Capabilities {
///         driver_license: Some(DriverLicense {
///             class: "C".to_string(),
///             expires_on: NaiveDate::from_ymd_opt(2029, 1, 1).unwrap(),
///         }),
///         ..Capabilities::default()
///     },
///     local_salary_supplement: None,
///     youth_worker: false,
///     birth_date: None,
///     route_type: None,
/// };
///
/// let on = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let bundle = compose_allowances(&employee, &AllowanceRates::default(), on, 1);
///
/// // 5.50 medium truck + 60 months × 0.15 seniority
/// assert_eq!(bundle.total_hourly_allowance, Decimal::from_str("14.50").unwrap());
/// assert_eq!(bundle.youth_percentage, Decimal::from(100));
/// ```
pub fn compose_allowances(
    employee: &Employee,
    rates: &AllowanceRates,
    on: NaiveDate,
    step_number: u32,
) -> AllowanceBundle {
    let mut lines = Vec::new();
    let mut skipped: Vec<String> = Vec::new();

    match job_category_allowance(employee, rates, on) {
        Ok(Some(line)) => lines.push(line),
        Ok(None) => {}
        Err(reason) => skipped.push(reason),
    }

    let capabilities = &employee.capabilities;
    if capabilities.vocational_degree {
        lines.push(line(
            AllowanceKind::VocationalDegree,
            "Vocational degree allowance",
            rates.vocational_degree,
        ));
    }

    let seniority = seniority_allowance(employee.seniority_months, rates);
    if seniority > Decimal::ZERO {
        let counted = employee.seniority_months.min(rates.seniority_cap_months);
        lines.push(line(
            AllowanceKind::Seniority,
            &format!("Seniority allowance ({} months)", counted),
            seniority,
        ));
    }

    if let Some(adr) = capabilities.adr {
        let (label, rate) = match adr {
            AdrType::Basic => ("basic", rates.adr_basic),
            AdrType::Tank => ("tank", rates.adr_tank),
            AdrType::Explosives => ("explosives", rates.adr_explosives),
        };
        lines.push(line(
            AllowanceKind::Adr,
            &format!("ADR certificate allowance ({})", label),
            rate,
        ));
    }
    if capabilities.forklift {
        lines.push(line(
            AllowanceKind::Forklift,
            "Forklift certificate allowance",
            rates.forklift,
        ));
    }
    if capabilities.crane {
        lines.push(line(
            AllowanceKind::Crane,
            "Crane certificate allowance",
            rates.crane,
        ));
    }

    if let Some(supplement) = employee.local_salary_supplement
        && supplement > Decimal::ZERO
    {
        let capped = supplement.min(rates.local_supplement_cap);
        if capped < supplement {
            skipped.push(format!(
                "local supplement {} capped at {}",
                supplement.normalize(),
                rates.local_supplement_cap.normalize()
            ));
        }
        lines.push(line(
            AllowanceKind::LocalSupplement,
            "Local salary supplement",
            capped,
        ));
    }

    let total_hourly_allowance: Decimal = lines.iter().map(|l| l.hourly_rate).sum();
    let youth = youth_percentage(employee, on);

    let reasoning = format!(
        "{} allowance(s) totalling {} per hour; base rate paid at {}%",
        lines.len(),
        total_hourly_allowance.normalize(),
        youth.normalize()
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "allowance_composition".to_string(),
        rule_name: "Allowance Composition".to_string(),
        clause_ref: format!("{}, {}", ALLOWANCE_CLAUSE, YOUTH_CLAUSE),
        input: serde_json::json!({
            "employee_id": employee.id,
            "job_category": employee.job_category,
            "seniority_months": employee.seniority_months,
            "postal_code": employee.postal_code,
            "youth_worker": employee.youth_worker,
            "reference_date": on.to_string()
        }),
        output: serde_json::json!({
            "allowances": lines
                .iter()
                .map(|l| serde_json::json!({
                    "kind": l.kind,
                    "hourly_rate": l.hourly_rate.normalize().to_string()
                }))
                .collect::<Vec<_>>(),
            "total_hourly_allowance": total_hourly_allowance.normalize().to_string(),
            "youth_percentage": youth.normalize().to_string(),
            "skipped": skipped
        }),
        reasoning,
    };

    AllowanceBundle {
        lines,
        total_hourly_allowance,
        youth_percentage: youth,
        audit_step,
    }
}

fn line(kind: AllowanceKind, description: &str, hourly_rate: Decimal) -> AllowanceLine {
    AllowanceLine {
        kind,
        description: description.to_string(),
        hourly_rate,
    }
}

/// The job category allowance, `Err` with a reason when a required capability is missing.
fn job_category_allowance(
    employee: &Employee,
    rates: &AllowanceRates,
    on: NaiveDate,
) -> Result<Option<AllowanceLine>, String> {
    match employee.job_category {
        JobCategory::Driver => {
            let Some(class) = employee.vehicle_class else {
                return Ok(None);
            };
            if !employee.has_valid_license_on(on) {
                return Err(format!("driver allowance: no valid license on {}", on));
            }
            if class.requires_tachograph() && !employee.capabilities.tachograph_card {
                return Err("driver allowance: tachograph card required".to_string());
            }
            let (label, rate) = match class {
                VehicleClass::Van => ("van", rates.driver_van),
                VehicleClass::MediumTruck => ("medium truck", rates.driver_medium_truck),
                VehicleClass::HeavyTruck => ("heavy truck", rates.driver_heavy_truck),
                VehicleClass::Articulated => ("articulated", rates.driver_articulated),
            };
            Ok(Some(line(
                AllowanceKind::JobCategory,
                &format!("Driver allowance ({})", label),
                rate,
            )))
        }
        JobCategory::Warehouse => {
            let rate = match city_zone(&employee.postal_code) {
                CityZone::Capital => rates.warehouse_capital,
                CityZone::RegionalCity => rates.warehouse_regional_city,
                CityZone::Zealand | CityZone::Provincial => Decimal::ZERO,
            };
            if rate.is_zero() {
                return Ok(None);
            }
            Ok(Some(line(
                AllowanceKind::JobCategory,
                "Warehouse city zone allowance",
                rate,
            )))
        }
        JobCategory::Mover => Ok(Some(line(
            AllowanceKind::JobCategory,
            "Mover allowance",
            rates.mover,
        ))),
        JobCategory::Renovation => Ok(Some(line(
            AllowanceKind::JobCategory,
            "Renovation allowance",
            rates.renovation,
        ))),
    }
}
