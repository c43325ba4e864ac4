//! Employee model and related types.
//!
//! An [`Employee`] is an immutable snapshot taken for one calculation. It
//! carries everything the allowance composer and the entitlement calculators
//! need: job category, agreement type, seniority, certificates and the youth
//! worker details.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AgreementType;

/// The job category an employee is hired under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    /// Truck or van driver.
    Driver,
    /// Warehouse or terminal worker.
    Warehouse,
    /// Removal/moving crew.
    Mover,
    /// Renovation (waste collection) crew.
    Renovation,
}

/// How the employee's wage is contracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WageType {
    /// Paid per hour worked; vacation is accrued as a percentage.
    Hourly,
    /// Monthly salary; vacation is taken with pay plus a supplement.
    Salaried,
}

/// Vehicle weight class a driver is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    /// Vans up to 3.5 tonnes.
    Van,
    /// Trucks from 3.5 to 18 tonnes.
    MediumTruck,
    /// Trucks above 18 tonnes.
    HeavyTruck,
    /// Articulated vehicles and road trains.
    Articulated,
}

impl VehicleClass {
    /// Returns true when the class requires a digital tachograph card.
    pub fn requires_tachograph(self) -> bool {
        matches!(self, VehicleClass::HeavyTruck | VehicleClass::Articulated)
    }
}

/// ADR (dangerous goods) certificate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdrType {
    /// Basic packaged goods certificate.
    Basic,
    /// Tank transport specialisation.
    Tank,
    /// Explosives specialisation.
    Explosives,
}

/// Route arrangement for cross-border drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    /// Fixed route; covered by the weekly guaranteed minimum.
    Fixed,
    /// Variable route; paid per trip only.
    Variable,
}

/// A driver license with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverLicense {
    /// License category (e.g. "C", "CE").
    pub class: String,
    /// Last day the license is valid.
    pub expires_on: NaiveDate,
}

impl DriverLicense {
    /// Returns true if the license is still valid on the given date.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        date <= self.expires_on
    }
}

/// Capability and certificate flags held by an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Driver license, if any.
    #[serde(default)]
    pub driver_license: Option<DriverLicense>,
    /// Holds a digital tachograph driver card.
    #[serde(default)]
    pub tachograph_card: bool,
    /// Forklift certificate.
    #[serde(default)]
    pub forklift: bool,
    /// Crane certificate.
    #[serde(default)]
    pub crane: bool,
    /// ADR certificate type, if any.
    #[serde(default)]
    pub adr: Option<AdrType>,
    /// Completed vocational education for the trade.
    #[serde(default)]
    pub vocational_degree: bool,
}

/// Represents an employee snapshot used for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The job category the employee works in.
    pub job_category: JobCategory,
    /// The agreement the employee is paid under.
    pub agreement_type: AgreementType,
    /// First day of employment.
    pub employment_date: NaiveDate,
    /// Seniority in whole months, as recorded by the employer.
    pub seniority_months: u32,
    /// Hourly or salaried.
    pub wage_type: WageType,
    /// Optional override for the agreement's base hourly rate.
    #[serde(default)]
    pub base_hourly_rate: Option<Decimal>,
    /// Postal code of the work location.
    pub postal_code: String,
    /// Vehicle class for drivers.
    #[serde(default)]
    pub vehicle_class: Option<VehicleClass>,
    /// Certificates and licenses.
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Locally negotiated hourly supplement.
    #[serde(default)]
    pub local_salary_supplement: Option<Decimal>,
    /// Employed on youth worker terms.
    #[serde(default)]
    pub youth_worker: bool,
    /// Date of birth; needed for youth worker percentages.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Route arrangement for cross-border drivers.
    #[serde(default)]
    pub route_type: Option<RouteType>,
}

impl Employee {
    /// Returns the employee's age in whole years on the given date.
    ///
    /// # Examples
    ///
    /// ```
    /// use transport_pay_engine::models::{AgreementType, Employee, JobCategory, WageType};
    /// use chrono::NaiveDate;
    ///
    /// let mut employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     job_category: JobCategory::Warehouse,
    ///     agreement_type: AgreementType::Warehouse,
    ///     employment_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
    ///     seniority_months: 6,
    ///     wage_type: WageType::Hourly,
    ///     base_hourly_rate: None,
    ///     postal_code: "8000".to_string(),
    ///     vehicle_class: None,
    ///     capabilities: Default::default(),
    ///     local_salary_supplement: None,
    ///     youth_worker: true,
    ///     birth_date: NaiveDate::from_ymd_opt(2007, 3, 15),
    ///     route_type: None,
    /// };
    /// let on = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    /// assert_eq!(employee.age_on(on), Some(17));
    /// employee.birth_date = None;
    /// assert_eq!(employee.age_on(on), None);
    /// ```
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if date < birth {
            return Some(0);
        }
        let mut age = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }

    /// Returns true if the employee holds a driver license valid on the date.
    pub fn has_valid_license_on(&self, date: NaiveDate) -> bool {
        self.capabilities
            .driver_license
            .as_ref()
            .is_some_and(|license| license.is_valid_on(date))
    }

    /// Returns true if the employee drives a fixed cross-border route.
    pub fn is_fixed_route(&self) -> bool {
        self.route_type == Some(RouteType::Fixed)
    }
}
