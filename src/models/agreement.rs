//! Collective agreement rate tables.
//!
//! An [`Agreement`] is one version of the rate table for an
//! [`AgreementType`]. Versions carry a validity window and an active flag;
//! the [`crate::config::AgreementBook`] guarantees that at most one active
//! version of a type covers any date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The family of collective agreements the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementType {
    /// Transport and logistics (drivers).
    Transport,
    /// Warehouse and terminal work.
    Warehouse,
    /// Renovation and waste collection.
    Renovation,
    /// Removals.
    Moving,
}

impl std::fmt::Display for AgreementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgreementType::Transport => write!(f, "transport"),
            AgreementType::Warehouse => write!(f, "warehouse"),
            AgreementType::Renovation => write!(f, "renovation"),
            AgreementType::Moving => write!(f, "moving"),
        }
    }
}

/// Hourly allowance rates of an agreement.
///
/// Missing keys fall back to the built-in rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceRates {
    /// Driver allowance for vans.
    pub driver_van: Decimal,
    /// Driver allowance for 3.5–18 tonne trucks.
    pub driver_medium_truck: Decimal,
    /// Driver allowance for trucks above 18 tonnes.
    pub driver_heavy_truck: Decimal,
    /// Driver allowance for articulated vehicles.
    pub driver_articulated: Decimal,
    /// Warehouse allowance in the capital zone.
    pub warehouse_capital: Decimal,
    /// Warehouse allowance in the large regional cities.
    pub warehouse_regional_city: Decimal,
    /// Flat mover allowance.
    pub mover: Decimal,
    /// Flat renovation allowance.
    pub renovation: Decimal,
    /// Flat vocational degree allowance.
    pub vocational_degree: Decimal,
    /// Seniority allowance per month of seniority.
    pub seniority_per_month: Decimal,
    /// Months after which seniority stops increasing.
    pub seniority_cap_months: u32,
    /// ADR basic certificate.
    pub adr_basic: Decimal,
    /// ADR tank certificate.
    pub adr_tank: Decimal,
    /// ADR explosives certificate.
    pub adr_explosives: Decimal,
    /// Forklift certificate.
    pub forklift: Decimal,
    /// Crane certificate.
    pub crane: Decimal,
    /// Maximum local salary supplement per hour.
    pub local_supplement_cap: Decimal,
}

impl Default for AllowanceRates {
    fn default() -> Self {
        Self {
            driver_van: Decimal::new(300, 2),
            driver_medium_truck: Decimal::new(550, 2),
            driver_heavy_truck: Decimal::new(850, 2),
            driver_articulated: Decimal::new(1000, 2),
            warehouse_capital: Decimal::new(600, 2),
            warehouse_regional_city: Decimal::new(400, 2),
            mover: Decimal::new(500, 2),
            renovation: Decimal::new(450, 2),
            vocational_degree: Decimal::new(400, 2),
            seniority_per_month: Decimal::new(15, 2),
            seniority_cap_months: 60,
            adr_basic: Decimal::new(400, 2),
            adr_tank: Decimal::new(600, 2),
            adr_explosives: Decimal::new(750, 2),
            forklift: Decimal::new(250, 2),
            crane: Decimal::new(350, 2),
            local_supplement_cap: Decimal::new(3000, 2),
        }
    }
}

/// A versioned collective agreement rate table.
///
/// Overtime tier rates and the night rate are absolute hourly amounts;
/// everything ending in `_percent` is a percentage (12.5 means 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    /// Identifier of this version (e.g. "transport_2025").
    pub id: String,
    /// The agreement family.
    pub agreement_type: AgreementType,
    /// Human-readable name.
    pub name: String,
    /// Minimum base hourly rate.
    pub base_hourly_rate: Decimal,
    /// Normal weekly hours.
    pub weekly_hours: Decimal,
    /// Hourly rate for the first overtime hours of a day.
    pub overtime_tier1_rate: Decimal,
    /// Hourly rate for overtime beyond the first tier.
    pub overtime_tier2_rate: Decimal,
    /// Flat hourly rate for night and shifted time.
    pub night_rate: Decimal,
    /// Weekend premium as a percentage of the effective wage.
    pub weekend_premium_percent: Decimal,
    /// Public holiday premium as a percentage of the effective wage.
    pub holiday_premium_percent: Decimal,
    /// Special allowance (free choice account) percentage.
    pub special_allowance_percent: Decimal,
    /// Employer pension contribution percentage.
    pub pension_employer_percent: Decimal,
    /// Employee pension contribution percentage.
    pub pension_employee_percent: Decimal,
    /// Vacation pay percentage for hourly employees.
    pub vacation_percent: Decimal,
    /// Vacation days earned per year.
    pub vacation_days: u32,
    /// Vacation supplement percentage for salaried employees.
    #[serde(default = "default_salaried_vacation_supplement")]
    pub salaried_vacation_supplement_percent: Decimal,
    /// First day this version applies.
    pub valid_from: NaiveDate,
    /// Last day this version applies, if closed.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Whether this version is in force.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Hourly allowance table.
    #[serde(default)]
    pub allowances: AllowanceRates,
}

fn default_salaried_vacation_supplement() -> Decimal {
    Decimal::ONE
}

fn default_active() -> bool {
    true
}

impl Agreement {
    /// Normal daily hours: weekly hours spread over a five-day week.
    ///
    /// # Examples
    ///
    /// ```
    /// # use transport_pay_engine::models::Agreement;
    /// # use rust_decimal::Decimal;
    /// # let agreement: Agreement = serde_yaml::from_str(r#"
    /// # id: t
    /// # agreement_type: transport
    /// # name: T
    /// # base_hourly_rate: "160.00"
    /// # weekly_hours: "37"
    /// # overtime_tier1_rate: "230.00"
    /// # overtime_tier2_rate: "275.00"
    /// # night_rate: "30.00"
    /// # weekend_premium_percent: "50"
    /// # holiday_premium_percent: "100"
    /// # special_allowance_percent: "9"
    /// # pension_employer_percent: "8"
    /// # pension_employee_percent: "4"
    /// # vacation_percent: "12.5"
    /// # vacation_days: 25
    /// # valid_from: 2025-03-01
    /// # "#).unwrap();
    /// assert_eq!(agreement.normal_daily_hours(), Decimal::new(74, 1));
    /// ```
    pub fn normal_daily_hours(&self) -> Decimal {
        self.weekly_hours / Decimal::from(5)
    }

    /// Returns true if the validity window contains the date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_to.is_none_or(|end| date <= end)
    }

    /// Returns true if this version is active and covers the date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active && self.covers(date)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn transport_agreement() -> Agreement {
        Agreement {
            id: "transport_2025".to_string(),
            agreement_type: AgreementType::Transport,
            name: "Transport- og Logistikoverenskomsten 2025".to_string(),
            base_hourly_rate: dec("160.00"),
            weekly_hours: dec("37"),
            overtime_tier1_rate: dec("230.00"),
            overtime_tier2_rate: dec("275.00"),
            night_rate: dec("30.00"),
            weekend_premium_percent: dec("50"),
            holiday_premium_percent: dec("100"),
            special_allowance_percent: dec("9"),
            pension_employer_percent: dec("8"),
            pension_employee_percent: dec("4"),
            vacation_percent: dec("12.5"),
            vacation_days: 25,
            salaried_vacation_supplement_percent: dec("1"),
            valid_from: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            valid_to: None,
            active: true,
            allowances: AllowanceRates::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::transport_agreement;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normal_daily_hours_for_37_hour_week() {
        assert_eq!(transport_agreement().normal_daily_hours(), Decimal::new(74, 1));
    }

    #[test]
    fn test_open_ended_window_covers_future_dates() {
        let agreement = transport_agreement();
        assert!(!agreement.covers(date(2025, 2, 28)));
        assert!(agreement.covers(date(2025, 3, 1)));
        assert!(agreement.covers(date(2031, 1, 1)));
    }

    #[test]
    fn test_closed_window_is_inclusive() {
        let mut agreement = transport_agreement();
        agreement.valid_to = Some(date(2025, 12, 31));
        assert!(agreement.covers(date(2025, 12, 31)));
        assert!(!agreement.covers(date(2026, 1, 1)));
    }

    #[test]
    fn test_inactive_version_is_never_active() {
        let mut agreement = transport_agreement();
        agreement.active = false;
        assert!(!agreement.is_active_on(date(2025, 6, 1)));
    }

    #[test]
    fn test_agreement_type_display_matches_serde() {
        assert_eq!(AgreementType::Renovation.to_string(), "renovation");
        assert_eq!(
            serde_json::to_string(&AgreementType::Renovation).unwrap(),
            "\"renovation\""
        );
    }
}
