//! Core data models for the pay engine.
//!
//! This module contains the plain records the engine consumes and produces.

mod absence;
mod agreement;
mod employee;
mod pay_period;
mod payroll;
mod time_entry;

pub use absence::{AbsenceEntry, AbsenceType};
pub use agreement::{Agreement, AgreementType, AllowanceRates};
pub use employee::{
    AdrType, Capabilities, DriverLicense, Employee, JobCategory, RouteType, VehicleClass, WageType,
};
pub use pay_period::{PayPeriod, PublicHoliday};
pub use payroll::{
    AuditStep, AuditTrace, AuditWarning, ComponentType, PayrollCalculation, PayrollComponent,
    PayrollStatus, PayrollTotals,
};
pub use time_entry::{ApprovalStatus, EntryFlags, TimeEntry};

#[cfg(test)]
pub(crate) mod test_support {
    pub use super::absence::test_support::*;
    pub use super::agreement::test_support::*;
    pub use super::employee::test_support::*;
    pub use super::time_entry::test_support::*;
}
