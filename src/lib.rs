//! Wage and entitlement engine for Danish transport and logistics agreements
//!
//! This crate prices time entries against versioned collective agreements
//! (transport, warehouse, renovation and removals), composing hourly
//! allowances and producing payroll with an audit trail, and calculates
//! leave and special-pay entitlements: sickness, parental leave, competence
//! development and care days, cross-border driving, waste collection piece
//! rates and warehouse shifts.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod models;
pub mod validation;
