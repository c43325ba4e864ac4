//! Configuration types for the pay engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::{Deserialize, Serialize};

use crate::entitlement::{
    CompetencePolicy, CrossBorderPolicy, ParentalPolicy, SicknessPolicy, WarehousePolicy,
    WastePolicy,
};

/// Metadata about the engine configuration set.
///
/// Identifies which collective agreement family the files describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineMetadata {
    /// Short code of the configuration set (e.g. "dk_transport").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Jurisdiction the agreements apply in.
    pub jurisdiction: String,
    /// ISO currency code for all amounts.
    pub currency: String,
    /// Version or effective date of the set.
    pub version: String,
    /// Where the agreement texts are published.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Policy tables for every entitlement calculator.
///
/// Sections left out of `entitlements.yaml` keep their built-in values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementPolicies {
    /// Sick pay.
    pub sickness: SicknessPolicy,
    /// Parental leave.
    pub parental: ParentalPolicy,
    /// Cross-border driving.
    pub cross_border: CrossBorderPolicy,
    /// Waste collection piece rates.
    pub waste_collection: WastePolicy,
    /// Warehouse and terminal shifts.
    pub warehouse: WarehousePolicy,
    /// Competence development and care days.
    pub competence: CompetencePolicy,
}
