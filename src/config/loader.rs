//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading agreement
//! versions and entitlement policies from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::entitlement::{
    CompetenceCalculator, CrossBorderCalculator, ParentalCalculator, SicknessCalculator,
    WarehouseCalculator, WasteCalculator,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{Agreement, AgreementType};

use super::agreement_book::AgreementBook;
use super::types::{EngineMetadata, EntitlementPolicies};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/transport/
/// ├── engine.yaml          # Configuration set metadata
/// ├── entitlements.yaml    # Calculator policy tables
/// └── agreements/
///     └── transport_2025.yaml  # One agreement version per file
/// ```
///
/// # Example
///
/// ```no_run
/// use transport_pay_engine::config::ConfigLoader;
/// use transport_pay_engine::models::AgreementType;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/transport").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
/// let agreement = loader.agreement_on(AgreementType::Transport, date).unwrap();
/// println!("Base rate: {} DKK", agreement.base_hourly_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    metadata: EngineMetadata,
    agreements: AgreementBook,
    policies: EntitlementPolicies,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// * `ConfigNotFound` if a required file or the agreements directory is missing
    /// * `ConfigParseError` if a file contains invalid YAML
    /// * `ConflictingAgreements` if two active versions of a type overlap
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<EngineMetadata>(&path.join("engine.yaml"))?;
        let agreements = AgreementBook::new(Self::load_agreements(&path.join("agreements"))?)?;
        let policies = Self::load_yaml::<EntitlementPolicies>(&path.join("entitlements.yaml"))?;

        info!(
            config = %metadata.code,
            agreements = agreements.len(),
            "Loaded engine configuration"
        );

        Ok(Self {
            metadata,
            agreements,
            policies,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every agreement file from the agreements directory.
    fn load_agreements(dir: &Path) -> EngineResult<Vec<Agreement>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut agreements = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let agreement = Self::load_yaml::<Agreement>(&path)?;
                debug!(agreement_id = %agreement.id, file = %path.display(), "Loaded agreement");
                agreements.push(agreement);
            }
        }

        if agreements.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no agreement files found)", dir_str),
            });
        }

        Ok(agreements)
    }

    /// Returns the configuration set metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns every loaded agreement version.
    pub fn agreements(&self) -> &AgreementBook {
        &self.agreements
    }

    /// Returns the entitlement policy tables.
    pub fn policies(&self) -> &EntitlementPolicies {
        &self.policies
    }

    /// The active agreement of a type on a date.
    pub fn agreement_on(
        &self,
        agreement_type: AgreementType,
        date: NaiveDate,
    ) -> EngineResult<&Agreement> {
        self.agreements.active_for(agreement_type, date)
    }

    /// A sickness calculator over the loaded agreements and policy.
    pub fn sickness_calculator(&self) -> SicknessCalculator {
        SicknessCalculator::new(self.agreements.clone(), self.policies.sickness.clone())
    }

    /// A parental leave calculator over the loaded agreements and policy.
    pub fn parental_calculator(&self) -> ParentalCalculator {
        ParentalCalculator::new(self.agreements.clone(), self.policies.parental.clone())
    }

    /// A competence development and care day calculator.
    pub fn competence_calculator(&self) -> CompetenceCalculator {
        CompetenceCalculator::new(self.agreements.clone(), self.policies.competence.clone())
    }

    /// A cross-border driving calculator.
    pub fn cross_border_calculator(&self) -> CrossBorderCalculator {
        CrossBorderCalculator::new(self.policies.cross_border.clone())
    }

    /// A waste collection piece-rate calculator.
    pub fn waste_calculator(&self) -> WasteCalculator {
        WasteCalculator::new(self.policies.waste_collection.clone())
    }

    /// A warehouse shift calculator.
    pub fn warehouse_calculator(&self) -> WarehouseCalculator {
        WarehouseCalculator::new(self.policies.warehouse.clone())
    }
}
