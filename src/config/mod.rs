//! Configuration loading and management for the pay engine.
//!
//! This module loads agreement versions and entitlement policy tables from
//! YAML files and keeps agreement versions in an [`AgreementBook`].
//!
//! # Example
//!
//! ```no_run
//! use transport_pay_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/transport").unwrap();
//! println!("Loaded: {}", config.metadata().name);
//! ```

mod agreement_book;
mod loader;
mod types;

pub use agreement_book::AgreementBook;
pub use loader::ConfigLoader;
pub use types::{EngineMetadata, EntitlementPolicies};
