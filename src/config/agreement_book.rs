//! Versioned agreement lookup.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{Agreement, AgreementType};

/// Every known agreement version, indexed by type and validity window.
///
/// At most one active version of a type may cover any given date; inserting
/// a version that would break this fails with `ConflictingAgreements`.
///
/// # Example
///
/// ```
/// use transport_pay_engine::config::AgreementBook;
/// use transport_pay_engine::models::AgreementType;
/// use chrono::NaiveDate;
///
/// let book = AgreementBook::default();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert!(book.active_for(AgreementType::Transport, date).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AgreementBook {
    /// Sorted by type, then by `valid_from`.
    agreements: Vec<Agreement>,
}

impl AgreementBook {
    /// Builds a book from a list of versions.
    pub fn new(agreements: Vec<Agreement>) -> EngineResult<Self> {
        let mut book = Self::default();
        for agreement in agreements {
            book.insert(agreement)?;
        }
        Ok(book)
    }

    /// Adds a version, rejecting overlaps with another active version of the same type.
    pub fn insert(&mut self, agreement: Agreement) -> EngineResult<()> {
        if agreement.active {
            if let Some(existing) = self
                .agreements
                .iter()
                .filter(|a| a.active && a.agreement_type == agreement.agreement_type)
                .find(|a| windows_overlap(a, &agreement))
            {
                return Err(EngineError::ConflictingAgreements {
                    agreement_type: agreement.agreement_type.to_string(),
                    first: existing.id.clone(),
                    second: agreement.id,
                });
            }
        }
        self.agreements.push(agreement);
        self.agreements
            .sort_by_key(|a| (a.agreement_type, a.valid_from));
        Ok(())
    }

    /// The active version of `agreement_type` in force on `date`.
    pub fn active_for(
        &self,
        agreement_type: AgreementType,
        date: NaiveDate,
    ) -> EngineResult<&Agreement> {
        self.agreements
            .iter()
            .find(|a| a.agreement_type == agreement_type && a.is_active_on(date))
            .ok_or_else(|| EngineError::AgreementNotFound {
                agreement_type: agreement_type.to_string(),
                date,
            })
    }

    /// Looks a version up by id.
    pub fn get(&self, id: &str) -> Option<&Agreement> {
        self.agreements.iter().find(|a| a.id == id)
    }

    /// All versions.
    pub fn agreements(&self) -> &[Agreement] {
        &self.agreements
    }

    /// Number of versions.
    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    /// Returns true if no version is loaded.
    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

fn windows_overlap(a: &Agreement, b: &Agreement) -> bool {
    let a_end = a.valid_to.unwrap_or(NaiveDate::MAX);
    let b_end = b.valid_to.unwrap_or(NaiveDate::MAX);
    a.valid_from <= b_end && b.valid_from <= a_end
}
