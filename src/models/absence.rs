//! Absence entry model.
//!
//! An [`AbsenceEntry`] is the persisted outcome of an entitlement
//! calculation. It is created once by the owning calculator and afterwards
//! only closed (end date set, amount recomputed), never re-created.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The kind of leave or absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceType {
    /// Own illness.
    Sickness,
    /// Birthing parent maternity leave.
    BirthingParent,
    /// Non-birthing parent leave around the birth.
    NonBirthingParent,
    /// Social parent (same-sex co-parent) leave.
    SocialParent,
    /// Pregnancy-related absence before maternity leave.
    PregnancyRelated,
    /// Education chosen by the employee.
    SelfSelectedEducation,
    /// Education agreed with the employer.
    AgreedEducation,
    /// Child's first sick day(s).
    ChildCare,
    /// Care days for grandchildren.
    GrandchildCare,
    /// Hospitalised child.
    ChildHospitalization,
}

impl std::fmt::Display for AbsenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AbsenceType::Sickness => "sickness",
            AbsenceType::BirthingParent => "birthing_parent",
            AbsenceType::NonBirthingParent => "non_birthing_parent",
            AbsenceType::SocialParent => "social_parent",
            AbsenceType::PregnancyRelated => "pregnancy_related",
            AbsenceType::SelfSelectedEducation => "self_selected_education",
            AbsenceType::AgreedEducation => "agreed_education",
            AbsenceType::ChildCare => "child_care",
            AbsenceType::GrandchildCare => "grandchild_care",
            AbsenceType::ChildHospitalization => "child_hospitalization",
        };
        write!(f, "{}", name)
    }
}

/// One persisted leave/absence period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The absent employee.
    pub employee_id: String,
    /// The kind of absence.
    pub absence_type: AbsenceType,
    /// First day of absence.
    pub start_date: NaiveDate,
    /// Last day of absence; `None` while ongoing.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Counted days (work or calendar days depending on the type).
    pub days: Decimal,
    /// Whether the employer pays for the absence.
    pub paid: bool,
    /// The payable amount.
    pub payment_amount: Decimal,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
    /// Citation of the agreement clause.
    pub legal_reference: String,
}

impl AbsenceEntry {
    /// Returns true if the absence has no end date yet.
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// The last day covered, treating open absences as running through `as_of`.
    pub fn effective_end(&self, as_of: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(as_of)
    }

    /// Returns true if the absence shares at least one day with the range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let own_end = self.end_date.unwrap_or(NaiveDate::MAX);
        self.start_date <= end && start <= own_end
    }

    /// Returns a closed copy of an open absence with recomputed figures.
    ///
    /// # Examples
    ///
    /// ```
    /// use transport_pay_engine::models::{AbsenceEntry, AbsenceType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let open = AbsenceEntry {
    ///     id: Uuid::new_v4(),
    ///     employee_id: "emp_001".to_string(),
    ///     absence_type: AbsenceType::Sickness,
    ///     start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
    ///     end_date: None,
    ///     days: Decimal::ZERO,
    ///     paid: true,
    ///     payment_amount: Decimal::ZERO,
    ///     note: String::new(),
    ///     legal_reference: "§ 16 Sygdom".to_string(),
    /// };
    /// let closed = open
    ///     .close(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), Decimal::from(3), Decimal::from(3600))
    ///     .unwrap();
    /// assert!(!closed.is_open());
    /// assert_eq!(closed.id, open.id);
    /// ```
    pub fn close(
        &self,
        end_date: NaiveDate,
        days: Decimal,
        payment_amount: Decimal,
    ) -> EngineResult<AbsenceEntry> {
        if let Some(existing) = self.end_date {
            return Err(EngineError::InvalidTransition {
                entity: format!("absence {}", self.id),
                from: format!("closed on {}", existing),
                to: format!("closed on {}", end_date),
            });
        }
        if end_date < self.start_date {
            return Err(EngineError::InvalidDateRange {
                start: self.start_date,
                end: end_date,
            });
        }
        Ok(AbsenceEntry {
            end_date: Some(end_date),
            days,
            payment_amount,
            ..self.clone()
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::absence;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlap_detection() {
        let entry = absence(
            AbsenceType::ChildCare,
            date(2025, 3, 3),
            Some(date(2025, 3, 4)),
            2,
        );
        assert!(entry.overlaps(date(2025, 3, 4), date(2025, 3, 10)));
        assert!(entry.overlaps(date(2025, 2, 1), date(2025, 3, 3)));
        assert!(!entry.overlaps(date(2025, 3, 5), date(2025, 3, 6)));
    }

    #[test]
    fn test_open_absence_overlaps_everything_after_start() {
        let entry = absence(AbsenceType::Sickness, date(2025, 3, 3), None, 0);
        assert!(entry.overlaps(date(2026, 1, 1), date(2026, 1, 2)));
        assert!(!entry.overlaps(date(2025, 3, 1), date(2025, 3, 2)));
    }

    #[test]
    fn test_close_twice_fails() {
        let entry = absence(AbsenceType::Sickness, date(2025, 3, 3), None, 0);
        let closed = entry
            .close(date(2025, 3, 7), Decimal::from(5), Decimal::from(6000))
            .unwrap();
        assert!(matches!(
            closed.close(date(2025, 3, 8), Decimal::from(6), Decimal::from(7200)),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_close_before_start_fails() {
        let entry = absence(AbsenceType::Sickness, date(2025, 3, 3), None, 0);
        assert!(matches!(
            entry.close(date(2025, 3, 2), Decimal::ZERO, Decimal::ZERO),
            Err(EngineError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_effective_end_of_open_absence() {
        let entry = absence(AbsenceType::Sickness, date(2025, 3, 3), None, 0);
        assert_eq!(entry.effective_end(date(2025, 3, 9)), date(2025, 3, 9));
    }

    #[test]
    fn test_absence_type_display_matches_serde() {
        assert_eq!(
            AbsenceType::ChildHospitalization.to_string(),
            "child_hospitalization"
        );
        assert_eq!(
            serde_json::to_string(&AbsenceType::SelfSelectedEducation).unwrap(),
            "\"self_selected_education\""
        );
    }
}
