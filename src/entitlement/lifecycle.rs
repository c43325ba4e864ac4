//! Leave request workflow.
//!
//! A request starts as `Requested` and is decided once. Approved leave is
//! completed when taken; postponed self-selected education can be
//! resubmitted with new dates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::ensure_range;
use crate::error::{EngineError, EngineResult};
use crate::models::AbsenceType;

/// Where a leave request is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Waiting for a decision.
    Requested,
    /// Granted.
    Approved,
    /// Refused.
    Rejected,
    /// Deferred by the employer.
    Postponed,
    /// Taken.
    Completed,
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LeaveStatus::Requested => "requested",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Postponed => "postponed",
            LeaveStatus::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before.
    pub from: LeaveStatus,
    /// Status after.
    pub to: LeaveStatus,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Free-text reason, empty when none was given.
    pub reason: String,
}

/// A leave request moving through approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Request id.
    pub id: Uuid,
    /// The employee.
    pub employee_id: String,
    /// Kind of leave.
    pub absence_type: AbsenceType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: LeaveStatus,
    /// Every status change, oldest first.
    pub history: Vec<StatusChange>,
}

impl LeaveRequest {
    /// Opens a new request.
    pub fn new(
        employee_id: impl Into<String>,
        absence_type: AbsenceType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Self> {
        ensure_range(start_date, end_date)?;
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            absence_type,
            start_date,
            end_date,
            status: LeaveStatus::Requested,
            history: Vec::new(),
        })
    }

    /// Grants the request.
    pub fn approve(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(LeaveStatus::Requested, LeaveStatus::Approved, at, String::new())
    }

    /// Refuses the request.
    pub fn reject(&mut self, at: DateTime<Utc>, reason: impl Into<String>) -> EngineResult<()> {
        self.transition(LeaveStatus::Requested, LeaveStatus::Rejected, at, reason.into())
    }

    /// Defers the request. Only self-selected education can be postponed.
    pub fn postpone(&mut self, at: DateTime<Utc>, reason: impl Into<String>) -> EngineResult<()> {
        if self.absence_type != AbsenceType::SelfSelectedEducation {
            return Err(self.illegal(LeaveStatus::Postponed));
        }
        self.transition(LeaveStatus::Requested, LeaveStatus::Postponed, at, reason.into())
    }

    /// Puts a postponed request back up for decision with new dates.
    pub fn resubmit(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        ensure_range(start_date, end_date)?;
        self.transition(
            LeaveStatus::Postponed,
            LeaveStatus::Requested,
            at,
            format!("moved to {} - {}", start_date, end_date),
        )?;
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(())
    }

    /// Marks approved leave as taken.
    pub fn complete(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(LeaveStatus::Approved, LeaveStatus::Completed, at, String::new())
    }

    fn transition(
        &mut self,
        required: LeaveStatus,
        to: LeaveStatus,
        at: DateTime<Utc>,
        reason: String,
    ) -> EngineResult<()> {
        if self.status != required {
            return Err(self.illegal(to));
        }
        info!(
            request_id = %self.id,
            employee_id = %self.employee_id,
            from = %self.status,
            to = %to,
            "Leave request status changed"
        );
        self.history.push(StatusChange {
            from: self.status,
            to,
            at,
            reason,
        });
        self.status = to;
        Ok(())
    }

    fn illegal(&self, to: LeaveStatus) -> EngineError {
        EngineError::InvalidTransition {
            entity: format!("leave request {}", self.id),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn request(absence_type: AbsenceType) -> LeaveRequest {
        LeaveRequest::new("emp_drv_001", absence_type, date(2025, 4, 7), date(2025, 4, 9)).unwrap()
    }

    /// LR-001: approve then complete
    #[test]
    fn test_lr_001_approve_and_complete() {
        let mut leave = request(AbsenceType::AgreedEducation);
        leave.approve(now()).unwrap();
        leave.complete(now()).unwrap();

        assert_eq!(leave.status, LeaveStatus::Completed);
        assert_eq!(leave.history.len(), 2);
        assert_eq!(leave.history[0].from, LeaveStatus::Requested);
        assert_eq!(leave.history[1].to, LeaveStatus::Completed);
    }

    /// LR-002: rejected leave cannot be completed
    #[test]
    fn test_lr_002_rejected_cannot_complete() {
        let mut leave = request(AbsenceType::ChildCare);
        leave.reject(now(), "staffing").unwrap();

        let err = leave.complete(now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition { ref from, ref to, .. }
                if from == "rejected" && to == "completed"
        ));
        assert_eq!(leave.history[0].reason, "staffing");
    }

    /// LR-003: only self-selected education can be postponed
    #[test]
    fn test_lr_003_postpone_only_education() {
        let mut leave = request(AbsenceType::AgreedEducation);
        assert!(leave.postpone(now(), "peak season").is_err());
        assert_eq!(leave.status, LeaveStatus::Requested);

        let mut leave = request(AbsenceType::SelfSelectedEducation);
        leave.postpone(now(), "peak season").unwrap();
        assert_eq!(leave.status, LeaveStatus::Postponed);
    }

    /// LR-004: postponed education resubmitted with new dates
    #[test]
    fn test_lr_004_resubmit_postponed() {
        let mut leave = request(AbsenceType::SelfSelectedEducation);
        leave.postpone(now(), "peak season").unwrap();
        assert!(leave.approve(now()).is_err());

        leave.resubmit(date(2025, 5, 5), date(2025, 5, 7), now()).unwrap();
        assert_eq!(leave.status, LeaveStatus::Requested);
        assert_eq!(leave.start_date, date(2025, 5, 5));
        leave.approve(now()).unwrap();
        assert_eq!(leave.history.len(), 3);
    }

    #[test]
    fn test_requested_cannot_complete() {
        let mut leave = request(AbsenceType::ChildCare);
        assert!(leave.complete(now()).is_err());
        assert!(leave.history.is_empty());
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let result = LeaveRequest::new(
            "emp_drv_001",
            AbsenceType::ChildCare,
            date(2025, 4, 9),
            date(2025, 4, 7),
        );
        assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
    }
}
