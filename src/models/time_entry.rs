//! Time entry model.
//!
//! A [`TimeEntry`] is one worked interval registered by an employee. Entries
//! move from pending to approved or rejected; only approved entries are
//! considered by payroll.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Approval state of a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a supervisor decision.
    Pending,
    /// Approved and payroll-eligible.
    Approved,
    /// Rejected; never paid.
    Rejected,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Markers that drive the premium buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFlags {
    /// Worked at night.
    #[serde(default)]
    pub night: bool,
    /// Worked on a weekend.
    #[serde(default)]
    pub weekend: bool,
    /// Worked on a public holiday.
    #[serde(default)]
    pub holiday: bool,
    /// Shifted (irregular) working time.
    #[serde(default)]
    pub irregular: bool,
}

/// One worked interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee who worked the interval.
    pub employee_id: String,
    /// The calendar day the entry is booked on.
    pub date: NaiveDate,
    /// Start of the interval in the employer's local offset.
    pub start: DateTime<FixedOffset>,
    /// End of the interval; `None` while the entry is still open.
    #[serde(default)]
    pub end: Option<DateTime<FixedOffset>>,
    /// Unpaid break minutes inside the interval.
    #[serde(default)]
    pub break_minutes: u32,
    /// Premium markers.
    #[serde(default)]
    pub flags: EntryFlags,
    /// Free-text task type (e.g. "distribution", "terminal").
    #[serde(default)]
    pub task_type: String,
    /// Approval state.
    pub status: ApprovalStatus,
}

impl TimeEntry {
    /// Net worked minutes: end − start − break, never negative.
    ///
    /// An open entry (no end) or a zero-length interval yields zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use transport_pay_engine::models::{ApprovalStatus, EntryFlags, TimeEntry};
    /// use chrono::{DateTime, NaiveDate};
    ///
    /// let entry = TimeEntry {
    ///     id: "te_001".to_string(),
    ///     employee_id: "emp_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
    ///     start: DateTime::parse_from_rfc3339("2025-03-04T07:00:00+01:00").unwrap(),
    ///     end: Some(DateTime::parse_from_rfc3339("2025-03-04T15:30:00+01:00").unwrap()),
    ///     break_minutes: 30,
    ///     flags: EntryFlags::default(),
    ///     task_type: "distribution".to_string(),
    ///     status: ApprovalStatus::Approved,
    /// };
    /// assert_eq!(entry.net_minutes(), 480);
    /// ```
    pub fn net_minutes(&self) -> i64 {
        let Some(end) = self.end else {
            return 0;
        };
        let gross = (end - self.start).num_minutes();
        (gross - i64::from(self.break_minutes)).max(0)
    }

    /// Net worked hours as a Decimal.
    pub fn net_hours(&self) -> Decimal {
        Decimal::from(self.net_minutes()) / Decimal::from(60)
    }

    /// Returns true if the entry may be paid.
    pub fn is_payroll_eligible(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Approves a pending entry.
    pub fn approve(&mut self) -> EngineResult<()> {
        self.transition(ApprovalStatus::Approved)
    }

    /// Rejects a pending entry.
    pub fn reject(&mut self) -> EngineResult<()> {
        self.transition(ApprovalStatus::Rejected)
    }

    fn transition(&mut self, to: ApprovalStatus) -> EngineResult<()> {
        if self.status != ApprovalStatus::Pending {
            return Err(EngineError::InvalidTransition {
                entity: format!("time entry {}", self.id),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
