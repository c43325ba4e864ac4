//! Error types for the pay engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every fatal condition that aborts a calculation. Policy violations
//! (caps, notice periods, overlaps) are not errors; they are reported through
//! [`crate::validation::ValidationResult`].

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the pay engine.
///
/// # Example
///
/// ```
/// use transport_pay_engine::error::EngineError;
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No employee record exists for the given id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The id that could not be resolved.
        employee_id: String,
    },

    /// No active agreement of the requested type covers the date.
    #[error("No active '{agreement_type}' agreement on {date}")]
    AgreementNotFound {
        /// The agreement type that was requested.
        agreement_type: String,
        /// The date the agreement had to cover.
        date: NaiveDate,
    },

    /// Two active agreements of the same type cover the same date.
    #[error("Agreements '{first}' and '{second}' of type '{agreement_type}' overlap")]
    ConflictingAgreements {
        /// The agreement type with overlapping versions.
        agreement_type: String,
        /// The id of the earlier agreement.
        first: String,
        /// The id of the later agreement.
        second: String,
    },

    /// A date range ends before it starts.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// The start of the range.
        start: NaiveDate,
        /// The end of the range.
        end: NaiveDate,
    },

    /// A time entry or shift was structurally invalid.
    #[error("Invalid time entry '{entry_id}': {message}")]
    InvalidTimeEntry {
        /// The id of the invalid entry.
        entry_id: String,
        /// A description of what made the entry invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A lifecycle transition was not allowed from the current state.
    #[error("Cannot move {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        /// The kind of record being transitioned.
        entity: String,
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
    },

    /// An absence of this type and start date has already been recorded.
    #[error("Absence '{absence_type}' starting {start} already recorded for employee {employee_id}")]
    AbsenceAlreadyRecorded {
        /// The employee the absence belongs to.
        employee_id: String,
        /// The absence type.
        absence_type: String,
        /// The first day of the absence.
        start: NaiveDate,
    },

    /// A calculation with blocking validation errors was used where a valid one is required.
    #[error("Validation failed with {count} error(s): {summary}")]
    ValidationFailed {
        /// The number of blocking errors.
        count: usize,
        /// The error messages joined together.
        summary: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_agreement_not_found_displays_type_and_date() {
        let error = EngineError::AgreementNotFound {
            agreement_type: "transport".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "No active 'transport' agreement on 2025-03-01"
        );
    }

    #[test]
    fn test_invalid_date_range_displays_both_dates() {
        let error = EngineError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid date range: 2025-03-10 is after 2025-03-01"
        );
    }

    #[test]
    fn test_invalid_transition_displays_states() {
        let error = EngineError::InvalidTransition {
            entity: "leave request".to_string(),
            from: "rejected".to_string(),
            to: "completed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot move leave request from 'rejected' to 'completed'"
        );
    }

    #[test]
    fn test_validation_failed_displays_count() {
        let error = EngineError::ValidationFailed {
            count: 2,
            summary: "a; b".to_string(),
        };
        assert_eq!(error.to_string(), "Validation failed with 2 error(s): a; b");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_employee() -> EngineResult<()> {
            Err(EngineError::EmployeeNotFound {
                employee_id: "emp_001".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_employee()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
