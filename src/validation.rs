//! Policy validation results.
//!
//! Calculators never fail on a policy limit. They compute what is payable and
//! report violations through a [`ValidationResult`], which the caller checks
//! before persisting anything.

use serde::{Deserialize, Serialize};

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable code (e.g. "SICKNESS_DOCTOR_NOTE_REQUIRED").
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// Errors block persistence; warnings are informational.
///
/// # Example
///
/// ```
/// use transport_pay_engine::validation::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// result.push_warning("KM_CAP_EXCEEDED", "812 km driven, 800 km paid");
/// assert!(result.is_valid);
///
/// result.push_error("LICENSE_EXPIRED", "license expired 2025-02-28");
/// assert!(!result.is_valid);
/// assert!(result.has_error("LICENSE_EXPIRED"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False as soon as one error is recorded.
    pub is_valid: bool,
    /// Blocking findings.
    pub errors: Vec<ValidationIssue>,
    /// Informational findings.
    pub warnings: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a blocking error.
    pub fn push_error(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(ValidationIssue {
            code: code.into(),
            message: message.into(),
        });
    }

    /// Records a warning.
    pub fn push_warning(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            code: code.into(),
            message: message.into(),
        });
    }

    /// Returns true if an error with this code was recorded.
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    /// Returns true if a warning with this code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|issue| issue.code == code)
    }

    /// Appends every finding of `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Error messages joined with "; ".
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|issue| format!("{}: {}", issue.code, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_warning_keeps_result_valid() {
        let mut result = ValidationResult::new();
        result.push_warning("SHIFT_LONG", "13 hours");
        assert!(result.is_valid);
        assert!(result.has_warning("SHIFT_LONG"));
        assert!(!result.has_error("SHIFT_LONG"));
    }

    #[test]
    fn test_merge_propagates_invalidity() {
        let mut first = ValidationResult::new();
        let mut second = ValidationResult::new();
        second.push_error("A", "a");
        second.push_warning("B", "b");
        first.merge(second);

        assert!(!first.is_valid);
        assert_eq!(first.errors.len(), 1);
        assert_eq!(first.warnings.len(), 1);
    }

    #[test]
    fn test_error_summary() {
        let mut result = ValidationResult::new();
        result.push_error("A", "first");
        result.push_error("B", "second");
        assert_eq!(result.error_summary(), "A: first; B: second");
    }
}
