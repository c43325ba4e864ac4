//! Payroll calculation result models.
//!
//! This module contains the [`PayrollCalculation`] type and its associated structures
//! that capture all outputs from a payroll run: itemized components with their
//! legal references, aggregated totals, the audit trace and the review/export
//! lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;
use crate::error::{EngineError, EngineResult};

/// The kind of a payroll component.
///
/// # Example
///
/// ```
/// use transport_pay_engine::models::ComponentType;
///
/// assert!(ComponentType::OvertimeTier1.counts_toward_gross());
/// assert!(!ComponentType::VacationPay.counts_toward_gross());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Regular hours at the (youth adjusted) base rate.
    BaseWage,
    /// Regular hours at one hourly allowance.
    Allowance,
    /// First overtime tier.
    OvertimeTier1,
    /// Second overtime tier.
    OvertimeTier2,
    /// Night and shifted-time supplement.
    Night,
    /// Weekend premium.
    Weekend,
    /// Public holiday premium.
    Holiday,
    /// Special allowance (free choice account).
    SpecialAllowance,
    /// Employer pension contribution.
    PensionEmployer,
    /// Employee pension contribution (withheld).
    PensionEmployee,
    /// Vacation pay or vacation supplement accrual.
    VacationPay,
}

impl ComponentType {
    /// Returns true if the component is part of the gross pay.
    ///
    /// Pension contributions and vacation accrual are reported separately.
    pub fn counts_toward_gross(self) -> bool {
        !matches!(
            self,
            ComponentType::PensionEmployer
                | ComponentType::PensionEmployee
                | ComponentType::VacationPay
        )
    }
}

/// A single itemized line of a payroll calculation.
///
/// # Example
///
/// ```
/// use transport_pay_engine::models::{ComponentType, PayrollComponent};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let component = PayrollComponent {
///     component_type: ComponentType::BaseWage,
///     description: "Grundløn".to_string(),
///     hours: Some(Decimal::from_str("7.4").unwrap()),
///     rate: Decimal::from_str("160.00").unwrap(),
///     amount: Decimal::from_str("1184.00").unwrap(),
///     legal_reference: "§ 4 Løn".to_string(),
/// };
/// assert!(component.component_type.counts_toward_gross());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollComponent {
    /// The kind of component.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Human-readable description.
    pub description: String,
    /// Hours the rate was applied to; `None` for percentage components.
    pub hours: Option<Decimal>,
    /// The hourly rate, or the percentage for percentage components.
    pub rate: Decimal,
    /// The amount, rounded to two decimals.
    pub amount: Decimal,
    /// Citation of the agreement clause.
    pub legal_reference: String,
}

/// Aggregated totals for a payroll calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Regular hours.
    pub regular_hours: Decimal,
    /// First-tier overtime hours.
    pub overtime_tier1_hours: Decimal,
    /// Second-tier overtime hours.
    pub overtime_tier2_hours: Decimal,
    /// Night/shifted-time hours.
    pub night_hours: Decimal,
    /// Weekend hours.
    pub weekend_hours: Decimal,
    /// Public holiday hours.
    pub holiday_hours: Decimal,
    /// Youth percentage applied to the base rate.
    pub youth_percentage: Decimal,
    /// Base rate × youth percentage + allowances.
    pub effective_hourly_wage: Decimal,
    /// Base wage plus allowances for regular hours.
    pub base_pay: Decimal,
    /// Both overtime tiers.
    pub overtime_pay: Decimal,
    /// Night supplement.
    pub night_pay: Decimal,
    /// Weekend premium.
    pub weekend_pay: Decimal,
    /// Holiday premium.
    pub holiday_pay: Decimal,
    /// Base for the percentage components.
    pub vacation_eligible_pay: Decimal,
    /// Special allowance.
    pub special_allowance: Decimal,
    /// Employer pension contribution.
    pub pension_employer: Decimal,
    /// Employee pension contribution.
    pub pension_employee: Decimal,
    /// Vacation pay accrual.
    pub vacation_pay: Decimal,
    /// Sum of every component that counts toward gross.
    pub total_gross_pay: Decimal,
    /// Gross pay plus employer pension and vacation accrual.
    pub total_employer_cost: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the agreement clause for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Review and export state of a payroll calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Freshly calculated.
    PendingReview,
    /// Approved by a payroll officer.
    Approved,
    /// Handed to the external payroll system.
    Exported,
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollStatus::PendingReview => write!(f, "pending_review"),
            PayrollStatus::Approved => write!(f, "approved"),
            PayrollStatus::Exported => write!(f, "exported"),
        }
    }
}

/// The complete result of one employee's payroll for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The ID of the employee the calculation is for.
    pub employee_id: String,
    /// The agreement version that was applied.
    pub agreement_id: String,
    /// The pay period for this calculation.
    pub period: PayPeriod,
    /// Aggregated totals.
    pub totals: PayrollTotals,
    /// Itemized components in presentation order.
    pub components: Vec<PayrollComponent>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
    /// Review/export state.
    pub status: PayrollStatus,
    /// When the calculation was exported.
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    /// Reference assigned by the receiving payroll system.
    #[serde(default)]
    pub export_reference: Option<String>,
}

impl PayrollCalculation {
    /// Sum of all components that count toward gross pay.
    pub fn gross_from_components(&self) -> Decimal {
        self.components
            .iter()
            .filter(|c| c.component_type.counts_toward_gross())
            .map(|c| c.amount)
            .sum()
    }

    /// Moves a calculation from pending review to approved.
    pub fn approve(&mut self) -> EngineResult<()> {
        if self.status != PayrollStatus::PendingReview {
            return Err(self.illegal(PayrollStatus::Approved));
        }
        self.status = PayrollStatus::Approved;
        Ok(())
    }

    /// Marks an approved calculation as exported.
    pub fn mark_exported(
        &mut self,
        reference: impl Into<String>,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        if self.status != PayrollStatus::Approved {
            return Err(self.illegal(PayrollStatus::Exported));
        }
        self.status = PayrollStatus::Exported;
        self.exported_at = Some(at);
        self.export_reference = Some(reference.into());
        Ok(())
    }

    fn illegal(&self, to: PayrollStatus) -> EngineError {
        EngineError::InvalidTransition {
            entity: format!("payroll calculation {}", self.calculation_id),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn component(component_type: ComponentType, amount: &str) -> PayrollComponent {
        PayrollComponent {
            component_type,
            description: "test".to_string(),
            hours: None,
            rate: Decimal::ZERO,
            amount: dec(amount),
            legal_reference: "§ 0".to_string(),
        }
    }

    fn sample_calculation() -> PayrollCalculation {
        PayrollCalculation {
            calculation_id: Uuid::new_v4(),
            calculated_at: Utc::now(),
            engine_version: "0.1.0".to_string(),
            employee_id: "emp_001".to_string(),
            agreement_id: "transport_2025".to_string(),
            period: PayPeriod::new(
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            ),
            totals: PayrollTotals::default(),
            components: vec![
                component(ComponentType::BaseWage, "1184.00"),
                component(ComponentType::OvertimeTier1, "138.00"),
                component(ComponentType::PensionEmployer, "105.76"),
                component(ComponentType::VacationPay, "165.25"),
                component(ComponentType::SpecialAllowance, "118.98"),
            ],
            audit_trace: AuditTrace::default(),
            status: PayrollStatus::PendingReview,
            exported_at: None,
            export_reference: None,
        }
    }

    /// PC-001: gross excludes pension and vacation
    #[test]
    fn test_gross_from_components_excludes_accruals() {
        let calculation = sample_calculation();
        assert_eq!(calculation.gross_from_components(), dec("1440.98"));
    }

    /// PC-002: approve then export
    #[test]
    fn test_lifecycle_approve_then_export() {
        let mut calculation = sample_calculation();
        calculation.approve().unwrap();
        let at = Utc::now();
        calculation.mark_exported("DL-2025-03-0042", at).unwrap();

        assert_eq!(calculation.status, PayrollStatus::Exported);
        assert_eq!(calculation.exported_at, Some(at));
        assert_eq!(
            calculation.export_reference.as_deref(),
            Some("DL-2025-03-0042")
        );
    }

    /// PC-003: cannot export before approval
    #[test]
    fn test_export_requires_approval() {
        let mut calculation = sample_calculation();
        let err = calculation.mark_exported("x", Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert_eq!(calculation.status, PayrollStatus::PendingReview);
        assert!(calculation.exported_at.is_none());
    }

    /// PC-004: cannot approve twice
    #[test]
    fn test_approve_twice_fails() {
        let mut calculation = sample_calculation();
        calculation.approve().unwrap();
        assert!(calculation.approve().is_err());
    }

    #[test]
    fn test_component_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ComponentType::OvertimeTier2).unwrap(),
            "\"overtime_tier2\""
        );
        assert_eq!(
            serde_json::to_string(&ComponentType::PensionEmployer).unwrap(),
            "\"pension_employer\""
        );
    }

    #[test]
    fn test_component_serializes_type_field() {
        let json = serde_json::to_string(&component(ComponentType::Night, "60.00")).unwrap();
        assert!(json.contains("\"type\":\"night\""));
        assert!(json.contains("\"amount\":\"60.00\""));
    }
}
