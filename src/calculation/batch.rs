//! Parallel payroll runs for many employees sharing one period.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::calculation::payroll_aggregator::calculate_payroll;
use crate::config::AgreementBook;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayPeriod, PayrollCalculation, TimeEntry};

/// Per-employee outcomes of a batch run, keyed by employee id.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One result per employee id seen in the employees or the entries.
    pub results: BTreeMap<String, EngineResult<PayrollCalculation>>,
}

impl BatchOutcome {
    /// Successful calculations.
    pub fn succeeded(&self) -> impl Iterator<Item = &PayrollCalculation> {
        self.results.values().filter_map(|r| r.as_ref().ok())
    }

    /// Failed employee ids with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&String, &EngineError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id, e)))
    }
}

/// Calculates payroll for every employee in parallel.
///
/// Entries are grouped by employee id. Every employee gets a result, even
/// without entries; entries whose employee id has no record produce
/// `EmployeeNotFound` under that id. One failure never aborts the others.
pub fn calculate_batch(
    employees: &[Employee],
    agreements: &AgreementBook,
    period: &PayPeriod,
    entries: &[TimeEntry],
) -> BatchOutcome {
    let start_time = Instant::now();

    let mut by_employee: HashMap<&str, Vec<TimeEntry>> = HashMap::new();
    for entry in entries {
        by_employee
            .entry(entry.employee_id.as_str())
            .or_default()
            .push(entry.clone());
    }

    let computed: Vec<(String, EngineResult<PayrollCalculation>)> = employees
        .par_iter()
        .map(|employee| {
            let own = by_employee
                .get(employee.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            (
                employee.id.clone(),
                calculate_payroll(employee, agreements, period, own),
            )
        })
        .collect();

    let mut results: BTreeMap<String, EngineResult<PayrollCalculation>> =
        computed.into_iter().collect();

    for employee_id in by_employee.keys() {
        if !results.contains_key(*employee_id) {
            warn!(employee_id = %employee_id, "Time entries for unknown employee");
            results.insert(
                employee_id.to_string(),
                Err(EngineError::EmployeeNotFound {
                    employee_id: employee_id.to_string(),
                }),
            );
        }
    }

    let outcome = BatchOutcome { results };
    info!(
        employees = employees.len(),
        succeeded = outcome.succeeded().count(),
        failed = outcome.failed().count(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Payroll batch completed"
    );
    outcome
}
