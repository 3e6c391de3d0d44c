//! Check execution.
//!
//! Two evaluation shapes:
//! - [`run_checks`] runs every check of a phase against that phase's data
//!   for one index and folds the outcomes into a phase severity.
//! - [`check_fields`] runs one field check against every flattened field of
//!   one index and folds all messages into a single outcome.
//!
//! Predicates are called directly. A predicate that panics is a defect in
//! the check and is left to unwind.

use crate::engine::flatten::FlatIndex;
use crate::engine::registry::{Check, Predicate};
use crate::Severity;
use serde_json::Value;

/// Result of one check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    /// Declared severity when a message was produced, green otherwise
    pub severity: Severity,
    pub message: Option<String>,
}

impl CheckOutcome {
    fn new(check: &Check, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.is_empty());
        let severity = if message.is_some() {
            check.severity()
        } else {
            Severity::Green
        };
        CheckOutcome {
            name: check.name().to_string(),
            severity,
            message,
        }
    }
}

/// Results of one phase for one index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseOutcome {
    /// Worst severity across `results`
    pub severity: Severity,
    /// One outcome per applicable check, in registration order
    pub results: Vec<CheckOutcome>,
}

/// Run `checks` against `data` for the index named `index`.
///
/// Field checks are not applicable to phase data and are passed over; the
/// registry never places them in a data phase.
pub fn run_checks(checks: &[Check], data: &Value, index: &str) -> PhaseOutcome {
    let results: Vec<CheckOutcome> = checks
        .iter()
        .filter_map(|check| match check.predicate() {
            Predicate::Index(f) => {
                let outcome = CheckOutcome::new(check, f(data, index));
                tracing::debug!(
                    index,
                    check = check.name(),
                    severity = %outcome.severity,
                    "check evaluated"
                );
                Some(outcome)
            }
            Predicate::Field(_) => None,
        })
        .collect();

    PhaseOutcome {
        severity: Severity::fold(results.iter().map(|r| r.severity)),
        results,
    }
}

/// Run the field check `check` against every field of every type in
/// `types`.
///
/// Types are visited in name order and fields in path order; every message
/// becomes one line of the combined outcome message.
pub fn check_fields(check: &Check, types: &FlatIndex) -> CheckOutcome {
    let Predicate::Field(f) = check.predicate() else {
        return CheckOutcome::new(check, None);
    };

    let messages: Vec<String> = types
        .values()
        .flat_map(|flat| flat.fields.values())
        .filter_map(|field| f(field))
        .filter(|m| !m.is_empty())
        .collect();

    let message = if messages.is_empty() {
        None
    } else {
        Some(messages.join("\n"))
    };
    CheckOutcome::new(check, message)
}
