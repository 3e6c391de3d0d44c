//! Check registry.
//!
//! Holds, per [`Phase`], an ordered and append-only list of checks. The
//! registry is built once during setup and then borrowed read-only by the
//! orchestrator for every run; checks cannot reach it.

use crate::engine::flatten::FieldDescriptor;
use crate::{IndexDocError, Phase, Severity};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Predicate over the data of one phase of one index: `(data, index name)`.
pub type IndexPredicate = dyn Fn(&Value, &str) -> Option<String> + Send + Sync;

/// Predicate over a single flattened field.
pub type FieldPredicate = dyn Fn(&FieldDescriptor) -> Option<String> + Send + Sync;

/// What a check inspects.
#[derive(Clone)]
pub enum Predicate {
    /// Phase data of one index
    Index(Arc<IndexPredicate>),
    /// One field of the flattened mappings
    Field(Arc<FieldPredicate>),
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Index(_) => f.write_str("Predicate::Index"),
            Predicate::Field(_) => f.write_str("Predicate::Field"),
        }
    }
}

/// A named, severity-tagged diagnostic rule.
///
/// A predicate returns `Some(message)` when it finds an issue. An empty
/// message counts as no issue. Predicates must be pure and must not panic.
#[derive(Debug, Clone)]
pub struct Check {
    name: String,
    severity: Severity,
    predicate: Predicate,
}

impl Check {
    /// Check over phase data: `f(data, index_name)`
    pub fn index<F>(name: impl Into<String>, severity: Severity, f: F) -> Self
    where
        F: Fn(&Value, &str) -> Option<String> + Send + Sync + 'static,
    {
        Check {
            name: name.into(),
            severity,
            predicate: Predicate::Index(Arc::new(f)),
        }
    }

    /// Check over one flattened field
    pub fn field<F>(name: impl Into<String>, severity: Severity, f: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> Option<String> + Send + Sync + 'static,
    {
        Check {
            name: name.into(),
            severity,
            predicate: Predicate::Field(Arc::new(f)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Severity reported when the predicate yields a message
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn fits(&self, phase: Phase) -> bool {
        match self.predicate {
            Predicate::Index(_) => !phase.is_field_phase(),
            Predicate::Field(_) => phase.is_field_phase(),
        }
    }
}

/// Ordered, append-only checks per phase.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    phases: BTreeMap<Phase, Vec<Check>>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        CheckRegistry::default()
    }

    /// Append `checks`, in order, to the phase named `phase`.
    ///
    /// Fails with `UnknownPhase` for names outside the fixed phase set and
    /// with `PhaseMismatch` when a predicate kind does not fit the phase.
    /// Nothing is registered when an error is returned.
    pub fn register(&mut self, phase: &str, checks: Vec<Check>) -> Result<&mut Self, IndexDocError> {
        let phase: Phase = phase.parse()?;
        self.register_phase(phase, checks)
    }

    /// Append `checks`, in order, to `phase`.
    pub fn register_phase(
        &mut self,
        phase: Phase,
        checks: Vec<Check>,
    ) -> Result<&mut Self, IndexDocError> {
        if let Some(check) = checks.iter().find(|c| !c.fits(phase)) {
            return Err(IndexDocError::PhaseMismatch {
                phase,
                check: check.name.clone(),
            });
        }

        tracing::debug!(phase = %phase, count = checks.len(), "registering checks");
        self.phases.entry(phase).or_default().extend(checks);
        Ok(self)
    }

    /// Checks of `phase` in registration order
    pub fn checks_for(&self, phase: Phase) -> &[Check] {
        self.phases.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every check with its phase, in phase order then registration order
    pub fn iter(&self) -> impl Iterator<Item = (Phase, &Check)> {
        self.phases
            .iter()
            .flat_map(|(phase, checks)| checks.iter().map(move |c| (*phase, c)))
    }

    /// Total number of registered checks
    pub fn len(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
