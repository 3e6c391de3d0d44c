//! Run orchestration.
//!
//! One run walks a fixed sequence:
//! 1. Report the cluster version
//! 2. Acquire the snapshot; a failure aborts the run with one error event
//! 3. Flatten the mappings and build the evaluation tree
//! 4. For every index (sorted by name): evaluate the data phases, then the
//!    field checks, and report the index severity on its section
//!
//! Missing phase data for an index is not an error; the phase is skipped.
//! Checks are not guarded: a panicking predicate unwinds through the run.

use crate::engine::events::ReportSink;
use crate::engine::flatten::{flatten, FlatMappings};
use crate::engine::path::resolve_segments;
use crate::engine::registry::CheckRegistry;
use crate::engine::runner::{self, CheckOutcome};
use crate::fetch::source::SnapshotSource;
use crate::{IndexDocError, Phase, Severity};
use serde_json::Value;

/// Label of the result listing field path collisions
pub const COLLISIONS_LABEL: &str = "Field path collisions";

/// Severities of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    /// Worst index severity, green when there are no indices
    pub severity: Severity,
    /// `(index name, aggregated severity)` in evaluation order
    pub indices: Vec<(String, Severity)>,
}

/// Drives one run against a borrowed registry.
pub struct Orchestrator<'a> {
    registry: &'a CheckRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a CheckRegistry) -> Self {
        Orchestrator { registry }
    }

    /// Run every registered check against the snapshot from `source`,
    /// emitting the report into `sink`.
    ///
    /// Returns the error that aborted the run after emitting it as the
    /// single error event; no index section is open or emitted at that
    /// point.
    pub fn run(
        &self,
        source: &dyn SnapshotSource,
        sink: &mut dyn ReportSink,
    ) -> Result<RunOutcome, IndexDocError> {
        tracing::info!(source = %source.describe(), "starting run");

        match source.cluster_version() {
            Ok(Some(version)) => {
                tracing::info!(version = %version, "cluster version");
                sink.result(
                    Severity::Green,
                    &format!("Elasticsearch version: {}", version),
                    None,
                );
            }
            Ok(None) => tracing::debug!("cluster version unknown"),
            Err(e) => return Err(abort(sink, e)),
        }

        let snapshot = match source.fetch_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(abort(sink, e)),
        };

        let flat = flatten(&snapshot.mappings);
        let tree = snapshot.to_value_with(&flat);
        let indices = snapshot.index_names();
        tracing::info!(indices = indices.len(), checks = self.registry.len(), "evaluating");

        let mut outcome = RunOutcome::default();
        if indices.is_empty() {
            sink.info("No indices found");
        }

        for index in indices {
            let severity = self.check_index(&tree, &flat, &index, sink);
            outcome.severity = outcome.severity.combine(severity);
            outcome.indices.push((index, severity));
        }

        sink.done();
        Ok(outcome)
    }

    fn check_index(
        &self,
        tree: &Value,
        flat: &FlatMappings,
        index: &str,
        sink: &mut dyn ReportSink,
    ) -> Severity {
        sink.start_section(&format!("Index: {}", index));
        let mut severity = Severity::Green;

        for phase in Phase::DATA_PHASES {
            let Some(data) = phase_data(tree, phase, index) else {
                tracing::debug!(index, phase = %phase, "no data for phase");
                continue;
            };

            let outcome = runner::run_checks(self.registry.checks_for(phase), data, index);
            tracing::debug!(index, phase = %phase, severity = %outcome.severity, "phase evaluated");
            for result in &outcome.results {
                emit(sink, result);
            }
            severity = severity.combine(outcome.severity);
        }

        if let Some(types) = flat.index(index) {
            let collisions = flat.collisions(index);
            if !collisions.is_empty() {
                let lines: Vec<String> = collisions
                    .iter()
                    .map(|c| format!("`{}` is defined more than once", c.qualified_name))
                    .collect();
                sink.result(Severity::Red, COLLISIONS_LABEL, Some(&lines.join("\n")));
                severity = Severity::Red;
            }

            for check in self.registry.checks_for(Phase::MappingFields) {
                let result = runner::check_fields(check, types);
                severity = severity.combine(result.severity);
                emit(sink, &result);
            }
        }

        sink.set_section_severity(severity);
        sink.end_section();
        severity
    }
}

/// Data of `phase` for `index`: `index.<namespace>.<index>`, narrowed to its
/// `<namespace>` child when present (the settings response nests the
/// settings under `settings`).
fn phase_data<'t>(tree: &'t Value, phase: Phase, index: &str) -> Option<&'t Value> {
    let namespace = phase.namespace();
    let data = resolve_segments(tree, &["index", namespace, index])?;
    Some(data.get(namespace).unwrap_or(data))
}

fn emit(sink: &mut dyn ReportSink, outcome: &CheckOutcome) {
    sink.result(outcome.severity, &outcome.name, outcome.message.as_deref());
}

fn abort(sink: &mut dyn ReportSink, error: IndexDocError) -> IndexDocError {
    tracing::warn!(error = %error, "snapshot acquisition failed");
    sink.error(&error.to_string());
    error
}
