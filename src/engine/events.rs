//! Report event stream.
//!
//! The orchestrator never renders. It emits an ordered stream of events that
//! a sink turns into whatever it likes: a [`ReportBuilder`] tree, a recorded
//! `Vec<ReportEvent>` in tests, or a streaming printer.
//!
//! Within a run the stream is well nested: every `StartSection` is closed by
//! exactly one `EndSection`, `SetSectionSeverity` only appears inside a
//! section, and the stream ends with either `Done` or a single `Error`.
//!
//! [`ReportBuilder`]: crate::engine::result::ReportBuilder

use crate::Severity;

/// One event of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// Informational line outside any check
    Info(String),
    /// Open a nested section
    StartSection(String),
    /// Outcome of one check; `message` lines are separated by `\n`
    Result {
        severity: Severity,
        label: String,
        message: Option<String>,
    },
    /// Severity of the innermost open section
    SetSectionSeverity(Severity),
    /// Close the innermost open section
    EndSection,
    /// Run aborted
    Error(String),
    /// Run completed
    Done,
}

/// Consumer of report events.
pub trait ReportSink {
    fn emit(&mut self, event: ReportEvent);

    fn info(&mut self, message: &str) {
        self.emit(ReportEvent::Info(message.to_string()));
    }

    fn start_section(&mut self, label: &str) {
        self.emit(ReportEvent::StartSection(label.to_string()));
    }

    fn result(&mut self, severity: Severity, label: &str, message: Option<&str>) {
        self.emit(ReportEvent::Result {
            severity,
            label: label.to_string(),
            message: message.map(str::to_string),
        });
    }

    fn set_section_severity(&mut self, severity: Severity) {
        self.emit(ReportEvent::SetSectionSeverity(severity));
    }

    fn end_section(&mut self) {
        self.emit(ReportEvent::EndSection);
    }

    fn error(&mut self, message: &str) {
        self.emit(ReportEvent::Error(message.to_string()));
    }

    fn done(&mut self) {
        self.emit(ReportEvent::Done);
    }
}

/// Records every event, in order
impl ReportSink for Vec<ReportEvent> {
    fn emit(&mut self, event: ReportEvent) {
        self.push(event);
    }
}
