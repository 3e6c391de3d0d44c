//! Report tree and aggregation.
//!
//! [`ReportBuilder`] consumes the event stream of a run and assembles the
//! [`Report`]: a list of top-level [`ReportNode`]s plus the abort error, if
//! any. Nodes are built bottom-up and never change once the builder has
//! finished.

use crate::engine::events::{ReportEvent, ReportSink};
use crate::Severity;
use serde::Serialize;

/// One node of the report tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportNode {
    /// Informational line
    Info { message: String },
    /// Outcome of one check; `lines` is empty when the check passed
    Result {
        severity: Severity,
        label: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        lines: Vec<String>,
    },
    /// Group of nodes, e.g. one index
    Section {
        label: String,
        severity: Severity,
        children: Vec<ReportNode>,
    },
}

impl ReportNode {
    /// Severity of the node; informational nodes are green
    pub fn severity(&self) -> Severity {
        match self {
            ReportNode::Info { .. } => Severity::Green,
            ReportNode::Result { severity, .. } | ReportNode::Section { severity, .. } => *severity,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ReportNode::Info { message } => message,
            ReportNode::Result { label, .. } | ReportNode::Section { label, .. } => label,
        }
    }

    /// Children of a section; empty for every other node
    pub fn children(&self) -> &[ReportNode] {
        match self {
            ReportNode::Section { children, .. } => children,
            _ => &[],
        }
    }
}

/// Section counts by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub green: u32,
    pub blue: u32,
    pub yellow: u32,
    pub red: u32,
    pub total: u32,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub nodes: Vec<ReportNode>,
    /// Abort reason; when set, no index sections were evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The run reached its completion marker
    pub completed: bool,
}

impl Report {
    /// Worst severity of any top-level node
    pub fn severity(&self) -> Severity {
        Severity::fold(self.nodes.iter().map(ReportNode::severity))
    }

    /// Top-level sections (one per index)
    pub fn sections(&self) -> impl Iterator<Item = &ReportNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n, ReportNode::Section { .. }))
    }

    /// Find a top-level section by label
    pub fn section(&self, label: &str) -> Option<&ReportNode> {
        self.sections().find(|n| n.label() == label)
    }

    /// Count top-level sections per severity
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();

        for section in self.sections() {
            summary.total += 1;
            match section.severity() {
                Severity::Green => summary.green += 1,
                Severity::Blue => summary.blue += 1,
                Severity::Yellow => summary.yellow += 1,
                Severity::Red => summary.red += 1,
            }
        }

        summary
    }
}

struct OpenSection {
    label: String,
    severity: Severity,
    children: Vec<ReportNode>,
}

/// Builds a [`Report`] from report events
#[derive(Default)]
pub struct ReportBuilder {
    open: Vec<OpenSection>,
    report: Report,
}

impl ReportBuilder {
    pub fn new() -> Self {
        ReportBuilder::default()
    }

    fn push(&mut self, node: ReportNode) {
        match self.open.last_mut() {
            Some(section) => section.children.push(node),
            None => self.report.nodes.push(node),
        }
    }

    fn close(&mut self) {
        if let Some(section) = self.open.pop() {
            self.push(ReportNode::Section {
                label: section.label,
                severity: section.severity,
                children: section.children,
            });
        }
    }

    /// Close any sections left open and return the report
    pub fn finish(mut self) -> Report {
        while !self.open.is_empty() {
            self.close();
        }
        self.report
    }
}

impl ReportSink for ReportBuilder {
    fn emit(&mut self, event: ReportEvent) {
        match event {
            ReportEvent::Info(message) => self.push(ReportNode::Info { message }),
            ReportEvent::StartSection(label) => self.open.push(OpenSection {
                label,
                severity: Severity::Green,
                children: Vec::new(),
            }),
            ReportEvent::Result {
                severity,
                label,
                message,
            } => {
                let lines = message
                    .map(|m| m.lines().map(str::to_string).collect())
                    .unwrap_or_default();
                self.push(ReportNode::Result {
                    severity,
                    label,
                    lines,
                });
            }
            ReportEvent::SetSectionSeverity(severity) => {
                if let Some(section) = self.open.last_mut() {
                    section.severity = severity;
                }
            }
            ReportEvent::EndSection => self.close(),
            ReportEvent::Error(message) => {
                while !self.open.is_empty() {
                    self.close();
                }
                self.report.error = Some(message);
            }
            ReportEvent::Done => self.report.completed = true,
        }
    }
}
