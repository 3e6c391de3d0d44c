//! Output formatting for index-doc.
//!
//! Provides terminal and JSON output formatters for a [`Report`].
//!
//! All formatters produce valid output for any report, including aborted
//! and empty ones.

use crate::cli::args::OutputFormat;
use crate::engine::result::{Report, ReportNode};
use crate::Severity;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Exit code when the run aborted
pub const EXIT_ERROR: i32 = 3;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a report into a string
    fn format(&self, report: &Report) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, quiet: bool) -> Self {
        TerminalFormatter { color, quiet }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn tag(&self, severity: Severity) -> String {
        match severity {
            Severity::Green => self.colorize("[ OK ]", "32"),
            Severity::Blue => self.colorize("[INFO]", "34"),
            Severity::Yellow => self.colorize("[WARN]", "33"),
            Severity::Red => self.colorize("[FAIL]", "31"),
        }
    }

    /// Render `code` spans in bold; without color the backticks stay
    fn highlight(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut open = false;
        for part in text.split('`') {
            if open {
                out.push_str(&self.colorize(part, "1"));
            } else {
                out.push_str(part);
            }
            open = !open;
        }
        out
    }

    fn write_node(&self, output: &mut String, node: &ReportNode, depth: usize) {
        let indent = "  ".repeat(depth);

        let passed = !matches!(node, ReportNode::Info { .. }) && node.severity() == Severity::Green;
        if self.quiet && passed {
            return;
        }

        match node {
            ReportNode::Info { message } => {
                output.push_str(&format!("{}{}\n", indent, self.highlight(message)));
            }
            ReportNode::Result {
                severity,
                label,
                lines,
            } => {
                output.push_str(&format!(
                    "{}{} {}\n",
                    indent,
                    self.tag(*severity),
                    self.highlight(label)
                ));
                for line in lines {
                    output.push_str(&format!("{}       - {}\n", indent, self.highlight(line)));
                }
            }
            ReportNode::Section {
                label,
                severity,
                children,
            } => {
                output.push_str(&format!("{}{} {}\n", indent, self.tag(*severity), label));
                for child in children {
                    self.write_node(output, child, depth + 1);
                }
            }
        }
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &Report) -> String {
        let mut output = String::new();

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str("index-doc report\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for node in &report.nodes {
            self.write_node(&mut output, node, 0);
        }

        if let Some(ref error) = report.error {
            output.push_str(&format!("{} {}\n", self.colorize("ERROR:", "31"), error));
        }
        output.push('\n');

        // Summary
        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} indices, {} green, {} blue, {} yellow, {} red\n",
            summary.total, summary.green, summary.blue, summary.yellow, summary.red
        ));

        let code = exit_code(report);
        let exit_desc = match code {
            EXIT_ERROR => "run aborted",
            1 => "problems that must be fixed",
            2 => "problems that should be fixed",
            _ => "no problems found",
        };
        output.push_str(&format!("Exit code: {} ({})\n", code, exit_desc));
        output.push_str(RULE);

        output
    }
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> String {
        let value = serde_json::json!({
            "severity": report.severity(),
            "completed": report.completed,
            "error": report.error,
            "summary": report.summary(),
            "nodes": report.nodes,
        });

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        // Serializing a Value cannot fail
        rendered.unwrap_or_default()
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(format: OutputFormat, color: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(color, quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

/// Process exit code for a report: 0 green or blue, 2 yellow, 1 red,
/// 3 when the run aborted.
pub fn exit_code(report: &Report) -> i32 {
    if report.error.is_some() {
        return EXIT_ERROR;
    }
    match report.severity() {
        Severity::Green | Severity::Blue => 0,
        Severity::Yellow => 2,
        Severity::Red => 1,
    }
}
