use crate::report::DiagnosticReport;
use serde::{Deserialize, Serialize};

/// Severity tag attached to each rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
    BoxNotice,
    ReferenceNotice,
    Info,
}

/// One human-readable output line; the caller picks the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLine {
    pub severity: Severity,
    pub text: String,
}

impl FormattedLine {
    fn new(severity: Severity, text: String) -> Self {
        Self { severity, text }
    }
}

/// Renders a report as severity-tagged lines.
///
/// Order is bad boxes, then references, then warnings, then errors, so the
/// most severe diagnostics are read last. Pure function; performs no I/O.
pub fn render(report: &DiagnosticReport) -> Vec<FormattedLine> {
    let mut lines = Vec::new();

    for bx in &report.bad_boxes {
        let text = match bx.page {
            Some(page) => format!("{} (page {})", bx.text, page),
            None => bx.text.clone(),
        };
        lines.push(FormattedLine::new(Severity::BoxNotice, text));
    }

    for reference in &report.references {
        lines.push(FormattedLine::new(
            Severity::ReferenceNotice,
            reference.text.clone(),
        ));
    }

    for warning in &report.warnings {
        let text = match &warning.package {
            Some(package) => format!("{}: {}", package, warning.text),
            None => warning.text.clone(),
        };
        lines.push(FormattedLine::new(Severity::Warning, text));
    }

    for error in &report.errors {
        let mut text = String::new();
        if let Some(file) = &error.source_file {
            text.push_str(file);
            text.push(':');
        }
        if let Some(line) = error.line {
            text.push_str(&line.to_string());
            text.push(':');
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&error.text);
        lines.push(FormattedLine::new(Severity::Error, text));
        if let Some(code) = &error.code {
            lines.push(FormattedLine::new(Severity::Info, format!("    {}", code)));
        }
    }

    if report.rerun_needed {
        lines.push(FormattedLine::new(
            Severity::Info,
            "Rerun needed to fix cross-references.".to_string(),
        ));
    }

    lines
}
