use serde::{Deserialize, Serialize};

/// A single `!`-prefixed error block from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// File at the top of the inclusion stack when the error was reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Source line number from the `l.<n>` marker, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub text: String,
    /// Verbatim source fragment echoed after the `l.<n>` marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A `LaTeX Warning:` / `Package <name> Warning:` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// `on input line <n>` annotation, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub text: String,
}

/// An `Overfull`/`Underfull` box notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadBoxEntry {
    /// Page number, known only when the notice carries the
    /// `has occurred while \output is active [<page>]` suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub text: String,
}

/// An undefined/changed reference or citation complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub text: String,
}

/// Structured result of parsing one engine log.
///
/// A report is a pure function of the log text: parsing the same text twice
/// yields structurally equal reports. Entries keep first-seen order and are
/// never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiagnosticReport {
    pub errors: Vec<ErrorEntry>,
    pub warnings: Vec<WarningEntry>,
    pub bad_boxes: Vec<BadBoxEntry>,
    pub references: Vec<ReferenceEntry>,
    /// True iff the log contains a recognized rerun trigger phrase.
    pub rerun_needed: bool,
}

impl DiagnosticReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when the log produced no diagnostics of any category.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
            && self.warnings.is_empty()
            && self.bad_boxes.is_empty()
            && self.references.is_empty()
    }
}
