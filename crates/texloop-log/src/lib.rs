//! # TexLoop Log Parser
//!
//! Parser for the plain-text log files batch-mode TeX engines (pdfTeX, XeTeX)
//! write per run, producing a structured [`DiagnosticReport`].
//!
//! The log format is irregular and has no grammar; this crate classifies it
//! line by line with substring and prefix matches, handling:
//!
//! - **File stack tracking**: matching `(file.tex` and `)` pairs so errors
//!   can be attributed to the file the engine was reading
//! - **Error extraction**: `!`-prefixed blocks with their `l.<n>` source
//!   markers and echoed code fragments
//! - **Warnings and reference complaints**: `LaTeX Warning:` /
//!   `Package <name> Warning:` lines, with undefined reference/citation
//!   complaints split into their own category
//! - **Bad boxes**: `Overfull`/`Underfull` box notices with page attribution
//! - **Rerun detection**: the report's `rerun_needed` flag is set when the
//!   log asks for another pass (stale labels, cross-references, TOC)
//!
//! ## Example
//!
//! ```
//! use texloop_log::LogParser;
//!
//! let log = "LaTeX Warning: Reference `fig:a' undefined on input line 3.\n";
//! let report = LogParser::new().parse(log)?;
//! assert_eq!(report.references.len(), 1);
//! assert!(!report.rerun_needed);
//! # Ok::<(), texloop_log::MalformedLogError>(())
//! ```
//!
//! Reports serialize with serde, so they can be exported as JSON:
//!
//! ```no_run
//! use texloop_log::LogParser;
//! use std::fs;
//!
//! let log = fs::read_to_string("main.log")?;
//! let report = LogParser::new().parse(&log)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Log grammar scanner.
pub mod parser;
/// Human-readable rendering of reports.
pub mod render;
/// Diagnostic report model.
pub mod report;

pub use parser::{LogParser, MalformedLogError};
pub use render::{render, FormattedLine, Severity};
pub use report::{BadBoxEntry, DiagnosticReport, ErrorEntry, ReferenceEntry, WarningEntry};
