use crate::report::{BadBoxEntry, DiagnosticReport, ErrorEntry, ReferenceEntry, WarningEntry};
use thiserror::Error;

/// The input does not resemble a TeX engine log at all.
///
/// Distinct from a log that merely contains no diagnostics, which parses to
/// an empty [`DiagnosticReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("log text does not look like a TeX engine log")]
pub struct MalformedLogError;

/// Phrases the engine emits when another pass is required for correctness.
const RERUN_TRIGGERS: &[&str] = &[
    "Rerun to get cross-references right",
    "Rerun to get outlines right",
    "Rerun to get the bars right",
    "Label(s) may have changed",
    "Table widths have changed. Rerun LaTeX",
];

/// hyperref repeats this for every sectioning command containing math; it is
/// suppressed outright rather than reported.
const HYPERREF_NOISE: &str = "Token not allowed in a PDF string";

const OUTPUT_ACTIVE: &str = "has occurred while \\output is active";

/// The engine hard-wraps log lines at this width, splitting long file paths
/// across physical lines.
const MAX_LOG_LINE: usize = 79;

/// Parser for the plain-text log a TeX engine writes per run.
///
/// The log has no formal grammar; this is a line classifier with an explicit
/// current-entry accumulator, matching known prefixes and phrases. A file
/// inclusion stack is maintained across the whole scan by matching
/// `(path` / `)` pairs so errors can be attributed to the file the engine was
/// reading at the time.
pub struct LogParser;

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a full log into a [`DiagnosticReport`].
    ///
    /// Returns [`MalformedLogError`] for empty (or whitespace-only) input; a
    /// readable log with no recognized structure yields an empty report with
    /// `rerun_needed = false`.
    pub fn parse(&self, input: &str) -> Result<DiagnosticReport, MalformedLogError> {
        if input.trim().is_empty() {
            return Err(MalformedLogError);
        }
        let mut scan = Scan::default();
        for line in input.lines() {
            scan.feed(line);
        }
        scan.flush();
        Ok(scan.report)
    }
}

/// An entry whose message may still be growing.
enum Pending {
    None,
    Error {
        entry: ErrorEntry,
        /// Still accumulating message lines (a blank line ends the message,
        /// after which only the `l.<n>` marker is awaited).
        in_message: bool,
        /// The `l.<n>` line was consumed; one indented follow-up line may
        /// still extend the source fragment.
        want_code_tail: bool,
    },
    BadBox(BadBoxEntry),
}

struct Scan {
    report: DiagnosticReport,
    file_stack: Vec<String>,
    pending: Pending,
    /// Head of a file path that ran to the end of a wrap-width line and may
    /// continue on the next one.
    pending_path: Option<String>,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            report: DiagnosticReport::default(),
            file_stack: Vec::new(),
            pending: Pending::None,
            pending_path: None,
        }
    }
}

impl Scan {
    fn feed(&mut self, line: &str) {
        // The rerun check spans the whole log, independent of entry
        // extraction.
        if RERUN_TRIGGERS.iter().any(|t| line.contains(t)) {
            self.report.rerun_needed = true;
        }

        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => self.classify(line),
            Pending::Error {
                mut entry,
                in_message,
                want_code_tail,
            } => {
                if want_code_tail {
                    // `l.5 \foo` is followed by an indented line showing the
                    // rest of the source line past the error position.
                    let tail = line.trim();
                    if !tail.is_empty() && line.starts_with(char::is_whitespace) {
                        entry.code = match entry.code.take() {
                            Some(code) => Some(format!("{} {}", code, tail)),
                            None => Some(tail.to_string()),
                        };
                        self.report.errors.push(entry);
                        return;
                    }
                    self.report.errors.push(entry);
                    self.classify(line);
                } else if let Some((num, fragment)) = parse_line_marker(line) {
                    entry.line = Some(num);
                    entry.code = fragment;
                    self.pending = Pending::Error {
                        entry,
                        in_message: false,
                        want_code_tail: true,
                    };
                } else if is_entry_start(line) {
                    self.report.errors.push(entry);
                    self.classify(line);
                } else if in_message {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        // Message done; keep waiting for the `l.<n>` marker.
                        self.pending = Pending::Error {
                            entry,
                            in_message: false,
                            want_code_tail: false,
                        };
                    } else {
                        entry.text.push(' ');
                        entry.text.push_str(trimmed);
                        self.pending = Pending::Error {
                            entry,
                            in_message: true,
                            want_code_tail: false,
                        };
                    }
                } else {
                    // Interactive-help noise between the message and the
                    // `l.<n>` marker; skip it.
                    self.pending = Pending::Error {
                        entry,
                        in_message: false,
                        want_code_tail: false,
                    };
                }
            }
            Pending::BadBox(mut entry) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    self.report.bad_boxes.push(entry);
                } else if is_entry_start(line) {
                    self.report.bad_boxes.push(entry);
                    self.classify(line);
                } else {
                    entry.text.push(' ');
                    entry.text.push_str(trimmed);
                    self.pending = Pending::BadBox(entry);
                }
            }
        }
    }

    /// Finalize whatever entry is still open at end of log.
    fn flush(&mut self) {
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => {}
            Pending::Error { entry, .. } => self.report.errors.push(entry),
            Pending::BadBox(entry) => self.report.bad_boxes.push(entry),
        }
    }

    fn classify(&mut self, line: &str) {
        if self.continue_wrapped_path(line) {
            return;
        }

        if let Some(message) = line.strip_prefix('!') {
            self.pending = Pending::Error {
                entry: ErrorEntry {
                    source_file: self.file_stack.last().cloned(),
                    line: None,
                    text: message.trim().to_string(),
                    code: None,
                },
                in_message: true,
                want_code_tail: false,
            };
            return;
        }

        if is_box_start(line) {
            self.start_bad_box(line);
            return;
        }

        if let Some((package, message)) = split_warning(line) {
            self.record_warning(package, message);
            return;
        }

        self.scan_parens(line, line.len() >= MAX_LOG_LINE);
    }

    /// Joins the tail of a path wrapped across physical lines.
    ///
    /// Joining is guarded the same way the wrap was detected: a line that
    /// clearly starts a new event means the path ended at the line break
    /// after all. Returns true when the line was consumed as a continuation.
    fn continue_wrapped_path(&mut self, line: &str) -> bool {
        let Some(prefix) = self.pending_path.take() else {
            return false;
        };
        if breaks_path_join(line) {
            if is_likely_path(&prefix) {
                self.file_stack.push(prefix);
            }
            return false;
        }
        let end = line
            .find(|c: char| c == ')' || c == '(' || c.is_whitespace())
            .unwrap_or(line.len());
        let mut path = prefix;
        path.push_str(&line[..end]);
        if end == line.len() && line.len() >= MAX_LOG_LINE {
            // Wrapped again.
            self.pending_path = Some(path);
            return true;
        }
        if is_likely_path(&path) {
            self.file_stack.push(path);
        }
        self.scan_parens(&line[end..], line.len() >= MAX_LOG_LINE);
        true
    }

    fn start_bad_box(&mut self, line: &str) {
        if let Some(pos) = line.find(OUTPUT_ACTIVE) {
            // The suffix terminates the notice; the bracketed page number
            // follows it when the box was detected during page shipout.
            let entry = BadBoxEntry {
                page: parse_page_marker(&line[pos + OUTPUT_ACTIVE.len()..]),
                text: line[..pos].trim_end().to_string(),
            };
            self.report.bad_boxes.push(entry);
        } else {
            self.pending = Pending::BadBox(BadBoxEntry {
                page: None,
                text: line.trim_end().to_string(),
            });
        }
    }

    fn record_warning(&mut self, package: Option<&str>, message: &str) {
        if package == Some("hyperref") && message.contains(HYPERREF_NOISE) {
            return;
        }
        let line = parse_input_line(message);
        let text = message.trim().to_string();
        if is_reference_complaint(message) {
            self.report.references.push(ReferenceEntry { line, text });
        } else {
            self.report.warnings.push(WarningEntry {
                package: package.map(str::to_string),
                line,
                text,
            });
        }
    }

    /// Track the engine's file inclusion stack on lines that are not part of
    /// any diagnostic entry.
    fn scan_parens(&mut self, line: &str, wrapped: bool) {
        let mut rest = line;
        while let Some(idx) = rest.find(|c| c == '(' || c == ')') {
            let is_open = rest.as_bytes()[idx] == b'(';
            rest = &rest[idx + 1..];
            if is_open {
                let end = rest
                    .find(|c: char| c == ')' || c == '(' || c.is_whitespace())
                    .unwrap_or(rest.len());
                let path = &rest[..end];
                if end == rest.len() && wrapped {
                    // The path runs to the wrap column; it may continue on
                    // the next physical line.
                    self.pending_path = Some(path.to_string());
                    return;
                }
                if is_likely_path(path) {
                    self.file_stack.push(path.to_string());
                    rest = &rest[end..];
                } else if rest[end..].starts_with(')') {
                    // Prose like "(Info)" or "(hyperref)": consume the pair
                    // so the closer cannot pop a real file.
                    rest = &rest[end + 1..];
                }
            } else {
                // Unmatched closers appear in prose; popping an empty stack
                // is a no-op.
                self.file_stack.pop();
            }
        }
    }
}

fn is_entry_start(line: &str) -> bool {
    line.starts_with('!') || is_box_start(line) || split_warning(line).is_some()
}

/// Lines that start a new event cannot be the continuation of a wrapped
/// path.
fn breaks_path_join(line: &str) -> bool {
    line.trim().is_empty()
        || is_entry_start(line)
        || line.starts_with('(')
        || line.starts_with(')')
        || line.starts_with("LaTeX")
        || line.starts_with("Package")
        || line.starts_with("Document Class:")
        || line.starts_with("L3 programming")
}

fn is_box_start(line: &str) -> bool {
    (line.starts_with("Overfull") || line.starts_with("Underfull"))
        && (line.contains("\\hbox") || line.contains("\\vbox"))
}

/// Splits a warning line into `(package, message)`.
///
/// `LaTeX Warning: <msg>` carries no package; `Package <name> Warning: <msg>`
/// and `Class <name> Warning: <msg>` carry one.
fn split_warning(line: &str) -> Option<(Option<&str>, &str)> {
    if let Some(message) = line.strip_prefix("LaTeX Warning:") {
        return Some((None, message.trim_start()));
    }
    for prefix in ["Package ", "Class "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            if let Some(pos) = rest.find(" Warning:") {
                let name = &rest[..pos];
                let message = rest[pos + " Warning:".len()..].trim_start();
                if !name.is_empty() && !name.contains(' ') {
                    return Some((Some(name), message));
                }
            }
        }
    }
    None
}

fn is_reference_complaint(message: &str) -> bool {
    ((message.contains("Reference") || message.contains("Citation"))
        && (message.contains("undefined") || message.contains("multiply defined")))
        || message.starts_with("There were undefined references")
        || message.starts_with("There were multiply-defined labels")
        || message.contains("Label(s) may have changed")
}

/// Parses an `l.<n> <source fragment>` marker line.
fn parse_line_marker(line: &str) -> Option<(u32, Option<String>)> {
    let rest = line.strip_prefix("l.")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let num = digits.parse::<u32>().ok()?;
    let fragment = rest[digits.len()..].trim();
    let fragment = (!fragment.is_empty()).then(|| fragment.to_string());
    Some((num, fragment))
}

/// Extracts the number from a trailing `on input line <n>` annotation.
fn parse_input_line(message: &str) -> Option<u32> {
    let pos = message.rfind("on input line ")?;
    let digits: String = message[pos + "on input line ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Extracts the page from a `[<n>]` shipout marker following the
/// output-active suffix.
fn parse_page_marker(tail: &str) -> Option<u32> {
    let open = tail.find('[')?;
    let rest = &tail[open + 1..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Heuristic to reject prose parentheses, e.g. "Latexmk: (Info) ..." or
/// "TeX Live (preloaded format=...)".
fn is_likely_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let blacklisted = matches!(path, "Info" | "preloaded" | "TeX" | "con");
    if blacklisted {
        return false;
    }
    path.starts_with('/')
        || path.starts_with('\\')
        || path.starts_with('.')
        || (path.contains('.') && !path.ends_with('.'))
        || path.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> DiagnosticReport {
        LogParser::new().parse(input).expect("log should parse")
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(LogParser::new().parse("").is_err());
        assert!(LogParser::new().parse("   \n\t\n").is_err());
    }

    #[test]
    fn unstructured_log_yields_empty_report() {
        let report = parse("This is pdfTeX, Version 3.141592653\nentering extended mode\n");
        assert!(report.is_empty());
        assert!(!report.rerun_needed);
    }

    #[test]
    fn error_attributed_to_current_file() {
        let report = parse(
            "(./main.tex (./chapter.tex\n! Undefined control sequence.\nl.12 \\badmacro\n",
        );
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.source_file.as_deref(), Some("./chapter.tex"));
        assert_eq!(err.line, Some(12));
        assert_eq!(err.text, "Undefined control sequence.");
        assert_eq!(err.code.as_deref(), Some("\\badmacro"));
    }

    #[test]
    fn file_stack_pops_on_close() {
        let report = parse(
            "(./main.tex (./sub.tex)\n! Missing $ inserted.\nl.3 x^2\n",
        );
        assert_eq!(report.errors[0].source_file.as_deref(), Some("./main.tex"));
    }

    #[test]
    fn prose_parentheses_do_not_enter_stack() {
        let report = parse(
            "Latexmk: (Info) something\n(./real.tex\n! Bad.\nl.1 y\n",
        );
        assert_eq!(report.errors[0].source_file.as_deref(), Some("./real.tex"));
    }

    #[test]
    fn multi_line_error_with_help_noise() {
        let report = parse(
            "! LaTeX Error: \\begin{itemize} on input line 7 ended by \\end{document}.\n\
             \n\
             See the LaTeX manual or LaTeX Companion for explanation.\n\
             Type  H <return>  for immediate help.\n\
             \n\
             l.10 \\end{document}\n     extra tail\n",
        );
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.line, Some(10));
        assert_eq!(err.code.as_deref(), Some("\\end{document} extra tail"));
        assert!(err.text.starts_with("LaTeX Error:"));
    }

    #[test]
    fn error_message_continuation_lines_are_joined() {
        let report = parse(
            "! Package babel Error: Unknown option `klingon'. Either you misspelled it\n\
             or the language definition file klingon.ldf was not found.\n\
             \n\
             l.5 \\usepackage[klingon]{babel}\n",
        );
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].text.contains("was not found."));
        assert_eq!(report.errors[0].line, Some(5));
    }

    #[test]
    fn warning_with_package_and_line() {
        let report = parse(
            "Package natbib Warning: Citation `knuth84' on page 2 undefined on input line 8.\n",
        );
        // Citation complaints are routed to references, not warnings.
        assert!(report.warnings.is_empty());
        assert_eq!(report.references.len(), 1);
        assert_eq!(report.references[0].line, Some(8));
    }

    #[test]
    fn plain_warning_is_kept() {
        let report = parse("LaTeX Warning: Font shape `OT1/cmr/bx/sc' undefined\n");
        // "undefined" alone is not a reference complaint.
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].package, None);
        assert_eq!(report.warnings[0].line, None);
    }

    #[test]
    fn package_warning_captures_name() {
        let report = parse(
            "Package caption Warning: Unsupported document class detected on input line 4.\n",
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].package.as_deref(), Some("caption"));
        assert_eq!(report.warnings[0].line, Some(4));
    }

    #[test]
    fn hyperref_token_warning_is_suppressed() {
        let report = parse(
            "Package hyperref Warning: Token not allowed in a PDF string (Unicode):\n\
             (hyperref)                removing `math shift' on input line 9.\n\
             Package hyperref Warning: Suppressing link with empty target on input line 2.\n",
        );
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].text.contains("empty target"));
    }

    #[test]
    fn overfull_hbox_without_page() {
        let report = parse(
            "Overfull \\hbox (15.3pt too wide) in paragraph at lines 12--13\n\
             []\\OT1/cmr/m/n/10 some overly long text\n\
             \n",
        );
        assert_eq!(report.bad_boxes.len(), 1);
        let bx = &report.bad_boxes[0];
        assert_eq!(bx.page, None);
        assert!(bx.text.starts_with("Overfull \\hbox (15.3pt too wide)"));
        assert!(bx.text.contains("overly long text"));
    }

    #[test]
    fn underfull_vbox_with_page() {
        let report = parse(
            "Underfull \\vbox (badness 10000) has occurred while \\output is active [7]\n",
        );
        assert_eq!(report.bad_boxes.len(), 1);
        let bx = &report.bad_boxes[0];
        assert_eq!(bx.page, Some(7));
        assert_eq!(bx.text, "Underfull \\vbox (badness 10000)");
    }

    #[test]
    fn rerun_trigger_sets_flag() {
        let report = parse(
            "LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right.\n",
        );
        assert!(report.rerun_needed);
        // The same line is also a reference complaint.
        assert_eq!(report.references.len(), 1);
    }

    #[test]
    fn no_trigger_means_no_rerun() {
        let report = parse("LaTeX Warning: Some harmless remark on input line 1.\n");
        assert!(!report.rerun_needed);
    }

    #[test]
    fn parse_is_deterministic() {
        let input = "(./a.tex\n! Oops.\nl.2 \\x\nLaTeX Warning: Reference `r' undefined on input line 3.\nOverfull \\hbox (1.0pt too wide) in paragraph at lines 4--5\n\n)";
        let a = parse(input);
        let b = parse(input);
        assert_eq!(a, b);
    }

    #[test]
    fn errors_preserve_log_order() {
        let report = parse(
            "! First error.\nl.1 a\n! Second error.\nl.2 b\n",
        );
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].text, "First error.");
        assert_eq!(report.errors[1].text, "Second error.");
    }

    #[test]
    fn error_without_marker_is_still_reported() {
        let report = parse("! Emergency stop.\n<*> main.tex\n");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].text.starts_with("Emergency stop."));
        assert_eq!(report.errors[0].line, None);
    }
}
