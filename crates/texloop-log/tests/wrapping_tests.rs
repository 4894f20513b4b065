use texloop_log::LogParser;

/// Builds a `(...` open whose physical line is exactly the engine's
/// 79-column wrap width, so the path continues on the next line.
fn wrapped_open(head: &str) -> String {
    let mut line = format!("({}", head);
    while line.len() < 79 {
        line.push('a');
    }
    assert_eq!(line.len(), 79);
    line
}

#[test]
fn wrapped_path_is_joined_across_lines() {
    let open = wrapped_open("/usr/share/texmf/fonts/");
    let input = format!("{}\nlongname.tex\n! Oops.\nl.2 \\x\n", open);
    let report = LogParser::new().parse(&input).unwrap();

    assert_eq!(report.errors.len(), 1);
    let file = report.errors[0].source_file.as_deref().unwrap();
    assert!(file.starts_with("/usr/share/texmf/fonts/"));
    assert!(file.ends_with("longname.tex"));
}

#[test]
fn wrapped_path_close_pops_the_joined_file() {
    // Without joining, the wrapped file's `)` would pop ./main.tex and the
    // later error would be attributed to nothing.
    let open = wrapped_open("/opt/texlive/texmf-dist/tex/");
    let input = format!(
        "(./main.tex\n{}\ntail.sty)\n! Bad.\nl.1 z\n",
        open
    );
    let report = LogParser::new().parse(&input).unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source_file.as_deref(), Some("./main.tex"));
}

#[test]
fn join_is_guarded_against_new_events() {
    // A warning directly after the wrap means the path ended at the line
    // break; the warning must not be swallowed into the path.
    let open = wrapped_open("./chapters/appendix-");
    let input = format!(
        "{}\nLaTeX Warning: Reference `r' undefined on input line 3.\n",
        open
    );
    let report = LogParser::new().parse(&input).unwrap();

    assert_eq!(report.references.len(), 1);
    assert_eq!(report.references[0].line, Some(3));
}

#[test]
fn short_open_at_line_end_is_not_treated_as_wrapped() {
    // Lines shorter than the wrap column cannot contain a split path.
    let input = "(./main.tex\nentering extended mode\n! Oops.\nl.2 \\x\n";
    let report = LogParser::new().parse(input).unwrap();

    assert_eq!(report.errors[0].source_file.as_deref(), Some("./main.tex"));
}

#[test]
fn doubly_wrapped_path_is_joined() {
    let first = wrapped_open("/very/deep/");
    let mut second = String::new();
    while second.len() < 79 {
        second.push('b');
    }
    let input = format!("{}\n{}\nend.tex)\n! Boom.\nl.9 q\n", first, second);
    let report = LogParser::new().parse(&input).unwrap();

    // The three-line path was entered and exited; the error has no file.
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source_file, None);
}
