use texloop_log::LogParser;

#[test]
fn realistic_article_run() {
    let input = include_str!("fixtures/article_run.log");
    let report = LogParser::new().parse(input).unwrap();

    assert!(!report.has_errors());
    assert!(report.rerun_needed);

    // Citation complaint, "There were undefined references", and the
    // label-change notice all land in the reference category.
    assert_eq!(report.references.len(), 3);
    assert_eq!(report.references[0].line, Some(8));

    // The hyperref token warning is suppressed; only the font warning stays.
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].text.contains("Font shape"));
    assert_eq!(report.warnings[0].line, Some(9));

    assert_eq!(report.bad_boxes.len(), 2);
    assert_eq!(report.bad_boxes[0].page, None);
    assert!(report.bad_boxes[0].text.starts_with("Overfull \\hbox"));
    assert_eq!(report.bad_boxes[1].page, Some(1));
}

#[test]
fn engine_banner_parens_do_not_confuse_the_stack() {
    let input = "This is pdfTeX (TeX Live 2022) (preloaded format=pdflatex)\n\
        (./main.tex\n\
        ! Oops.\n\
        l.2 \\x\n";
    let report = LogParser::new().parse(input).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source_file.as_deref(), Some("./main.tex"));
}

#[test]
fn error_inside_nested_include() {
    let input = "(./main.tex (./front/titlepage.tex)\n\
        (./chapters/ch01.tex\n\
        ! Undefined control sequence.\n\
        l.77 \\wat\n\
        )\n\
        )\n";
    let report = LogParser::new().parse(input).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].source_file.as_deref(),
        Some("./chapters/ch01.tex")
    );
    assert_eq!(report.errors[0].line, Some(77));
}
