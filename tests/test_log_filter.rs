use infra_probe::filter::{FilterError, FilterOptions, LogFilter, Severity, filter_logs};
use std::cell::Cell;

fn run(text: &str, options: &FilterOptions) -> String {
    filter_logs(text, options).expect("valid options")
}

#[test]
fn test_empty_options_only_normalize_line_endings() {
    let text = "INFO boot\r\nWARN slow disk\r\n\r\nplain line\n";
    assert_eq!(
        run(text, &FilterOptions::new()),
        "INFO boot\nWARN slow disk\n\nplain line"
    );
}

#[test]
fn test_refiltering_with_same_options_is_stable() {
    let text = "DEBUG cache miss\nERROR db timeout\nINFO retry\nERROR db timeout again\nno level here";
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .include(Some("db|level"));

    let once = run(text, &options);
    assert_eq!(run(&once, &options), once);
}

#[test]
fn test_min_level_error() {
    let options = FilterOptions::new().min_level(Some(Severity::Error));
    assert_eq!(run("INFO ok\nERROR fail\nWARN warning", &options), "ERROR fail");
}

#[test]
fn test_include_pattern() {
    let options = FilterOptions::new().include(Some("database"));
    assert_eq!(
        run("INFO starting\nERROR database failed\nINFO done", &options),
        "ERROR database failed"
    );
}

#[test]
fn test_exclude_pattern() {
    let options = FilterOptions::new().exclude(Some("health"));
    assert_eq!(
        run("INFO health check\nERROR real error\nINFO health check", &options),
        "ERROR real error"
    );
}

#[test]
fn test_level_and_exclude_combined() {
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .exclude(Some("health"));
    assert_eq!(
        run("DEBUG test\nERROR db failed\nERROR health check failed", &options),
        "ERROR db failed"
    );
}

#[test]
fn test_context_lines_keep_original_order() {
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .context_lines(1);
    assert_eq!(
        run("INFO a\nERROR b\nINFO c\nINFO d", &options),
        "INFO a\nERROR b\nINFO c"
    );
}

#[test]
fn test_untagged_neighbours_are_anchors_not_context() {
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .context_lines(1);
    assert_eq!(run("A\nB ERROR\nC\nD", &options), "A\nB ERROR\nC\nD");
}

#[test]
fn test_context_larger_than_input_returns_every_line() {
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .context_lines(usize::MAX);
    assert_eq!(run("INFO a\nERROR b\nINFO c", &options), "INFO a\nERROR b\nINFO c");
}

#[test]
fn test_lines_without_level_pass_the_level_threshold() {
    let options = FilterOptions::new().min_level(Some(Severity::Error));
    assert_eq!(run("A\nINFO b\nC", &options), "A\nC");
}

#[test]
fn test_overlapping_context_windows_emit_lines_once() {
    let text = "INFO 1\nERROR 2\nINFO 3\nERROR 4\nINFO 5\nINFO 6";
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .context_lines(1);

    let output = run(text, &options);
    assert_eq!(output, "INFO 1\nERROR 2\nINFO 3\nERROR 4\nINFO 5");
    assert_eq!(output.matches("INFO 3").count(), 1);
}

#[test]
fn test_repeated_identical_lines_are_not_collapsed() {
    let text = "INFO tick\nERROR boom\nINFO tick\nINFO idle\nINFO idle\nINFO tick\nERROR boom";
    let options = FilterOptions::new()
        .min_level(Some(Severity::Error))
        .context_lines(1);

    assert_eq!(
        run(text, &options),
        "INFO tick\nERROR boom\nINFO tick\nINFO tick\nERROR boom"
    );
}

#[test]
fn test_invalid_pattern_fails_before_any_line_is_processed() {
    let processed = Cell::new(false);
    let options = FilterOptions::new().include(Some("(unclosed"));

    let outcome = LogFilter::new(&options).map(|filter| {
        processed.set(true);
        filter.apply("ERROR anything")
    });

    match outcome {
        Err(FilterError::InvalidPattern { field, pattern, .. }) => {
            assert_eq!(field, "pattern");
            assert_eq!(pattern, "(unclosed");
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
    assert!(!processed.get());
}

#[test]
fn test_invalid_exclude_pattern_names_its_field() {
    let options = FilterOptions::new().exclude(Some("[a-"));
    let err = filter_logs("INFO x", &options).unwrap_err();
    assert!(matches!(
        err,
        FilterError::InvalidPattern {
            field: "exclude_pattern",
            ..
        }
    ));
}

#[test]
fn test_case_sensitive_patterns() {
    let text = "ERROR Disk full\nERROR disk slow";
    let insensitive = FilterOptions::new().include(Some("disk"));
    let sensitive = FilterOptions::new().include(Some("disk")).case_sensitive(true);

    assert_eq!(run(text, &insensitive), text);
    assert_eq!(run(text, &sensitive), "ERROR disk slow");
}

#[test]
fn test_nothing_matches_gives_empty_output() {
    let options = FilterOptions::new().include(Some("never-present"));
    assert_eq!(run("INFO a\nINFO b", &options), "");
}

#[test]
fn test_binary_garbage_is_treated_as_text() {
    let text = "\u{fffd}\u{0}\u{7f} raw bytes\nERROR real";
    let options = FilterOptions::new().min_level(Some(Severity::Error));
    assert_eq!(run(text, &options), text);
}
