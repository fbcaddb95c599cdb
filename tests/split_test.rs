//! Integration tests for compound-statement splitting.

use frefactor::process::{format_source, FormatOptions};

fn split_opts() -> FormatOptions {
    FormatOptions {
        split_statements: true,
        ..Default::default()
    }
}

fn split(source: &str) -> (String, bool) {
    format_source(source, &split_opts())
}

#[test]
fn test_single_statements_untouched() {
    let source = "program p\n  x = 1\n  y = 2\nend program p\n";
    let (out, changed) = split(source);
    assert_eq!(out, source);
    assert!(!changed);
}

#[test]
fn test_compound_line_split_completely() {
    let (out, changed) = split("program p\n  x = 1; y = 2; z = 3\nend program p\n");
    assert!(changed);
    assert_eq!(out, "program p\n  x = 1\n y = 2\n z = 3\nend program p\n");
}

#[test]
fn test_no_output_line_holds_two_statements() {
    let source = "a = 1; b = 2\nc = 3; d = 4; e = 5\nf = 6\n";
    let (out, _) = split(source);
    for line in out.lines() {
        // A remaining semicolon would mean an unsplit compound statement
        assert!(
            !line.contains(';'),
            "line still compound: {line:?}"
        );
    }
}

#[test]
fn test_idempotent() {
    let source = "x = 1;; y = 2;\nif (a) call go(); b = 1\n";
    let (once, _) = split(source);
    let (twice, changed) = split(&once);
    assert_eq!(once, twice);
    assert!(!changed);
}

#[test]
fn test_layout_preserved_inside_statements() {
    // Inner spacing of each statement survives the split untouched
    let (out, _) = split("  x   =  1 ;   y=2\n");
    assert_eq!(out, "  x   =  1 \n   y=2\n");
}

#[test]
fn test_string_and_comment_semicolons_ignored() {
    let source = "msg = 'a; b' ! trailing; comment\n";
    let (out, changed) = split(source);
    assert_eq!(out, source);
    assert!(!changed);
}

#[test]
fn test_trailing_separator_cleanup_at_eof() {
    let (out, _) = split("x = 1; y = 2;\n");
    assert_eq!(out, "x = 1\n y = 2\n");
}

#[test]
fn test_separator_only_lines_compact() {
    let (out, changed) = split("x = 1\n;;\ny = 2\n");
    assert_eq!(out, "x = 1\n\ny = 2\n");
    assert!(changed);
}

#[test]
fn test_split_with_continuation() {
    let (out, _) = split("x = 1 + &\n    2; y = 3\n");
    assert_eq!(out, "x = 1 + &\n    2\n y = 3\n");
}

#[test]
fn test_guarded_call_kept_whole() {
    // The guarded statement is one statement; the guard is not split off
    let (out, _) = split("if (flag) call go(); x = 1\n");
    assert_eq!(out, "if (flag) call go()\n x = 1\n");
}

#[test]
fn test_split_then_remove_empty_is_stable() {
    let opts = FormatOptions {
        split_statements: true,
        remove_empty_statements: true,
        ..Default::default()
    };
    let (once, _) = format_source("a = 1;; b = 2;\n", &opts);
    let (twice, changed) = format_source(&once, &opts);
    assert_eq!(once, twice);
    assert!(!changed);
}
