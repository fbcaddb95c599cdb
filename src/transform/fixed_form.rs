//! Fixed-form to free-form conversion.
//!
//! A pre-pass over raw physical lines, before logical-line joining:
//! column-1 comment indicators (`C`, `c`, `*`) become `!` comments, and
//! a continuation marker in column 6 is rewritten to a trailing `&` on the
//! previous code line. Text beyond column 72 is preserved verbatim rather
//! than truncated.

/// Convert fixed-form source text to free form. Returns the converted text
/// and whether any change occurred.
#[must_use]
pub fn convert_fixed_to_free(source: &str) -> (String, bool) {
    let mut out: Vec<String> = Vec::new();
    // Index into `out` of the last line that can take a trailing `&`
    let mut last_code: Option<usize> = None;
    let mut changed = false;

    for physical in source.split_inclusive('\n') {
        let body = physical.strip_suffix('\n').unwrap_or(physical);
        let newline = if physical.ends_with('\n') { "\n" } else { "" };

        if is_fixed_comment(body) {
            let converted = format!("!{}{newline}", &body[1..]);
            if converted != physical {
                changed = true;
            }
            out.push(converted);
            continue;
        }

        if is_continuation_line(body) {
            if let Some(prev) = last_code {
                append_ampersand(&mut out[prev]);
                // Blank out the label field and the continuation marker
                let rest = &body[6..];
                out.push(format!("      {rest}{newline}"));
                last_code = Some(out.len() - 1);
                changed = true;
                continue;
            }
        }

        if body.trim().is_empty() {
            out.push(physical.to_string());
        } else {
            out.push(physical.to_string());
            last_code = Some(out.len() - 1);
        }
    }

    (out.concat(), changed)
}

/// Column-1 comment indicator of fixed-form source.
fn is_fixed_comment(body: &str) -> bool {
    matches!(body.as_bytes().first(), Some(b'C' | b'c' | b'*'))
}

/// Non-blank, non-zero character in column 6 with a blank or numeric label
/// field marks a continuation line.
fn is_continuation_line(body: &str) -> bool {
    let bytes = body.as_bytes();
    if bytes.len() < 6 {
        return false;
    }
    let marker = bytes[5];
    if marker == b' ' || marker == b'0' || marker == b'\t' {
        return false;
    }
    bytes[..5]
        .iter()
        .all(|&b| b == b' ' || b.is_ascii_digit())
}

/// Append ` &` to a stored line, before its newline.
fn append_ampersand(line: &mut String) {
    if let Some(stripped) = line.strip_suffix('\n') {
        *line = format!("{} &\n", stripped.trim_end());
    } else {
        *line = format!("{} &", line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_indicator_rewritten() {
        let (out, changed) = convert_fixed_to_free("C a comment\n      x = 1\n");
        assert_eq!(out, "! a comment\n      x = 1\n");
        assert!(changed);
    }

    #[test]
    fn test_star_comment_rewritten() {
        let (out, _) = convert_fixed_to_free("* star\n");
        assert_eq!(out, "! star\n");
    }

    #[test]
    fn test_continuation_marker() {
        let (out, changed) = convert_fixed_to_free("      x = 1 +\n     & 2\n");
        assert_eq!(out, "      x = 1 + &\n       2\n");
        assert!(changed);
    }

    #[test]
    fn test_numeric_continuation_marker() {
        let (out, _) = convert_fixed_to_free("      x = 1 +\n     1 2\n");
        assert_eq!(out, "      x = 1 + &\n       2\n");
    }

    #[test]
    fn test_zero_in_column_six_is_not_continuation() {
        let source = "      x = 1\n     0 y = 2\n";
        let (out, changed) = convert_fixed_to_free(source);
        assert_eq!(out, source);
        assert!(!changed);
    }

    #[test]
    fn test_statement_label_kept() {
        let source = "  100 continue\n";
        let (out, changed) = convert_fixed_to_free(source);
        assert_eq!(out, source);
        assert!(!changed);
    }

    #[test]
    fn test_free_form_passes_through() {
        let source = "program p\n  x = 1\nend program p\n";
        let (out, changed) = convert_fixed_to_free(source);
        assert_eq!(out, source);
        assert!(!changed);
    }

    #[test]
    fn test_long_line_preserved_verbatim() {
        let long = format!("      x = {}\n", "1 + ".repeat(30));
        let (out, changed) = convert_fixed_to_free(&long);
        assert_eq!(out, long);
        assert!(!changed);
    }

    #[test]
    fn test_comment_between_continuations() {
        let (out, _) = convert_fixed_to_free("      x = 1 +\nC note\n     & 2\n");
        assert_eq!(out, "      x = 1 + &\n! note\n       2\n");
    }
}
