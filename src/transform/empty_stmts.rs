//! Empty-statement removal.
//!
//! Drops semicolons that do not separate two statements on the same logical
//! line: leading and trailing separators and repeated separators between
//! statements. Runs independently of the splitter.

use crate::parser::lines::LineBuffer;

/// Remove empty-statement semicolons from every line. Returns whether any
/// change occurred.
pub fn remove_empty_statements(buffer: &mut LineBuffer) -> bool {
    let mut changed = false;
    for idx in 0..buffer.len() {
        if buffer.line_mut(idx).remove_empty_statement_markers() {
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::LineBuffer;

    fn run(source: &str) -> (String, bool) {
        let mut buffer = LineBuffer::from_source(source);
        let changed = remove_empty_statements(&mut buffer);
        (buffer.to_source(), changed)
    }

    #[test]
    fn test_trailing_semicolon_dropped() {
        let (out, changed) = run("x = 1;\n");
        assert_eq!(out, "x = 1\n");
        assert!(changed);
    }

    #[test]
    fn test_doubled_separator_collapsed() {
        let (out, _) = run("x = 1;; y = 2\n");
        assert_eq!(out, "x = 1; y = 2\n");
    }

    #[test]
    fn test_separating_semicolon_kept() {
        let source = "x = 1; y = 2\n";
        let (out, changed) = run(source);
        assert_eq!(out, source);
        assert!(!changed);
    }

    #[test]
    fn test_string_semicolon_untouched() {
        let source = "msg = ';'\n";
        let (out, changed) = run(source);
        assert_eq!(out, source);
        assert!(!changed);
    }
}
