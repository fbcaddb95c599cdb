//! Logical line store: fragments, statement spans and the line buffer.
//!
//! A logical line is one or more physical source lines joined by `&`
//! continuation, holding one or more statements. Each line owns an ordered
//! sequence of [`Fragment`]s (contiguous spans of original text) and a
//! derived list of [`StmtSpan`]s, half-open ranges over the fragments.
//! Statement spans cover statement content only; separator (`;`) and
//! comment fragments sit between spans.
//!
//! Every fragment mutation goes through a method that re-derives the span
//! list from scratch, so spans can never reference erased fragments.

use std::io::BufRead;
use std::ops::Range;

use crate::error::Result;
use crate::parser::char_scan::{CharClass, CharScan, QuoteState};

/// Position of a fragment in the original source (0-based row, byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub row: usize,
    pub col: usize,
}

/// Classification of a fragment's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Statement text, including string literals, whitespace and newlines
    Code,
    /// A statement separator (`;`) outside strings and comments
    Separator,
    /// Comment text from `!` up to (not including) the physical line end
    Comment,
}

/// A contiguous slice of original source text within a logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    pub pos: SourcePos,
}

impl Fragment {
    /// Whether this fragment carries statement content (anything beyond
    /// whitespace and continuation ampersands).
    #[must_use]
    pub fn is_content(&self) -> bool {
        self.kind == FragmentKind::Code
            && self
                .text
                .chars()
                .any(|c| !c.is_whitespace() && c != '&')
    }
}

/// Half-open range of fragment indices belonging to one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StmtSpan {
    pub start: usize,
    pub end: usize,
}

/// One logical Fortran line: owned fragments plus derived statement spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    fragments: Vec<Fragment>,
    spans: Vec<StmtSpan>,
    has_code: bool,
}

impl LogicalLine {
    /// Build a logical line by scanning `text` into fragments.
    ///
    /// `text` may contain embedded newlines (continuation lines); `first_row`
    /// is the source row of its first character.
    #[must_use]
    pub fn from_text(text: &str, first_row: usize) -> Self {
        let fragments = scan_fragments(text, first_row);
        let mut line = Self {
            fragments,
            spans: Vec::new(),
            has_code: false,
        };
        line.rescan();
        line
    }

    /// Full text of the line: concatenation of all fragment texts.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for frag in &self.fragments {
            out.push_str(&frag.text);
        }
        out
    }

    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[must_use]
    pub fn spans(&self) -> &[StmtSpan] {
        &self.spans
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.spans.len()
    }

    /// Whether the line contains executable Fortran content (as opposed to
    /// a pure comment or blank line).
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.has_code
    }

    /// Statement text for span `k`, with continuations joined: code fragment
    /// texts concatenated, `& ... newline ... [&]` sequences collapsed to a
    /// single space, and any comment fragments inside the span dropped.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of range.
    #[must_use]
    pub fn statement_code(&self, k: usize) -> String {
        let span = self.spans[k];
        let mut raw = String::new();
        for frag in &self.fragments[span.start..span.end] {
            if frag.kind != FragmentKind::Comment {
                raw.push_str(&frag.text);
            }
        }
        join_continuations(&raw)
    }

    /// Leading whitespace width (in columns) of the line's first fragment.
    #[must_use]
    pub fn indentation(&self) -> usize {
        self.fragments
            .first()
            .map(|f| f.text.len() - f.text.trim_start_matches([' ', '\t']).len())
            .unwrap_or(0)
    }

    /// Erase a range of fragments and re-derive the span list.
    pub fn erase_fragments(&mut self, range: Range<usize>) {
        self.fragments.drain(range);
        self.rescan();
    }

    /// Remove separator fragments trailing the last statement span (or all
    /// separators when the line has no statements). Returns whether any
    /// fragment was removed.
    pub fn trim_trailing_separators(&mut self) -> bool {
        let cut = self.spans.last().map_or(0, |s| s.end);
        let before = self.fragments.len();
        let mut idx = 0;
        self.fragments.retain(|frag| {
            let keep = idx < cut || frag.kind != FragmentKind::Separator;
            idx += 1;
            keep
        });
        let changed = self.fragments.len() != before;
        if changed {
            self.rescan();
        }
        changed
    }

    /// Remove separators that do not separate two statements: leading and
    /// trailing separators, and all but the first separator between two
    /// consecutive spans. Returns whether any fragment was removed.
    pub fn remove_empty_statement_markers(&mut self) -> bool {
        let mut keep = vec![true; self.fragments.len()];
        let mut changed = false;

        for (idx, frag) in self.fragments.iter().enumerate() {
            if frag.kind != FragmentKind::Separator {
                continue;
            }
            // A separator is load-bearing iff it is the first separator in
            // the gap between two adjacent statement spans.
            let after = self.spans.iter().position(|s| s.start > idx);
            let load_bearing = match after {
                Some(next) if next > 0 => {
                    let gap = self.spans[next - 1].end..self.spans[next].start;
                    let first_sep = self.fragments[gap.clone()]
                        .iter()
                        .position(|f| f.kind == FragmentKind::Separator)
                        .map(|off| gap.start + off);
                    first_sep == Some(idx)
                }
                _ => false,
            };
            if !load_bearing {
                keep[idx] = false;
                changed = true;
            }
        }

        if changed {
            let mut it = keep.iter();
            self.fragments.retain(|_| *it.next().unwrap());
            self.rescan();
        }
        changed
    }

    /// Replace the fragments of statement span `k` with a single code
    /// fragment holding `new_code`. Trailing whitespace of the old span
    /// (including a newline) is preserved.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of range.
    pub fn replace_statement_text(&mut self, k: usize, new_code: &str) {
        let span = self.spans[k];
        let pos = self.fragments[span.start].pos;
        let old: String = self.fragments[span.start..span.end]
            .iter()
            .map(|f| f.text.as_str())
            .collect();
        let trailing = &old[old.trim_end().len()..];
        self.fragments.splice(
            span.start..span.end,
            std::iter::once(Fragment {
                kind: FragmentKind::Code,
                text: format!("{new_code}{trailing}"),
                pos,
            }),
        );
        self.rescan();
    }

    /// Set the leading whitespace of the line to `cols` spaces.
    /// Returns whether the text changed.
    pub fn set_indentation(&mut self, cols: usize) -> bool {
        let Some(first) = self.fragments.first_mut() else {
            return false;
        };
        let body = first.text.trim_start_matches([' ', '\t']);
        let new_text = format!("{:cols$}{body}", "");
        if new_text == first.text {
            return false;
        }
        first.text = new_text;
        self.rescan();
        true
    }

    /// Re-derive the statement span list from the current fragments.
    ///
    /// Spans are maximal runs of fragments between separators, shrunk to the
    /// first and last content-bearing fragment of the run. Runs without
    /// content yield no span.
    pub fn rescan(&mut self) {
        self.spans.clear();
        self.has_code = false;

        let mut run_first: Option<usize> = None;
        let mut run_last = 0usize;
        let mut flush = |first: &mut Option<usize>, last: usize, spans: &mut Vec<StmtSpan>| {
            if let Some(start) = first.take() {
                spans.push(StmtSpan {
                    start,
                    end: last + 1,
                });
            }
        };

        for (idx, frag) in self.fragments.iter().enumerate() {
            match frag.kind {
                FragmentKind::Separator => {
                    flush(&mut run_first, run_last, &mut self.spans);
                }
                _ => {
                    if frag.is_content() {
                        self.has_code = true;
                        if run_first.is_none() {
                            run_first = Some(idx);
                        }
                        run_last = idx;
                    }
                }
            }
        }
        flush(&mut run_first, run_last, &mut self.spans);

        debug_assert!(self
            .spans
            .iter()
            .all(|s| s.start < s.end && s.end <= self.fragments.len()));
    }
}

/// Collapse continuation markup in joined code text: `&`, optional trailing
/// blanks, a newline, optional leading blanks and an optional leading `&`
/// become a single space.
fn join_continuations(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            // Lookahead for "blanks, newline" to confirm this is a
            // continuation and not a literal ampersand in code.
            let mut pending = String::new();
            let mut is_continuation = false;
            while let Some(&n) = chars.peek() {
                if n == ' ' || n == '\t' {
                    pending.push(n);
                    chars.next();
                } else if n == '\n' {
                    is_continuation = true;
                    chars.next();
                    break;
                } else {
                    break;
                }
            }
            if is_continuation {
                while let Some(&n) = chars.peek() {
                    if n == ' ' || n == '\t' {
                        chars.next();
                    } else {
                        break;
                    }
                }
                if chars.peek() == Some(&'&') {
                    chars.next();
                }
                out.push(' ');
            } else {
                out.push('&');
                out.push_str(&pending);
            }
        } else if c == '\n' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// Scan raw logical-line text into fragments.
fn scan_fragments(text: &str, first_row: usize) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut current_kind = FragmentKind::Code;
    let mut current_pos = SourcePos {
        row: first_row,
        col: 0,
    };
    let mut row = first_row;
    let mut col = 0usize;

    let mut flush = |buf: &mut String, kind: FragmentKind, pos: SourcePos, out: &mut Vec<Fragment>| {
        if !buf.is_empty() {
            out.push(Fragment {
                kind,
                text: std::mem::take(buf),
                pos,
            });
        }
    };

    for (_, c, class) in CharScan::new(text) {
        let kind = match class {
            CharClass::Comment => FragmentKind::Comment,
            CharClass::Code | CharClass::Str => FragmentKind::Code,
        };

        if class == CharClass::Code && c == ';' {
            flush(&mut current, current_kind, current_pos, &mut fragments);
            fragments.push(Fragment {
                kind: FragmentKind::Separator,
                text: c.to_string(),
                pos: SourcePos { row, col },
            });
            current_pos = SourcePos { row, col: col + 1 };
            current_kind = FragmentKind::Code;
        } else {
            if kind != current_kind {
                flush(&mut current, current_kind, current_pos, &mut fragments);
                current_kind = kind;
                current_pos = SourcePos { row, col };
            }
            current.push(c);
        }

        if c == '\n' {
            row += 1;
            col = 0;
        } else {
            col += c.len_utf8();
        }
    }
    flush(&mut current, current_kind, current_pos, &mut fragments);
    fragments
}

/// Ordered, insertion-capable sequence of logical lines owned by one file.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: Vec<LogicalLine>,
}

impl LineBuffer {
    /// Read logical lines from a reader, joining explicit continuations.
    pub fn read<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::from_source(&source))
    }

    /// Build a buffer from source text, joining explicit continuations.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let mut lines = Vec::new();
        let mut pending = String::new();
        let mut pending_row = 0usize;
        let mut quote = QuoteState::None;
        let mut row = 0usize;

        for physical in split_physical_lines(source) {
            if pending.is_empty() {
                pending_row = row;
            }
            pending.push_str(physical);

            let (continues, next_quote) = line_continues(physical, quote);
            quote = next_quote;
            if !continues {
                lines.push(LogicalLine::from_text(&pending, pending_row));
                pending.clear();
                quote = QuoteState::None;
            }
            row += 1;
        }
        if !pending.is_empty() {
            lines.push(LogicalLine::from_text(&pending, pending_row));
        }
        Self { lines }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, idx: usize) -> &LogicalLine {
        &self.lines[idx]
    }

    pub fn line_mut(&mut self, idx: usize) -> &mut LogicalLine {
        &mut self.lines[idx]
    }

    #[must_use]
    pub fn lines(&self) -> &[LogicalLine] {
        &self.lines
    }

    /// Insert a line before position `idx`. Iteration order stays source
    /// order; neighbors keep their identity (only indices at or after `idx`
    /// shift).
    pub fn insert(&mut self, idx: usize, line: LogicalLine) {
        self.lines.insert(idx, line);
    }

    /// Reassemble the buffer into source text. A line whose text does not
    /// end in a newline receives one unless it is the final line (so a file
    /// without a trailing newline round-trips unchanged).
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        let last = self.lines.len().saturating_sub(1);
        for (idx, line) in self.lines.iter().enumerate() {
            let text = line.text();
            out.push_str(&text);
            if idx != last && !text.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// Split source into physical lines, each including its trailing newline.
fn split_physical_lines(source: &str) -> impl Iterator<Item = &str> {
    source.split_inclusive('\n')
}

/// Whether a physical line ends with a continuation `&` (outside strings and
/// comments), and the string state at its end.
fn line_continues(physical: &str, quote: QuoteState) -> (bool, QuoteState) {
    let mut scan = CharScan::with_quote_state(physical, quote);
    let mut last_code: Option<char> = None;
    for (_, c, class) in scan.by_ref() {
        if class == CharClass::Code && !c.is_whitespace() {
            last_code = Some(c);
        }
    }
    (last_code == Some('&'), scan.quote_state())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_statement_line() {
        let line = LogicalLine::from_text("x = 5\n", 0);
        assert_eq!(line.statement_count(), 1);
        assert!(line.has_code());
        assert_eq!(line.statement_code(0), "x = 5 ");
        assert_eq!(line.text(), "x = 5\n");
    }

    #[test]
    fn test_compound_line_spans() {
        let line = LogicalLine::from_text("x = 5; y = 10\n", 0);
        assert_eq!(line.statement_count(), 2);
        assert_eq!(line.statement_code(0), "x = 5");
        assert_eq!(line.statement_code(1), " y = 10 ");
    }

    #[test]
    fn test_semicolon_in_string_not_separator() {
        let line = LogicalLine::from_text("x = 'a;b'\n", 0);
        assert_eq!(line.statement_count(), 1);
    }

    #[test]
    fn test_comment_only_line() {
        let line = LogicalLine::from_text("! just a comment\n", 0);
        assert!(!line.has_code());
        assert_eq!(line.statement_count(), 0);
    }

    #[test]
    fn test_blank_line() {
        let line = LogicalLine::from_text("\n", 0);
        assert!(!line.has_code());
        assert_eq!(line.statement_count(), 0);
    }

    #[test]
    fn test_trailing_separator_outside_span() {
        let line = LogicalLine::from_text("x = 5;\n", 0);
        assert_eq!(line.statement_count(), 1);
        let span = line.spans()[0];
        let sep_after = line.fragments()[span.end..]
            .iter()
            .any(|f| f.kind == FragmentKind::Separator);
        assert!(sep_after);
    }

    #[test]
    fn test_trim_trailing_separators() {
        let mut line = LogicalLine::from_text("x = 5 ;\n", 0);
        assert!(line.trim_trailing_separators());
        assert_eq!(line.text(), "x = 5 \n");
        assert_eq!(line.statement_count(), 1);
        assert!(!line.trim_trailing_separators());
    }

    #[test]
    fn test_remove_empty_statement_markers() {
        let mut line = LogicalLine::from_text("x = 1;; y = 2;\n", 0);
        assert!(line.remove_empty_statement_markers());
        assert_eq!(line.text(), "x = 1; y = 2\n");
        assert_eq!(line.statement_count(), 2);
    }

    #[test]
    fn test_remove_markers_on_separator_only_line() {
        let mut line = LogicalLine::from_text(";;\n", 0);
        assert_eq!(line.statement_count(), 0);
        assert!(line.remove_empty_statement_markers());
        assert_eq!(line.text(), "\n");
    }

    #[test]
    fn test_erase_fragments_rescans() {
        let mut line = LogicalLine::from_text("x = 5; y = 10\n", 0);
        let second_start = line.spans()[1].start;
        line.erase_fragments(0..second_start);
        assert_eq!(line.statement_count(), 1);
        assert_eq!(line.text(), " y = 10\n");
        // Hard post-condition: no span may reference erased fragments
        for span in line.spans() {
            assert!(span.end <= line.fragments().len());
        }
    }

    #[test]
    fn test_continuation_joined_into_one_line() {
        let buffer = LineBuffer::from_source("x = 1 + &\n    2\ny = 3\n");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.line(0).statement_count(), 1);
        assert_eq!(buffer.line(0).statement_code(0), "x = 1 + 2 ");
    }

    #[test]
    fn test_continuation_with_leading_ampersand() {
        let buffer = LineBuffer::from_source("x = 1 + &\n  & 2\n");
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.line(0).statement_code(0), "x = 1 +  2 ");
    }

    #[test]
    fn test_roundtrip_source() {
        let source = "program p\n  x = 1; y = 2\n  ! comment\nend program p\n";
        let buffer = LineBuffer::from_source(source);
        assert_eq!(buffer.to_source(), source);
    }

    #[test]
    fn test_roundtrip_no_trailing_newline() {
        let source = "x = 1\ny = 2";
        let buffer = LineBuffer::from_source(source);
        assert_eq!(buffer.to_source(), source);
    }

    #[test]
    fn test_indentation() {
        let line = LogicalLine::from_text("    call foo()\n", 0);
        assert_eq!(line.indentation(), 4);
    }

    #[test]
    fn test_set_indentation() {
        let mut line = LogicalLine::from_text("    call foo()\n", 0);
        assert!(line.set_indentation(2));
        assert_eq!(line.text(), "  call foo()\n");
        assert!(!line.set_indentation(2));
    }

    #[test]
    fn test_replace_statement_text() {
        let mut line = LogicalLine::from_text("  end\n", 0);
        line.replace_statement_text(0, "  end subroutine foo");
        assert_eq!(line.text(), "  end subroutine foo\n");
        assert_eq!(line.statement_count(), 1);
    }

    #[test]
    fn test_fragment_positions() {
        let line = LogicalLine::from_text("x = 1; y = 2\n", 3);
        let frags = line.fragments();
        assert_eq!(frags[0].pos, SourcePos { row: 3, col: 0 });
        assert_eq!(frags[1].kind, FragmentKind::Separator);
        assert_eq!(frags[1].pos, SourcePos { row: 3, col: 5 });
    }
}
