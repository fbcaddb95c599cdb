/// `CharScan` - Iterator that classifies characters of a logical line
///
/// Wraps a string iterator and maintains state about whether we are inside
/// string literals or comments. Statement-boundary detection, continuation
/// handling and fragment scanning all rely on it so that `;`, `!` and `&`
/// inside string literals are never treated as syntax.

/// Type of string delimiter we're currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    #[default]
    None,
    Single, // '...'
    Double, // "..."
}

/// Classification of a scanned character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Plain Fortran code, including the quote characters themselves
    Code,
    /// Inside a string literal
    Str,
    /// Inside a comment (from `!` to the end of the physical line)
    Comment,
}

/// Iterator yielding `(byte position, char, class)` over a logical line.
///
/// A logical line may contain embedded newlines (continuation lines); a
/// newline terminates any open comment but string state carries across it,
/// matching Fortran's explicit-continuation string semantics.
pub struct CharScan<'a> {
    chars: std::str::CharIndices<'a>,
    quote: QuoteState,
    in_comment: bool,
}

impl<'a> CharScan<'a> {
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        Self {
            chars: content.char_indices(),
            quote: QuoteState::None,
            in_comment: false,
        }
    }

    /// Current string state (usable after the iterator is exhausted, for
    /// carrying open strings across physical lines).
    #[must_use]
    pub fn quote_state(&self) -> QuoteState {
        self.quote
    }

    /// Resume scanning with a known string state.
    #[must_use]
    pub fn with_quote_state(content: &'a str, quote: QuoteState) -> Self {
        Self {
            chars: content.char_indices(),
            quote,
            in_comment: false,
        }
    }
}

impl Iterator for CharScan<'_> {
    type Item = (usize, char, CharClass);

    fn next(&mut self) -> Option<Self::Item> {
        let (pos, c) = self.chars.next()?;

        if c == '\n' {
            // A newline always ends a comment; strings stay open (the line
            // buffer only joins lines on explicit continuation).
            self.in_comment = false;
            return Some((pos, c, CharClass::Code));
        }

        if self.in_comment {
            return Some((pos, c, CharClass::Comment));
        }

        match self.quote {
            QuoteState::Single => {
                if c == '\'' {
                    self.quote = QuoteState::None;
                }
                Some((pos, c, CharClass::Str))
            }
            QuoteState::Double => {
                if c == '"' {
                    self.quote = QuoteState::None;
                }
                Some((pos, c, CharClass::Str))
            }
            QuoteState::None => match c {
                '\'' => {
                    self.quote = QuoteState::Single;
                    Some((pos, c, CharClass::Str))
                }
                '"' => {
                    self.quote = QuoteState::Double;
                    Some((pos, c, CharClass::Str))
                }
                '!' => {
                    self.in_comment = true;
                    Some((pos, c, CharClass::Comment))
                }
                _ => Some((pos, c, CharClass::Code)),
            },
        }
    }
}

/// Find the byte position of the first unquoted, uncommented occurrence of
/// `needle` in `text`.
#[must_use]
pub fn find_code_char(text: &str, needle: char) -> Option<usize> {
    CharScan::new(text)
        .find(|&(_, c, class)| class == CharClass::Code && c == needle)
        .map(|(pos, _, _)| pos)
}

/// Check whether the code portion of `text` (strings and comments excluded)
/// ends with a continuation ampersand.
#[must_use]
pub fn ends_with_continuation(text: &str) -> bool {
    let mut last_code = None;
    for (_, c, class) in CharScan::new(text) {
        if class == CharClass::Code && !c.is_whitespace() {
            last_code = Some(c);
        }
    }
    last_code == Some('&')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_only(text: &str) -> String {
        CharScan::new(text)
            .filter(|&(_, _, class)| class == CharClass::Code)
            .map(|(_, c, _)| c)
            .collect()
    }

    #[test]
    fn test_plain_code() {
        assert_eq!(code_only("x = 5"), "x = 5");
    }

    #[test]
    fn test_strings_classified() {
        assert_eq!(code_only(r#"x = "a;b" + 5"#), "x =  + 5");
        assert_eq!(code_only("x = 'it''s'"), "x = ");
    }

    #[test]
    fn test_comments_classified() {
        assert_eq!(code_only("x = 5 ! note"), "x = 5 ");
        // Bang inside a string is not a comment
        assert_eq!(code_only("print *, 'hi!'"), "print *, ");
    }

    #[test]
    fn test_newline_ends_comment() {
        assert_eq!(code_only("x = 1 ! a\ny = 2"), "x = 1 \ny = 2");
    }

    #[test]
    fn test_find_code_char() {
        assert_eq!(find_code_char("x = 1; y = 2", ';'), Some(5));
        assert_eq!(find_code_char("x = ';'", ';'), None);
        assert_eq!(find_code_char("! ;", ';'), None);
    }

    #[test]
    fn test_ends_with_continuation() {
        assert!(ends_with_continuation("x = 1 + &"));
        assert!(ends_with_continuation("x = 1 + & ! comment"));
        assert!(!ends_with_continuation("x = '&'"));
        assert!(!ends_with_continuation("x = 1"));
    }

    #[test]
    fn test_quote_state_carry() {
        let mut scan = CharScan::new("x = \"open");
        for _ in scan.by_ref() {}
        assert_eq!(scan.quote_state(), QuoteState::Double);

        let resumed = CharScan::with_quote_state("still\" + 1", QuoteState::Double);
        let code: String = resumed
            .filter(|&(_, _, class)| class == CharClass::Code)
            .map(|(_, c, _)| c)
            .collect();
        assert_eq!(code, " + 1");
    }
}
