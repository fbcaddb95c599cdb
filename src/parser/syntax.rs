//! Tagged statement syntax nodes and cursor navigation.
//!
//! [`parse_statement`] classifies one statement's code text and builds a
//! small tagged subtree for the statement shapes the transformations care
//! about (call statements, action-form if statements, use statements).
//! Everything else becomes an opaque [`SyntaxTag::OtherStmt`] leaf.
//!
//! [`Cursor`] is the navigation primitive consumed by the call-site matcher
//! and the use-statement locator: tag inspection, descent to the first
//! child, sibling advance with an optional skip count, and a has-more-
//! siblings query. Navigation helpers return `Option` so malformed shapes
//! surface as typed errors at the caller instead of aborting.

use crate::parser::char_scan::{CharClass, CharScan};
use crate::parser::patterns::{
    ASSIGNMENT_RE, CALL_RE, IF_PREFIX_RE, STATEMENT_LABEL_RE, THEN_TAIL_RE, USE_RE,
};

/// Grammatical category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxTag {
    /// `if (cond) action-stmt` (the action form, not the IF/THEN construct)
    IfStmt,
    /// Wrapper around the statement guarded by an if-statement
    ActionStmt,
    /// `call designator(args)`
    CallStmt,
    /// `use [, intrinsic ::] name [, only: ...]`
    UseStmt,
    /// `lhs = rhs`
    AssignmentStmt,
    /// Any statement the transformations do not inspect further
    OtherStmt,
    /// A qualified designator (`obj%part%name`)
    PartRef,
    /// A bare name token
    Name,
    /// A keyword token (`call`, `use`, `if`, `intrinsic`, ...)
    Keyword,
    /// Punctuation token (`,`, `::`, `%`)
    Punct,
    /// The parenthesized condition of an if-statement
    Condition,
    /// A parenthesized actual-argument list
    ArgList,
    /// Trailing statement text not broken into tokens (e.g. an only-list)
    Tail,
}

impl SyntaxTag {
    /// Human-readable tag name used in error messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxTag::IfStmt => "if-statement",
            SyntaxTag::ActionStmt => "action-statement",
            SyntaxTag::CallStmt => "call-statement",
            SyntaxTag::UseStmt => "use-statement",
            SyntaxTag::AssignmentStmt => "assignment-statement",
            SyntaxTag::OtherStmt => "statement",
            SyntaxTag::PartRef => "part-reference",
            SyntaxTag::Name => "name",
            SyntaxTag::Keyword => "keyword",
            SyntaxTag::Punct => "punctuation",
            SyntaxTag::Condition => "condition",
            SyntaxTag::ArgList => "argument-list",
            SyntaxTag::Tail => "statement tail",
        }
    }
}

/// A node of the statement syntax tree. Token-bearing leaves carry the
/// literal text needed for case-insensitive name comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    tag: SyntaxTag,
    text: String,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    fn leaf(tag: SyntaxTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
            children: Vec::new(),
        }
    }

    fn inner(tag: SyntaxTag, children: Vec<SyntaxNode>) -> Self {
        Self {
            tag,
            text: String::new(),
            children,
        }
    }

    #[must_use]
    pub fn tag(&self) -> SyntaxTag {
        self.tag
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// Cursor positioned at this node (as the only element of its sibling
    /// list).
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            siblings: std::slice::from_ref(self),
            idx: 0,
        }
    }
}

/// A navigable position within a syntax tree.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    siblings: &'a [SyntaxNode],
    idx: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn node(&self) -> &'a SyntaxNode {
        &self.siblings[self.idx]
    }

    #[must_use]
    pub fn tag(&self) -> SyntaxTag {
        self.node().tag
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.node().text
    }

    /// Move to the first child of the current node.
    #[must_use]
    pub fn first_child(self) -> Option<Cursor<'a>> {
        let children = &self.node().children;
        if children.is_empty() {
            None
        } else {
            Some(Cursor {
                siblings: children,
                idx: 0,
            })
        }
    }

    /// Move forward `n` siblings (`n >= 1`).
    #[must_use]
    pub fn advance(self, n: usize) -> Option<Cursor<'a>> {
        let idx = self.idx.checked_add(n)?;
        if idx < self.siblings.len() {
            Some(Cursor { siblings: self.siblings, idx })
        } else {
            None
        }
    }

    /// Move to the next sibling.
    #[must_use]
    pub fn next_sibling(self) -> Option<Cursor<'a>> {
        self.advance(1)
    }

    /// Whether further siblings follow the current node.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.idx + 1 < self.siblings.len()
    }

    /// Move to the last sibling of the current list.
    #[must_use]
    pub fn last_sibling(self) -> Cursor<'a> {
        Cursor {
            siblings: self.siblings,
            idx: self.siblings.len() - 1,
        }
    }
}

/// Parse one statement's code text (continuations already joined, comments
/// stripped) into a tagged syntax tree.
#[must_use]
pub fn parse_statement(code: &str) -> SyntaxNode {
    // Statement labels do not affect classification
    let code = STATEMENT_LABEL_RE.replace(code, "");
    let trimmed = code.trim();

    if CALL_RE.is_match(trimmed) {
        return parse_call(trimmed);
    }
    if USE_RE.is_match(trimmed) {
        return parse_use(trimmed);
    }
    if IF_PREFIX_RE.is_match(trimmed) {
        if let Some(stmt) = parse_if_action(trimmed) {
            return stmt;
        }
    }
    if ASSIGNMENT_RE.is_match(trimmed) {
        return SyntaxNode::leaf(SyntaxTag::AssignmentStmt, trimmed);
    }
    SyntaxNode::leaf(SyntaxTag::OtherStmt, trimmed)
}

/// Parse `if (cond) action` into an if-statement node, or None when the
/// text is an IF/THEN construct header (or malformed).
fn parse_if_action(code: &str) -> Option<SyntaxNode> {
    let open = code.find('(')?;
    let close = matching_paren(code, open)?;
    let condition = &code[open + 1..close];
    let tail = code[close + 1..].trim();
    if tail.is_empty() || THEN_TAIL_RE.is_match(tail) {
        // IF/THEN construct header, handled by the scope machinery
        return None;
    }
    let action = parse_statement(tail);
    Some(SyntaxNode::inner(
        SyntaxTag::IfStmt,
        vec![
            SyntaxNode::leaf(SyntaxTag::Keyword, &code[..open]),
            SyntaxNode::leaf(SyntaxTag::Condition, condition),
            SyntaxNode::inner(SyntaxTag::ActionStmt, vec![action]),
        ],
    ))
}

/// Parse `call designator[(args)]`.
fn parse_call(code: &str) -> SyntaxNode {
    let mut children = vec![SyntaxNode::leaf(SyntaxTag::Keyword, "call")];

    // Text after the CALL keyword
    let after = CALL_RE
        .find(code)
        .map_or("", |m| code[m.end()..].trim_start());

    // Split the designator from the trailing argument list: the `(` that
    // opens the arguments is the one following the final name, i.e. the
    // first depth-0 `(` after the last depth-0 `%`.
    let mut depth = 0usize;
    let mut last_percent: Option<usize> = None;
    let mut args_open: Option<usize> = None;
    for (pos, c, class) in CharScan::new(after) {
        if class != CharClass::Code {
            continue;
        }
        match c {
            '(' => {
                if depth == 0 && last_percent.map_or(true, |p| p < pos) && args_open.is_none() {
                    args_open = Some(pos);
                }
                depth += 1;
            }
            ')' => depth = depth.saturating_sub(1),
            '%' if depth == 0 => {
                last_percent = Some(pos);
                args_open = None;
            }
            _ => {}
        }
    }

    let (designator_text, args) = match args_open {
        Some(open) => (&after[..open], Some(&after[open..])),
        None => (after, None),
    };

    children.push(parse_designator(designator_text.trim()));
    if let Some(args) = args {
        children.push(SyntaxNode::leaf(SyntaxTag::ArgList, args.trim()));
    }
    SyntaxNode::inner(SyntaxTag::CallStmt, children)
}

/// Parse a (possibly qualified) procedure designator. A bare name becomes a
/// name leaf; `a%b(i)%c` becomes a part-reference whose last child is the
/// final name component.
fn parse_designator(text: &str) -> SyntaxNode {
    let parts = split_depth0(text, '%');
    if parts.len() == 1 {
        return SyntaxNode::leaf(SyntaxTag::Name, leading_name(text));
    }
    let mut children = Vec::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            children.push(SyntaxNode::leaf(SyntaxTag::Punct, "%"));
        }
        children.push(SyntaxNode::leaf(SyntaxTag::Name, leading_name(part)));
    }
    SyntaxNode::inner(SyntaxTag::PartRef, children)
}

/// Parse `use [, intrinsic ::] name [trailing]` into token children.
/// Whatever tokens actually exist are kept so the locator can report a
/// missing name as a shape violation.
fn parse_use(code: &str) -> SyntaxNode {
    let mut children = Vec::new();
    let mut rest = code.trim();

    // USE keyword
    let keyword_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map_or(rest.len(), |(i, _)| i);
    children.push(SyntaxNode::leaf(SyntaxTag::Keyword, &rest[..keyword_len]));
    rest = rest[keyword_len..].trim_start();

    // Optional `, intrinsic` / `, non_intrinsic` specifier
    if let Some(stripped) = rest.strip_prefix(',') {
        children.push(SyntaxNode::leaf(SyntaxTag::Punct, ","));
        rest = stripped.trim_start();
        let word_len = rest
            .char_indices()
            .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
            .map_or(rest.len(), |(i, _)| i);
        if word_len > 0 {
            children.push(SyntaxNode::leaf(SyntaxTag::Keyword, &rest[..word_len]));
            rest = rest[word_len..].trim_start();
        }
    }

    // Optional `::` separator
    if let Some(stripped) = rest.strip_prefix("::") {
        children.push(SyntaxNode::leaf(SyntaxTag::Punct, "::"));
        rest = stripped.trim_start();
    }

    // Module name
    let name_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map_or(rest.len(), |(i, _)| i);
    if name_len > 0 {
        children.push(SyntaxNode::leaf(SyntaxTag::Name, &rest[..name_len]));
        rest = rest[name_len..].trim_start();
    }

    // Only-list and rename-list stay unparsed
    if !rest.is_empty() {
        children.push(SyntaxNode::leaf(SyntaxTag::Tail, rest));
    }
    SyntaxNode::inner(SyntaxTag::UseStmt, children)
}

/// Byte position of the parenthesis matching the one at `open`, skipping
/// string literals.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (pos, c, class) in CharScan::new(text) {
        if pos < open || class != CharClass::Code {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split at depth-0 occurrences of `sep`, skipping string literals.
fn split_depth0(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (pos, c, class) in CharScan::new(text) {
        if class != CharClass::Code {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..pos]);
                start = pos + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Leading identifier of a designator part (strips subscripts and blanks).
fn leading_name(part: &str) -> &str {
    let part = part.trim();
    let end = part
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map_or(part.len(), |(i, _)| i);
    &part[..end]
}
