//! Nesting-depth reindentation.
//!
//! Recomputes the leading whitespace of every code line from the construct
//! nesting depth: program units, IF/THEN, DO, SELECT, derived-type
//! definitions, WHERE blocks and interface blocks each open a level.
//! Continuation keywords (ELSE, CASE, ELSEWHERE, CONTAINS) sit at the
//! parent level with their body back inside. Comment-only lines are left
//! where they are.

use crate::analyze::procedures::{unit_end, unit_start};
use crate::parser::patterns::{
    CASE_RE, CONTAINS_RE, DO_RE, ELSEWHERE_RE, ELSE_RE, END_DO_RE, END_IF_RE, END_INTERFACE_RE,
    END_SELECT_RE, END_TYPE_RE, END_WHERE_RE, IF_THEN_RE, INTERFACE_RE, SELECT_RE, TYPE_DEF_RE,
    WHERE_RE,
};
use crate::parser::lines::LineBuffer;

/// Reindent every code line in the buffer using `indent_size` columns per
/// nesting level. Returns whether any change occurred.
pub fn reindent(buffer: &mut LineBuffer, indent_size: usize) -> bool {
    let mut depth = 0usize;
    let mut changed = false;

    for idx in 0..buffer.len() {
        let line = buffer.line(idx);
        if !line.has_code() {
            continue;
        }
        let stmt = line.statement_code(0);
        let (dedent, opens) = classify(&stmt);

        let level = depth.saturating_sub(dedent);
        if buffer.line_mut(idx).set_indentation(level * indent_size) {
            changed = true;
        }
        depth = level + opens;
    }
    changed
}

/// Depth change of a statement: levels the line itself steps out of, and
/// levels it opens for the lines after it.
fn classify(stmt: &str) -> (usize, usize) {
    if unit_end(stmt).is_some()
        || END_IF_RE.is_match(stmt)
        || END_DO_RE.is_match(stmt)
        || END_SELECT_RE.is_match(stmt)
        || END_TYPE_RE.is_match(stmt)
        || END_WHERE_RE.is_match(stmt)
        || END_INTERFACE_RE.is_match(stmt)
    {
        return (1, 0);
    }
    if ELSE_RE.is_match(stmt)
        || ELSEWHERE_RE.is_match(stmt)
        || CASE_RE.is_match(stmt)
        || CONTAINS_RE.is_match(stmt)
    {
        return (1, 1);
    }
    if unit_start(stmt).is_some()
        || IF_THEN_RE.is_match(stmt)
        || DO_RE.is_match(stmt)
        || SELECT_RE.is_match(stmt)
        || TYPE_DEF_RE.is_match(stmt)
        || INTERFACE_RE.is_match(stmt)
        || (WHERE_RE.is_match(stmt) && is_where_block(stmt))
    {
        return (0, 1);
    }
    (0, 0)
}

/// Whether a WHERE statement is the block form: nothing but whitespace after
/// the closing parenthesis of the mask expression.
fn is_where_block(stmt: &str) -> bool {
    let mut level = 0i32;
    let mut seen_open = false;
    for (pos, c) in stmt.char_indices() {
        match c {
            '(' => {
                level += 1;
                seen_open = true;
            }
            ')' => {
                level -= 1;
                if level == 0 && seen_open {
                    return stmt[pos + 1..].trim().is_empty();
                }
            }
            _ => {}
        }
    }
    true
}
