//! End-statement elaboration.
//!
//! Rewrites bare `end` statements (and `end subroutine` forms missing the
//! unit name) to the fully elaborated `end KEYWORD NAME` form, tracking open
//! program units with a scope stack.

use crate::analyze::procedures::{unit_end, unit_start, UnitKind};
use crate::parser::lines::LineBuffer;
use crate::parser::patterns::{CONTAINS_RE, END_INTERFACE_RE, INTERFACE_RE};

struct OpenUnit {
    kind: UnitKind,
    name: String,
}

/// Elaborate end statements throughout the buffer. Returns whether any
/// change occurred.
pub fn elaborate_end_statements(buffer: &mut LineBuffer) -> bool {
    let mut stack: Vec<OpenUnit> = Vec::new();
    let mut interface_depth = 0usize;
    let mut changed = false;

    for idx in 0..buffer.len() {
        let line = buffer.line(idx);
        if !line.has_code() {
            continue;
        }
        let stmt = line.statement_code(0);

        if interface_depth > 0 {
            if END_INTERFACE_RE.is_match(&stmt) {
                interface_depth -= 1;
            } else if INTERFACE_RE.is_match(&stmt) {
                interface_depth += 1;
            }
            continue;
        }
        if INTERFACE_RE.is_match(&stmt) {
            interface_depth += 1;
            continue;
        }
        if CONTAINS_RE.is_match(&stmt) {
            continue;
        }

        if let Some((keyword, name)) = unit_end(&stmt) {
            let Some(unit) = stack.pop() else {
                continue;
            };
            if keyword.is_some() && name.is_some() {
                continue;
            }
            let indent = line.indentation();
            let elaborated =
                format!("{:indent$}end {} {}", "", unit.kind.keyword(), unit.name);
            buffer.line_mut(idx).replace_statement_text(0, &elaborated);
            changed = true;
            continue;
        }

        if let Some((kind, name)) = unit_start(&stmt) {
            stack.push(OpenUnit { kind, name });
        }
    }
    changed
}
