//! Program-unit scanning: procedures and their regions.
//!
//! Walks a line buffer with a regex-driven scope stack (subroutines,
//! functions, programs, modules, submodules) and produces a [`Procedure`]
//! record per subprogram, carrying its named regions: the use-declarations
//! region and the execution-part region. Procedures nested after a
//! `contains` inside another subprogram are flagged internal; procedures
//! after a module's `contains` are module procedures.

use std::ops::Range;

use crate::parser::lines::LineBuffer;
use crate::parser::patterns::{
    CONTAINS_RE, DECL_RE, END_INTERFACE_RE, END_UNIT_RE, FUNCTION_START_RE, INTERFACE_RE,
    MODULE_START_RE, PROGRAM_START_RE, SUBMODULE_START_RE, SUBROUTINE_START_RE, USE_RE,
};

/// Kind of program unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Program,
    Module,
    Submodule,
    Subroutine,
    Function,
}

impl UnitKind {
    /// Units that have an executable body and can receive transformations.
    #[must_use]
    pub fn is_procedure(self) -> bool {
        matches!(self, UnitKind::Program | UnitKind::Subroutine | UnitKind::Function)
    }

    /// Keyword as it appears in `end` statements.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            UnitKind::Program => "program",
            UnitKind::Module => "module",
            UnitKind::Submodule => "submodule",
            UnitKind::Subroutine => "subroutine",
            UnitKind::Function => "function",
        }
    }
}

/// A named region of the parse tree with its sub-regions resolved to line
/// index ranges. Regions are disjoint and ordered: the use-declarations
/// region precedes the execution part.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub name: String,
    pub kind: UnitKind,
    /// Nested after `contains` inside another subprogram
    pub is_internal: bool,
    /// Nested after `contains` inside a module or submodule
    pub is_module_procedure: bool,
    /// Line index of the unit header statement
    pub header: usize,
    /// Full body, header through end statement (inclusive range end)
    pub body: Range<usize>,
    /// Insertion point: first line index past the use-declarations region
    pub use_region_end: usize,
    /// Execution-part region, when the procedure has one
    pub exec_part: Option<Range<usize>>,
}

/// Construct names that can follow a bare `end`; such statements close
/// block constructs, not program units.
const CONSTRUCT_END_NAMES: &[&str] = &[
    "if", "do", "select", "where", "forall", "associate", "block", "type", "interface", "enum",
    "critical", "team",
];

struct Frame {
    kind: UnitKind,
    name: String,
    start: usize,
    after_contains: bool,
    is_internal: bool,
    is_module_procedure: bool,
}

/// Scan the buffer into procedure records, in order of their end statements
/// (innermost first).
#[must_use]
pub fn scan_procedures(buffer: &LineBuffer) -> Vec<Procedure> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut procedures = Vec::new();
    let mut interface_depth = 0usize;

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
        if INTERFACE_RE.is_match(&stmt) && !END_INTERFACE_RE.is_match(&stmt) {
            interface_depth += 1;
            continue;
        }

        if CONTAINS_RE.is_match(&stmt) {
            if let Some(frame) = stack.last_mut() {
                frame.after_contains = true;
            }
            continue;
        }

        if END_UNIT_RE.is_match(&stmt) {
            if unit_end(&stmt).is_some() {
                if let Some(frame) = stack.pop() {
                    if frame.kind.is_procedure() {
                        procedures.push(finish_procedure(buffer, frame, idx));
                    }
                }
            }
            continue;
        }

        if let Some(frame) = classify_unit_start(&stmt, idx, stack.last()) {
            stack.push(frame);
        }
    }

    // Units left open at end-of-file are closed there
    let end = buffer.len();
    while let Some(frame) = stack.pop() {
        if frame.kind.is_procedure() {
            procedures.push(finish_procedure(buffer, frame, end.saturating_sub(1)));
        }
    }
    procedures
}

/// Parse a statement as a program-unit header.
pub(crate) fn unit_start(stmt: &str) -> Option<(UnitKind, String)> {
    if let Some(caps) = SUBROUTINE_START_RE.captures(stmt) {
        Some((UnitKind::Subroutine, caps[1].to_string()))
    } else if let Some(caps) = FUNCTION_START_RE.captures(stmt) {
        Some((UnitKind::Function, caps[1].to_string()))
    } else if let Some(caps) = PROGRAM_START_RE.captures(stmt) {
        Some((UnitKind::Program, caps[1].to_string()))
    } else if let Some(caps) = SUBMODULE_START_RE.captures(stmt) {
        Some((UnitKind::Submodule, caps[1].to_string()))
    } else if let Some(caps) = MODULE_START_RE.captures(stmt) {
        // `module subroutine` / `module function` separate-module-procedure
        // headers are caught by the subprogram patterns above; a stray
        // `module procedure` header is not a unit we track
        if caps[1].eq_ignore_ascii_case("procedure") {
            return None;
        }
        Some((UnitKind::Module, caps[1].to_string()))
    } else {
        None
    }
}

/// Parse a statement as a program-unit end. Yields the unit keyword and the
/// unit name when present; `None` when the statement ends a block construct
/// or is not an end statement.
pub(crate) fn unit_end(stmt: &str) -> Option<(Option<String>, Option<String>)> {
    let caps = END_UNIT_RE.captures(stmt)?;
    let keyword = caps.get(2).map(|m| m.as_str().to_lowercase());
    let name = caps.get(4).map(|m| m.as_str().to_string());
    let closes_construct = keyword.is_none()
        && name
            .as_deref()
            .is_some_and(|n| CONSTRUCT_END_NAMES.contains(&n.to_lowercase().as_str()));
    if closes_construct {
        None
    } else {
        Some((keyword, name))
    }
}

fn classify_unit_start(stmt: &str, idx: usize, parent: Option<&Frame>) -> Option<Frame> {
    let (kind, name) = unit_start(stmt)?;

    let (is_internal, is_module_procedure) = match (kind.is_procedure(), parent) {
        (true, Some(p)) if p.after_contains => (
            p.kind.is_procedure(),
            matches!(p.kind, UnitKind::Module | UnitKind::Submodule),
        ),
        _ => (false, false),
    };

    Some(Frame {
        kind,
        name,
        start: idx,
        after_contains: false,
        is_internal,
        is_module_procedure,
    })
}

fn finish_procedure(buffer: &LineBuffer, frame: Frame, end_idx: usize) -> Procedure {
    let body = frame.start..end_idx + 1;
    let (use_region_end, exec_part) = compute_regions(buffer, frame.start + 1, end_idx);
    Procedure {
        name: frame.name,
        kind: frame.kind,
        is_internal: frame.is_internal,
        is_module_procedure: frame.is_module_procedure,
        header: frame.start,
        body,
        use_region_end,
        exec_part,
    }
}

/// Resolve the use-declarations region boundary and the execution part of a
/// body spanning `first..end`.
fn compute_regions(buffer: &LineBuffer, first: usize, end: usize) -> (usize, Option<Range<usize>>) {
    let mut use_end = first;
    let mut exec_start = None;
    let mut in_leading_uses = true;
    let mut interface_depth = 0usize;

    let mut j = first;
    while j < end {
        let line = buffer.line(j);
        if !line.has_code() {
            j += 1;
            continue;
        }
        let stmt = line.statement_code(0);

        if interface_depth > 0 {
            if END_INTERFACE_RE.is_match(&stmt) {
                interface_depth -= 1;
            } else if INTERFACE_RE.is_match(&stmt) {
                interface_depth += 1;
            }
            j += 1;
            continue;
        }
        if CONTAINS_RE.is_match(&stmt) {
            return (use_end, exec_start.map(|s| s..j));
        }
        if in_leading_uses && USE_RE.is_match(&stmt) {
            use_end = j + 1;
            j += 1;
            continue;
        }
        if INTERFACE_RE.is_match(&stmt) {
            in_leading_uses = false;
            interface_depth += 1;
            j += 1;
            continue;
        }
        if DECL_RE.is_match(&stmt) {
            in_leading_uses = false;
            j += 1;
            continue;
        }

        // First executable statement: the rest of the body up to CONTAINS
        // (or the end statement) is the execution part
        exec_start = Some(j);
        let mut k = j + 1;
        while k < end {
            let inner = buffer.line(k);
            if inner.has_code() && CONTAINS_RE.is_match(&inner.statement_code(0)) {
                return (use_end, Some(j..k));
            }
            k += 1;
        }
        return (use_end, Some(j..end));
    }

    (use_end, exec_start.map(|s| s..end))
}
