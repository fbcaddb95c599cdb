//! Conditional module-use insertion.
//!
//! For every non-internal procedure whose execution part calls one of the
//! target procedures, a `use MODULE` statement is added at the end of the
//! procedure's use-declarations region, unless an import of that module is
//! already present. Internal procedures are skipped: they inherit the host
//! association of their enclosing procedure.

use crate::analyze::procedures::{scan_procedures, Procedure};
use crate::error::Result;
use crate::parser::lines::{LineBuffer, LogicalLine};
use crate::parser::patterns::USE_RE;
use crate::parser::syntax::parse_statement;
use crate::transform::calls::{statement_calls_target, TargetSet};
use crate::transform::uses::module_name;

/// The module import to synthesize at matching call sites.
#[derive(Debug, Clone)]
pub struct ModuleUse {
    name: String,
    only: Vec<String>,
}

impl ModuleUse {
    /// A whole-module import (no only-list).
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            only: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered use-statement body, without indentation or newline.
    #[must_use]
    pub fn statement_text(&self) -> String {
        debug_assert!(self.only.is_empty());
        format!("use {}", self.name)
    }
}

/// Per-file tally of what the insertion pass did and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub already_present: usize,
    pub skipped_internal: usize,
    pub skipped_no_exec: usize,
    pub unmatched: usize,
}

impl InsertReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.inserted > 0
    }
}

/// Run the insertion pass over the buffer.
///
/// Procedures are processed in descending order of their insertion points,
/// so an insertion never shifts the line indices of a procedure still to be
/// processed. Malformed call- or use-statement trees abort the whole run.
pub fn insert_use_statements(
    buffer: &mut LineBuffer,
    targets: &TargetSet,
    module: &ModuleUse,
    verbose: bool,
) -> Result<InsertReport> {
    let mut procedures = scan_procedures(buffer);
    procedures.sort_by(|a, b| b.use_region_end.cmp(&a.use_region_end));

    let mut report = InsertReport::default();
    for proc in &procedures {
        if proc.is_internal {
            if verbose {
                eprintln!("  {}: internal procedure, host association applies", proc.name);
            }
            report.skipped_internal += 1;
            continue;
        }
        let Some(exec) = proc.exec_part.clone() else {
            if verbose {
                eprintln!("  {}: no execution part", proc.name);
            }
            report.skipped_no_exec += 1;
            continue;
        };

        let mut calls_target = false;
        for idx in exec {
            let line = buffer.line(idx);
            for k in 0..line.statement_count() {
                let stmt = parse_statement(&line.statement_code(k));
                if statement_calls_target(&stmt, targets)? {
                    calls_target = true;
                    break;
                }
            }
            if calls_target {
                break;
            }
        }
        if !calls_target {
            report.unmatched += 1;
            continue;
        }

        if module_already_used(buffer, proc, module)? {
            if verbose {
                eprintln!("  {}: already uses {}", proc.name, module.name());
            }
            report.already_present += 1;
            continue;
        }

        let indent = insertion_indent(buffer, proc);
        let text = format!("{:indent$}{}\n", "", module.statement_text());
        buffer.insert(proc.use_region_end, LogicalLine::from_text(&text, 0));
        if verbose {
            eprintln!("  {}: inserting use of {}", proc.name, module.name());
        }
        report.inserted += 1;
    }
    Ok(report)
}

/// Whether the procedure's use region already imports the module.
fn module_already_used(
    buffer: &LineBuffer,
    proc: &Procedure,
    module: &ModuleUse,
) -> Result<bool> {
    for idx in proc.header + 1..proc.use_region_end {
        let line = buffer.line(idx);
        for k in 0..line.statement_count() {
            let code = line.statement_code(k);
            if !USE_RE.is_match(&code) {
                continue;
            }
            let stmt = parse_statement(&code);
            if module_name(&stmt)? == module.name() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Indentation for the synthesized line: two columns past the first code
/// line at or after the insertion point, falling back to the header.
fn insertion_indent(buffer: &LineBuffer, proc: &Procedure) -> usize {
    for idx in proc.use_region_end..proc.body.end {
        let line = buffer.line(idx);
        if line.has_code() {
            return line.indentation() + 2;
        }
    }
    buffer.line(proc.header).indentation() + 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::LineBuffer;

    fn run(source: &str, target: &str, module: &str) -> (String, InsertReport) {
        let mut buffer = LineBuffer::from_source(source);
        let targets = TargetSet::from_names([target]);
        let module = ModuleUse::new(module);
        let report = insert_use_statements(&mut buffer, &targets, &module, false).unwrap();
        (buffer.to_source(), report)
    }

    #[test]
    fn test_inserts_after_existing_uses() {
        let (out, report) = run(
            "subroutine s()\n  use other_mod\n  integer :: x\n  call legacy(x)\nend subroutine s\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 1);
        assert_eq!(
            out,
            "subroutine s()\n  use other_mod\n    use new_mod\n  integer :: x\n  call legacy(x)\nend subroutine s\n"
        );
    }

    #[test]
    fn test_inserts_after_header_without_uses() {
        let (out, report) = run(
            "subroutine s()\n  integer :: x\n  call legacy(x)\nend subroutine s\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 1);
        assert_eq!(
            out,
            "subroutine s()\n    use new_mod\n  integer :: x\n  call legacy(x)\nend subroutine s\n"
        );
    }

    #[test]
    fn test_no_call_no_insert() {
        let source = "subroutine s()\n  x = 1\nend subroutine s\n";
        let (out, report) = run(source, "legacy", "new_mod");
        assert_eq!(out, source);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.unmatched, 1);
    }

    #[test]
    fn test_already_present_is_idempotent() {
        let source =
            "subroutine s()\n  use new_mod\n  call legacy()\nend subroutine s\n";
        let (out, report) = run(source, "legacy", "new_mod");
        assert_eq!(out, source);
        assert_eq!(report.already_present, 1);
    }

    #[test]
    fn test_existing_use_matched_case_insensitively() {
        let source = "subroutine s()\n  USE New_Mod\n  call legacy()\nend subroutine s\n";
        let (out, report) = run(source, "legacy", "new_mod");
        assert_eq!(out, source);
        assert_eq!(report.already_present, 1);
    }

    #[test]
    fn test_internal_procedure_skipped() {
        let source = "subroutine outer()\n  y = 1\ncontains\n  subroutine inner()\n    call legacy()\n  end subroutine inner\nend subroutine outer\n";
        let (out, report) = run(source, "legacy", "new_mod");
        assert_eq!(out, source);
        assert_eq!(report.skipped_internal, 1);
    }

    #[test]
    fn test_module_procedure_receives_insert() {
        let (out, report) = run(
            "module m\ncontains\n  subroutine s()\n    call legacy()\n  end subroutine s\nend module m\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 1);
        assert!(out.contains("      use new_mod\n"));
    }

    #[test]
    fn test_guarded_call_matches() {
        let (_, report) = run(
            "subroutine s()\n  if (flag) call legacy(x)\nend subroutine s\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_qualified_call_matches_terminal_name() {
        let (_, report) = run(
            "subroutine s()\n  call obj%legacy(x)\nend subroutine s\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_call_in_declarations_ignored() {
        // Only the execution part is scanned; an interface body naming the
        // target does not trigger insertion
        let source = "subroutine s()\n  interface\n    subroutine legacy()\n    end subroutine legacy\n  end interface\n  x = 1\nend subroutine s\n";
        let (out, report) = run(source, "legacy", "new_mod");
        assert_eq!(out, source);
        assert_eq!(report.inserted, 0);
    }

    #[test]
    fn test_multiple_procedures_in_one_file() {
        let (out, report) = run(
            "subroutine a()\n  call legacy()\nend subroutine a\nsubroutine b()\n  call legacy()\nend subroutine b\nsubroutine c()\n  x = 1\nend subroutine c\n",
            "legacy",
            "new_mod",
        );
        assert_eq!(report.inserted, 2);
        assert_eq!(report.unmatched, 1);
        assert_eq!(out.matches("use new_mod").count(), 2);
    }

    #[test]
    fn test_indentation_follows_region() {
        let (out, _) = run(
            "module m\ncontains\n    subroutine s()\n        integer :: x\n        call legacy(x)\n    end subroutine s\nend module m\n",
            "legacy",
            "new_mod",
        );
        // Two columns past the declaration that follows the insertion point
        assert!(out.contains("\n          use new_mod\n"));
    }

    #[test]
    fn test_run_twice_is_stable() {
        let source = "subroutine s()\n  call legacy()\nend subroutine s\n";
        let (once, _) = run(source, "legacy", "new_mod");
        let (twice, report) = run(&once, "legacy", "new_mod");
        assert_eq!(once, twice);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.already_present, 1);
    }
}
