/// Regex patterns for Fortran statement classification
///
/// All patterns are compiled once at startup using `LazyLock`.
///
/// All regexes use case-insensitive + unicode flags
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// Anchor patterns
const EOL_STR: &str = r"\s*$"; // End of statement text
const SOL_STR: &str = r"^\s*"; // Start of statement text

// ===== STATEMENT CLASSIFICATION =====

// CALL statement
pub static CALL_RE: LazyLock<Regex> = LazyLock::new(|| build_re(&format!(r"{SOL_STR}CALL\b")));

// USE statement (either `use name` or `use, intrinsic :: name` forms)
pub static USE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(&format!(r"{SOL_STR}USE(\s|,|::)")));

// Leading IF (both the action-statement form and the IF/THEN construct)
pub static IF_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}IF\s*\(")));

// Remainder after the closing parenthesis of an IF that makes it a construct
pub static THEN_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| build_re(&format!(r"^THEN{EOL_STR}")));

// Simple assignment detection: variable designator followed by a single `=`
pub static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\s*[a-z_]\w*[\w%() ,:]*=[^=]"));

// Statement label prefix (e.g., "100 continue")
pub static STATEMENT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\s*(\d+)\s+"));

// ===== PROGRAM UNITS =====

pub static SUBROUTINE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}(?:(?:PURE|IMPURE|ELEMENTAL|RECURSIVE|NON_RECURSIVE|MODULE)\s+)*SUBROUTINE\s+(\w+)"
    ))
});
pub static FUNCTION_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r#"^(?:[^!"'=]*\s)?FUNCTION\s+(\w+)\s*\(.*{EOL_STR}"#
    ))
});
pub static PROGRAM_START_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}PROGRAM\s+(\w+){EOL_STR}")));
pub static MODULE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}MODULE\s+(\w+){EOL_STR}")));
pub static SUBMODULE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}SUBMODULE\s*\(\s*\w+(?:\s*:\s*\w+)?\s*\)\s*(\w+){EOL_STR}"
    ))
});

// END of a program unit: bare END, or END + unit keyword + optional name.
// Deliberately does not match `end if`, `end do` etc.: the keyword list is
// closed and a name may only follow after whitespace.
pub static END_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}END(\s*(SUBROUTINE|FUNCTION|PROGRAM|MODULE|SUBMODULE|PROCEDURE))?(\s+(\w+))?{EOL_STR}"
    ))
});

pub static CONTAINS_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}CONTAINS{EOL_STR}")));

pub static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}(ABSTRACT\s+)?INTERFACE(\s+\w+|\s+OPERATOR\s*\(.*\)|\s+ASSIGNMENT\s*\(.*\))?{EOL_STR}"
    ))
});
pub static END_INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*INTERFACE(\s+\w+)?{EOL_STR}")));

// ===== DECLARATION REGION =====

// Statements that belong to the specification part of a procedure. Anything
// with code that matches none of these (and is not CONTAINS/END) marks the
// start of the execution part.
pub static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}(INTEGER|REAL|COMPLEX|LOGICAL|CHARACTER|DOUBLE\s+PRECISION|TYPE|CLASS|IMPLICIT|IMPORT|USE|PARAMETER|DIMENSION|ALLOCATABLE|POINTER|TARGET|SAVE|EXTERNAL|INTRINSIC|OPTIONAL|PUBLIC|PRIVATE|PROTECTED|DATA|EQUIVALENCE|COMMON|NAMELIST|PROCEDURE|ABSTRACT|INTERFACE|ENUM|ENUMERATOR|SEQUENCE|CONTIGUOUS|VOLATILE|ASYNCHRONOUS|BIND|VALUE|GENERIC|FORMAT|ENTRY)\b"
    ))
});

// ===== BLOCK CONSTRUCTS (reindent) =====

pub static IF_THEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}(\w+\s*:)?\s*IF\s*\(.*\)\s*THEN{EOL_STR}"
    ))
});
pub static ELSE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}ELSE(\s*IF\s*\(.*\)\s*THEN)?{EOL_STR}")));
pub static END_IF_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*IF(\s+\w+)?{EOL_STR}")));

pub static DO_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}(\w+\s*:)?\s*DO({EOL_STR}|\s+\w)")));
pub static END_DO_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*DO(\s+\w+)?{EOL_STR}")));

pub static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}(\w+\s*:)?\s*SELECT\s*(CASE|RANK|TYPE)\s*\(.*\){EOL_STR}"
    ))
});
pub static CASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}((CASE|RANK|TYPE\s+IS|CLASS\s+IS)\s*(\(.*\)|DEFAULT)|CLASS\s+DEFAULT){EOL_STR}"
    ))
});
pub static END_SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*SELECT(\s+\w+)?{EOL_STR}")));

pub static TYPE_DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}TYPE(\s*,\s*(BIND\s*\(\s*C\s*\)|EXTENDS\s*\(.*\)|ABSTRACT|PUBLIC|PRIVATE))*(\s*::\s*|\s+)\w+{EOL_STR}"
    ))
});
pub static END_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*TYPE(\s+\w+)?{EOL_STR}")));

pub static WHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}(\w+\s*:\s*)?WHERE\s*\(.*\){EOL_STR}")));
pub static ELSEWHERE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}ELSE\s*WHERE(\s*\(.*\))?(\s+\w+)?{EOL_STR}"
    ))
});
pub static END_WHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{SOL_STR}END\s*WHERE(\s+\w+)?{EOL_STR}")));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_regex() {
        assert!(CALL_RE.is_match("call foo(x)"));
        assert!(CALL_RE.is_match("  CALL Foo"));
        assert!(!CALL_RE.is_match("caller = 1"));
    }

    #[test]
    fn test_use_regex() {
        assert!(USE_RE.is_match("use my_mod"));
        assert!(USE_RE.is_match("USE, intrinsic :: iso_c_binding"));
        assert!(USE_RE.is_match("use :: m"));
        assert!(!USE_RE.is_match("user = 1"));
    }

    #[test]
    fn test_subroutine_start() {
        assert!(SUBROUTINE_START_RE.is_match("subroutine foo(x)"));
        assert!(SUBROUTINE_START_RE.is_match("pure recursive subroutine bar"));
        assert!(SUBROUTINE_START_RE.is_match("module subroutine baz()"));
        let caps = SUBROUTINE_START_RE.captures("elemental subroutine sq(x)").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "sq");
    }

    #[test]
    fn test_function_start() {
        assert!(FUNCTION_START_RE.is_match("function foo()"));
        assert!(FUNCTION_START_RE.is_match("integer function bar(x)"));
        assert!(FUNCTION_START_RE.is_match("pure function baz(a) result(r)"));
        assert!(!FUNCTION_START_RE.is_match("x = my_function(3)"));
    }

    #[test]
    fn test_end_unit_regex() {
        assert!(END_UNIT_RE.is_match("end"));
        assert!(END_UNIT_RE.is_match("end subroutine"));
        assert!(END_UNIT_RE.is_match("END SUBROUTINE foo"));
        assert!(END_UNIT_RE.is_match("endfunction bar"));
        // Construct ends must not look like unit ends
        assert!(!END_UNIT_RE.is_match("enddo"));
        assert!(!END_UNIT_RE.is_match("endif"));
        // `end if` is caught by the keyword check in the scanner, but the
        // capture shape must hold
        let caps = END_UNIT_RE.captures("end subroutine foo").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "subroutine");
        assert_eq!(caps.get(4).unwrap().as_str(), "foo");
    }

    #[test]
    fn test_decl_regex() {
        assert!(DECL_RE.is_match("integer :: x"));
        assert!(DECL_RE.is_match("type(point) :: p"));
        assert!(DECL_RE.is_match("implicit none"));
        assert!(DECL_RE.is_match("use other_mod"));
        assert!(!DECL_RE.is_match("x = 1"));
        assert!(!DECL_RE.is_match("call foo()"));
        assert!(!DECL_RE.is_match("if (x) y = 1"));
    }

    #[test]
    fn test_if_then_vs_action() {
        assert!(IF_THEN_RE.is_match("if (x > 0) then"));
        assert!(IF_THEN_RE.is_match("outer: if (x) then"));
        assert!(!IF_THEN_RE.is_match("if (x > 0) call foo(y)"));
        assert!(IF_PREFIX_RE.is_match("if (x > 0) call foo(y)"));
    }

    #[test]
    fn test_statement_label() {
        let caps = STATEMENT_LABEL_RE.captures("100 continue").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "100");
        assert!(!STATEMENT_LABEL_RE.is_match("x100 = 1"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(CALL_RE.is_match("CaLl foo"));
        assert!(CONTAINS_RE.is_match("CONTAINS"));
        assert!(CONTAINS_RE.is_match("contains"));
    }
}
