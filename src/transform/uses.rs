//! Use-statement location: finding the module name token.
//!
//! A use-statement may carry `, intrinsic ::` / `, non_intrinsic ::`
//! decorations or a bare `::` before the module name. The locator skips
//! them and returns the cursor position of the name token. A statement
//! that is not actually a use-statement, or that lacks a name token, is a
//! malformed tree: the resulting [`TreeShapeError`] is an input-contract
//! violation propagated to the run level, not recovered from.

use crate::error::TreeShapeError;
use crate::parser::syntax::{Cursor, SyntaxNode, SyntaxTag};

/// Cursor position of the module name inside a use-statement.
pub fn module_name_position(stmt: &SyntaxNode) -> Result<Cursor<'_>, TreeShapeError> {
    if stmt.tag() != SyntaxTag::UseStmt {
        return Err(TreeShapeError::UnexpectedTag {
            expected: "use-statement",
            found: stmt.tag().describe().to_string(),
        });
    }

    let keyword = stmt.cursor().first_child().ok_or(TreeShapeError::MissingNode {
        context: "use-statement",
        missing: "use keyword",
    })?;

    let mut cur = keyword.next_sibling().ok_or(TreeShapeError::MissingNode {
        context: "use-statement",
        missing: "module name",
    })?;

    // `, intrinsic` / `, non_intrinsic`: skip the comma and the keyword
    if cur.tag() == SyntaxTag::Punct && cur.text() == "," {
        cur = cur.advance(2).ok_or(TreeShapeError::MissingNode {
            context: "use-statement",
            missing: "module name",
        })?;
    }

    // Optional `::` separator
    if cur.tag() == SyntaxTag::Punct && cur.text() == "::" {
        cur = cur.next_sibling().ok_or(TreeShapeError::MissingNode {
            context: "use-statement",
            missing: "module name",
        })?;
    }

    if cur.tag() == SyntaxTag::Name {
        Ok(cur)
    } else {
        Err(TreeShapeError::UnexpectedTag {
            expected: "module name",
            found: cur.tag().describe().to_string(),
        })
    }
}

/// Case-folded module name of a use-statement.
pub fn module_name(stmt: &SyntaxNode) -> Result<String, TreeShapeError> {
    Ok(module_name_position(stmt)?.text().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::syntax::parse_statement;

    #[test]
    fn test_simple_use() {
        let stmt = parse_statement("use my_mod");
        assert_eq!(module_name_position(&stmt).unwrap().text(), "my_mod");
    }

    #[test]
    fn test_use_with_only_list() {
        let stmt = parse_statement("use my_mod, only: a, b");
        assert_eq!(module_name(&stmt).unwrap(), "my_mod");
    }

    #[test]
    fn test_use_intrinsic() {
        let stmt = parse_statement("use, intrinsic :: iso_fortran_env");
        assert_eq!(module_name(&stmt).unwrap(), "iso_fortran_env");
    }

    #[test]
    fn test_use_double_colon() {
        let stmt = parse_statement("use :: m");
        assert_eq!(module_name(&stmt).unwrap(), "m");
    }

    #[test]
    fn test_case_folded() {
        let stmt = parse_statement("USE My_Mod");
        assert_eq!(module_name(&stmt).unwrap(), "my_mod");
    }

    #[test]
    fn test_not_a_use_statement() {
        let stmt = parse_statement("x = 1");
        let err = module_name_position(&stmt).unwrap_err();
        assert!(matches!(err, TreeShapeError::UnexpectedTag { .. }));
    }

    #[test]
    fn test_use_without_name() {
        let stmt = parse_statement("use ::");
        assert!(module_name_position(&stmt).is_err());
    }
}
