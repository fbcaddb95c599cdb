//! Call-site matching against a set of target procedure names.
//!
//! Fortran call sites come in three shapes: bare (`call foo(x)`),
//! conditionally guarded (`if (cond) call foo(x)`) and qualified
//! (`call obj%foo(x)`). The matcher normalizes all three to a single
//! terminal-name comparison. Only the last name segment of a qualified
//! designator is matched; object/type context is deliberately not resolved.

use std::collections::HashSet;

use crate::error::TreeShapeError;
use crate::parser::syntax::{Cursor, SyntaxNode, SyntaxTag};

/// A set of case-folded procedure names. Membership test only.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    names: HashSet<String>,
}

impl TargetSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn insert(&mut self, name: &str) {
        let folded = name.trim().to_lowercase();
        if !folded.is_empty() {
            self.names.insert(folded);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Whether `stmt` is (or wraps) a call to a name in `targets`.
///
/// Statements that are neither call-statements nor if-statements yield
/// `false`. A call- or if-statement whose subtree does not have the
/// expected shape yields a [`TreeShapeError`], which callers propagate to
/// the run level.
pub fn statement_calls_target(
    stmt: &SyntaxNode,
    targets: &TargetSet,
) -> Result<bool, TreeShapeError> {
    let call = match stmt.tag() {
        SyntaxTag::CallStmt => stmt.cursor(),
        SyntaxTag::IfStmt => {
            let Some(action) = if_action_statement(stmt)? else {
                return Ok(false);
            };
            action
        }
        _ => return Ok(false),
    };

    let name = call_target_name(call)?;
    Ok(targets.contains(name))
}

/// Descend from an if-statement to its guarded statement; `None` when the
/// action is not a call.
fn if_action_statement(stmt: &SyntaxNode) -> Result<Option<Cursor<'_>>, TreeShapeError> {
    let keyword = stmt.cursor().first_child().ok_or(TreeShapeError::MissingNode {
        context: "if-statement",
        missing: "if keyword",
    })?;
    expect_tag(&keyword, SyntaxTag::Keyword, "if keyword")?;

    // Skip the condition, landing on the action-statement wrapper
    let action = keyword.advance(2).ok_or(TreeShapeError::MissingNode {
        context: "if-statement",
        missing: "action-statement",
    })?;
    expect_tag(&action, SyntaxTag::ActionStmt, "action-statement")?;

    let inner = action.first_child().ok_or(TreeShapeError::MissingNode {
        context: "action-statement",
        missing: "statement",
    })?;
    if inner.tag() == SyntaxTag::CallStmt {
        Ok(Some(inner))
    } else {
        Ok(None)
    }
}

/// Terminal name of a call-statement's procedure designator.
fn call_target_name(call: Cursor<'_>) -> Result<&str, TreeShapeError> {
    let keyword = call.first_child().ok_or(TreeShapeError::MissingNode {
        context: "call-statement",
        missing: "call keyword",
    })?;
    expect_tag(&keyword, SyntaxTag::Keyword, "call keyword")?;

    let designator = keyword.next_sibling().ok_or(TreeShapeError::MissingNode {
        context: "call-statement",
        missing: "procedure-designator",
    })?;

    let name = match designator.tag() {
        SyntaxTag::Name => designator,
        SyntaxTag::PartRef => {
            // The final name component is the one that matters
            let first = designator
                .first_child()
                .ok_or(TreeShapeError::MissingNode {
                    context: "part-reference",
                    missing: "name",
                })?;
            let last = first.last_sibling();
            expect_tag(&last, SyntaxTag::Name, "part-reference name")?;
            last
        }
        other => {
            return Err(TreeShapeError::UnexpectedTag {
                expected: "procedure-designator",
                found: other.describe().to_string(),
            })
        }
    };
    Ok(name.text())
}

fn expect_tag(
    cursor: &Cursor<'_>,
    expected: SyntaxTag,
    what: &'static str,
) -> Result<(), TreeShapeError> {
    if cursor.tag() == expected {
        Ok(())
    } else {
        Err(TreeShapeError::UnexpectedTag {
            expected: what,
            found: cursor.tag().describe().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::syntax::parse_statement;

    fn matches(code: &str, target: &str) -> bool {
        let targets = TargetSet::from_names([target]);
        statement_calls_target(&parse_statement(code), &targets).unwrap()
    }

    #[test]
    fn test_bare_call_match() {
        assert!(matches("CALL FOO(X)", "foo"));
    }

    #[test]
    fn test_bare_call_other_name() {
        assert!(!matches("CALL BAR(X)", "foo"));
    }

    #[test]
    fn test_guarded_call_match() {
        assert!(matches("IF (X>0) CALL FOO(Y)", "foo"));
        assert!(!matches("IF (X>0) CALL BAR(Y)", "foo"));
    }

    #[test]
    fn test_qualified_call_matches_last_segment() {
        assert!(matches("CALL OBJ%FOO(X)", "foo"));
        assert!(!matches("CALL FOO%BAR(X)", "foo"));
    }

    #[test]
    fn test_assignment_is_false() {
        assert!(!matches("X = FOO(1)", "foo"));
    }

    #[test]
    fn test_if_with_non_call_action_is_false() {
        assert!(!matches("IF (X>0) Y = FOO(1)", "foo"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("call foo", "foo"));
        assert!(matches("CALL Foo", "foo"));
        assert!(matches("CALL FOO", "foo"));
    }

    #[test]
    fn test_call_without_args() {
        assert!(matches("call foo", "foo"));
    }

    #[test]
    fn test_target_set_folding() {
        let targets = TargetSet::from_names(["  Legacy ", ""]);
        assert_eq!(targets.len(), 1);
        assert!(targets.contains("LEGACY"));
        assert!(!targets.contains("other"));
    }
}
