//! Fortran source parsing.
//!
//! - [`char_scan`]: string/comment-aware character scanner
//! - [`lines`]: logical line store (fragments, statement spans, line buffer)
//! - [`syntax`]: tagged statement syntax nodes and cursor navigation
//! - [`patterns`]: compiled regex patterns for statement classification

pub mod char_scan;
pub mod lines;
pub mod patterns;
pub mod syntax;

pub use char_scan::{CharClass, CharScan};
pub use lines::{Fragment, FragmentKind, LineBuffer, LogicalLine, SourcePos, StmtSpan};
pub use syntax::{parse_statement, Cursor, SyntaxNode, SyntaxTag};
