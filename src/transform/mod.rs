//! Source transformations.
//!
//! - [`split`]: compound-statement splitting
//! - [`calls`]: call-site matching against target procedure names
//! - [`uses`]: use-statement module-name location
//! - [`insert`]: conditional module-use insertion
//! - [`fixed_form`]: fixed-form to free-form conversion
//! - [`empty_stmts`]: empty-statement removal
//! - [`end_stmts`]: end-statement elaboration
//! - [`reindent`]: nesting-depth reindentation

pub mod calls;
pub mod empty_stmts;
pub mod end_stmts;
pub mod fixed_form;
pub mod insert;
pub mod reindent;
pub mod split;
pub mod uses;

pub use calls::{statement_calls_target, TargetSet};
pub use empty_stmts::remove_empty_statements;
pub use end_stmts::elaborate_end_statements;
pub use fixed_form::convert_fixed_to_free;
pub use insert::{insert_use_statements, InsertReport, ModuleUse};
pub use reindent::reindent;
pub use split::split_compound_statements;
pub use uses::{module_name, module_name_position};
