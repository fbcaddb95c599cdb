//! frefactor - Source-to-source refactoring for modern Fortran code
//!
//! Splits compound statements into independent logical lines and inserts
//! module use-statements into procedures based on call-site analysis.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod process;
pub mod transform;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliCommand, FormatArgs, InsertUseArgs};
pub use config::Config;
pub use error::{BackupError, Result, TreeShapeError};
