//! Structural analysis of parsed source.

pub mod procedures;

pub use procedures::{scan_procedures, Procedure, UnitKind};
