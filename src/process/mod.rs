//! File-level processing.

pub mod pipeline;

pub use pipeline::{
    backup_path, format_file, format_source, insert_use_file, insert_use_source, FormatOptions,
};
