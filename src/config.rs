//! Configuration management.
//!
//! Settings are loaded from `frefactor.toml` (searched in the current
//! directory and the user's home directory; home is lower priority) and
//! overridden by CLI arguments. Parsing goes through a partial struct with
//! all-`Option` fields so only explicitly set values override defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

const CONFIG_FILE_NAME: &str = "frefactor.toml";

fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

fn default_indent() -> usize {
    2
}

/// Tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Spaces per indent level for the reindent filter (default: 2)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Additional Fortran file extensions recognized beside the defaults
    #[serde(default)]
    pub fortran_extensions: Vec<String>,

    /// Glob patterns excluded from file collection
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Partial configuration for TOML parsing; `Option` fields distinguish
/// "explicitly set" from "not specified" when merging.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    indent: Option<usize>,
    #[serde(default)]
    fortran_extensions: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: 2,
            fortran_extensions: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    const MAX_INDENT: usize = 20;

    /// Validate configuration values; returns a message when out of bounds.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent == 0 {
            return Some("indent must be at least 1".to_string());
        }
        if self.indent > Self::MAX_INDENT {
            return Some(format!(
                "indent {} exceeds maximum of {}",
                self.indent,
                Self::MAX_INDENT
            ));
        }
        None
    }

    /// Load configuration from a specific TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Load configuration from the discovered files: home directory first
    /// (lowest priority), then the current directory.
    #[must_use]
    pub fn discover() -> Self {
        let mut config = Self::default();
        let mut candidates = Vec::new();
        if let Some(home) = dirs_home() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }
        candidates.push(PathBuf::from(CONFIG_FILE_NAME));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }

    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.indent {
            self.indent = v;
        }
        for ext in &partial.fortran_extensions {
            if !self.fortran_extensions.contains(ext) {
                self.fortran_extensions.push(ext.clone());
            }
        }
        for pattern in &partial.exclude {
            if !self.exclude.contains(pattern) {
                self.exclude.push(pattern.clone());
            }
        }
    }
}
