//! frefactor - Source-to-source refactoring for modern Fortran code

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::time::Instant;

use frefactor::process::{format_file, insert_use_file, FormatOptions};
use frefactor::transform::{ModuleUse, TargetSet};
use frefactor::{parse_args, BackupError, CliCommand, Config, FormatArgs, InsertUseArgs, Result};
use glob::Pattern;
use walkdir::WalkDir;

/// Fortran file extensions to process
const FORTRAN_EXTENSIONS: &[&str] = &[
    "f90", "f95", "f03", "f08", "f18", "f", "for", "ftn", "fpp", "F90", "F95", "F03", "F08", "F18",
    "F", "FOR", "FTN", "FPP",
];

fn main() {
    let command = parse_args();
    let result = match command {
        CliCommand::Format(args) => run_format(&args),
        CliCommand::InsertUse(args) => run_insert_use(&args),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        // A failed backup rename leaves the original untouched but aborts
        // the run with its own exit status
        let code = if err.downcast_ref::<BackupError>().is_some() {
            3
        } else {
            1
        };
        std::process::exit(code);
    }
}

fn run_format(args: &FormatArgs) -> Result<()> {
    let config = build_config(args)?;
    let opts = FormatOptions {
        fixed_to_free: args.fixed_to_free,
        remove_empty_statements: args.remove_empty_statements,
        split_statements: args.split_statements,
        elaborate_end: args.elaborate_end,
        reindent: args.reindent,
        indent: config.indent,
    };

    let files = collect_files(args, &config);
    if files.is_empty() {
        if !args.common.quiet {
            eprintln!("No Fortran files found to process.");
        }
        return Ok(());
    }

    let mut errors = 0usize;
    let mut changed_count = 0usize;
    for path in &files {
        let start = Instant::now();
        match format_file(path, &opts, args.stdout, args.force) {
            Ok(changed) => {
                if changed {
                    changed_count += 1;
                }
                if !args.common.quiet && !args.stdout {
                    let note = if changed { "" } else { " (unchanged)" };
                    eprintln!("Processed: {}{note}", path.display());
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("Error processing {}: {e:#}", path.display());
            }
        }
        if args.common.timing {
            eprintln!("  {} took {:?}", path.display(), start.elapsed());
        }
    }

    if !args.common.quiet && !args.stdout {
        eprintln!("{changed_count} of {} files changed.", files.len());
    }
    if errors > 0 {
        anyhow::bail!("{errors} of {} files failed", files.len());
    }
    Ok(())
}

fn run_insert_use(args: &InsertUseArgs) -> Result<()> {
    let targets = build_target_set(args)?;
    if targets.is_empty() {
        anyhow::bail!("no target procedure names given");
    }
    let module = ModuleUse::new(&args.module);

    for path in &args.files {
        let start = Instant::now();
        if args.common.verbose {
            eprintln!("Processing: {}", path.display());
        }
        // Any malformed statement tree or backup failure aborts the run here
        let report = insert_use_file(path, &targets, &module, args.common.verbose)?;
        if !args.common.quiet {
            if report.inserted > 0 {
                eprintln!(
                    "{}: inserted {} use statement(s)",
                    path.display(),
                    report.inserted
                );
            } else {
                eprintln!("{}: no change", path.display());
            }
        }
        if args.common.timing {
            eprintln!("  {} took {:?}", path.display(), start.elapsed());
        }
    }
    Ok(())
}

/// Assemble the target call-name set from the positional CALL argument
/// (a name, or a file with one name per line), the repeatable `--only`
/// names and the `--calls-from` file.
fn build_target_set(args: &InsertUseArgs) -> Result<TargetSet> {
    let mut targets = TargetSet::default();

    let call_path = Path::new(&args.call);
    if call_path.is_file() {
        add_names_from_file(&mut targets, call_path)?;
    } else {
        targets.insert(&args.call);
    }

    for name in &args.only {
        targets.insert(name);
    }
    if let Some(path) = &args.calls_from {
        add_names_from_file(&mut targets, path)?;
    }
    Ok(targets)
}

fn add_names_from_file(targets: &mut TargetSet, path: &Path) -> Result<()> {
    use anyhow::Context;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read target names from {}", path.display()))?;
    for line in contents.lines() {
        let name = line.trim();
        if !name.is_empty() && !name.starts_with('!') && !name.starts_with('#') {
            targets.insert(name);
        }
    }
    Ok(())
}

/// Build configuration: explicit config file or discovery, then CLI
/// overrides.
fn build_config(args: &FormatArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        Config::from_toml_file(config_path)?
    } else {
        Config::discover()
    };

    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    for pattern in &args.exclude {
        if !config.exclude.contains(pattern) {
            config.exclude.push(pattern.clone());
        }
    }

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }
    Ok(config)
}

/// Collect all files to process, handling directories and the recursive
/// flag.
fn collect_files(args: &FormatArgs, config: &Config) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = config
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            if args.recursive {
                // WalkDir reports symlink loops as errors; those entries are
                // skipped via filter_map
                for entry in WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(256)
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                {
                    let path = entry.path();
                    if path.is_file()
                        && is_fortran_file(path, &config.fortran_extensions)
                        && !is_excluded(path, &exclude_patterns)
                    {
                        files.push(path.to_path_buf());
                    }
                }
            } else if let Ok(entries) = std::fs::read_dir(input) {
                for entry in entries.filter_map(std::result::Result::ok) {
                    let path = entry.path();
                    if path.is_file()
                        && is_fortran_file(&path, &config.fortran_extensions)
                        && !is_excluded(&path, &exclude_patterns)
                    {
                        files.push(path);
                    }
                }
            }
        }
    }
    files
}

/// Check if a path matches any exclusion pattern: full path, file name, or
/// any path component.
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_str = path.to_string_lossy();
    for pattern in patterns {
        if pattern.matches(&path_str) {
            return true;
        }
        if let Some(file_name) = path.file_name() {
            if pattern.matches(&file_name.to_string_lossy()) {
                return true;
            }
        }
        for component in path.components() {
            if let std::path::Component::Normal(c) = component {
                if pattern.matches(&c.to_string_lossy()) {
                    return true;
                }
            }
        }
    }
    false
}

/// Check if a file has a Fortran extension, including custom ones from the
/// configuration.
fn is_fortran_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            if FORTRAN_EXTENSIONS.contains(&ext) {
                return true;
            }
            custom_extensions
                .iter()
                .any(|custom| ext == custom.strip_prefix('.').unwrap_or(custom))
        })
}
