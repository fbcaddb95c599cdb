//! Command-line interface.
//!
//! Defines CLI arguments using the clap builder API. Two subcommands:
//! `format` runs the selected per-file filters, `insert-use` runs the
//! call-site analysis and module-use insertion.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// Options shared by both subcommands.
#[derive(Debug, Clone, Default)]
pub struct CommonArgs {
    /// Suppress per-file reporting
    pub quiet: bool,
    /// Report skips and per-procedure decisions
    pub verbose: bool,
    /// Report per-file wall time
    pub timing: bool,
}

/// Arguments of the `format` subcommand.
#[derive(Debug, Clone)]
pub struct FormatArgs {
    /// Files or directories to process
    pub inputs: Vec<PathBuf>,
    pub fixed_to_free: bool,
    pub reindent: bool,
    pub remove_empty_statements: bool,
    pub split_statements: bool,
    pub elaborate_end: bool,
    /// Spaces per indent level for --reindent
    pub indent: Option<usize>,
    /// Write to stdout instead of in-place
    pub stdout: bool,
    /// Rewrite the file even when nothing changed
    pub force: bool,
    pub recursive: bool,
    pub exclude: Vec<String>,
    /// Config file path (overrides discovery)
    pub config: Option<PathBuf>,
    pub common: CommonArgs,
}

/// Arguments of the `insert-use` subcommand.
#[derive(Debug, Clone)]
pub struct InsertUseArgs {
    /// Target procedure name, or a file holding one name per line
    pub call: String,
    /// Module to import at matching call sites
    pub module: String,
    /// Fortran files to rewrite
    pub files: Vec<PathBuf>,
    /// Additional target names
    pub only: Vec<String>,
    /// File holding additional target names, one per line
    pub calls_from: Option<PathBuf>,
    pub common: CommonArgs,
}

/// Parsed top-level command.
#[derive(Debug, Clone)]
pub enum CliCommand {
    Format(FormatArgs),
    InsertUse(InsertUseArgs),
}

/// Build the clap Command for parsing CLI arguments.
#[must_use]
pub fn build_cli() -> Command {
    Command::new("frefactor")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Fred Jones")
        .about("Source-to-source refactoring for modern Fortran code")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress per-file reporting")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Report skips and per-procedure decisions")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("timing")
                .long("timing")
                .help("Report per-file wall time")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("format")
                .about("Apply line-level filters to Fortran files")
                .arg(
                    Arg::new("inputs")
                        .help("Files or directories to process")
                        .value_name("FILE")
                        .num_args(1..)
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("fixed-to-free")
                        .long("fixed-to-free")
                        .help("Convert fixed-form comment and continuation markup to free form")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("reindent")
                        .long("reindent")
                        .help("Recompute indentation from construct nesting depth")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("remove-empty-statements")
                        .long("remove-empty-statements")
                        .help("Drop semicolons that do not separate two statements")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("split-statements")
                        .long("split-statements")
                        .help("Split compound statements onto their own lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("elaborate-end")
                        .long("elaborate-end")
                        .help("Rewrite bare END statements to the elaborated form")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("indent")
                        .short('i')
                        .long("indent")
                        .help("Spaces per indent level for --reindent [default: 2]")
                        .value_name("NUM")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("stdout")
                        .short('s')
                        .long("stdout")
                        .help("Write to stdout instead of modifying files in-place")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Rewrite files even when no filter changed them")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("recursive")
                        .short('r')
                        .long("recursive")
                        .help("Recursively process directories")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("exclude")
                        .short('e')
                        .long("exclude")
                        .help("Exclude files/directories matching pattern (glob, repeatable)")
                        .value_name("PATTERN")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to configuration file (overrides discovery)")
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("insert-use")
                .about("Insert a module use-statement into procedures calling a target")
                .arg(
                    Arg::new("call")
                        .help("Target procedure name, or a file with one name per line")
                        .value_name("CALL")
                        .required(true),
                )
                .arg(
                    Arg::new("module")
                        .help("Module to import at matching call sites")
                        .value_name("MODULE")
                        .required(true),
                )
                .arg(
                    Arg::new("files")
                        .help("Fortran files to rewrite")
                        .value_name("FILE")
                        .num_args(1..)
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("only")
                        .long("only")
                        .help("Additional target procedure name (repeatable)")
                        .value_name("NAME")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("calls-from")
                        .long("calls-from")
                        .help("File holding additional target names, one per line")
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Parse CLI arguments from the command line.
#[must_use]
pub fn parse_args() -> CliCommand {
    command_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing).
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliCommand
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    command_from_matches(&build_cli().get_matches_from(args))
}

fn common_from_matches(matches: &clap::ArgMatches) -> CommonArgs {
    CommonArgs {
        quiet: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
        timing: matches.get_flag("timing"),
    }
}

fn command_from_matches(matches: &clap::ArgMatches) -> CliCommand {
    match matches.subcommand() {
        Some(("format", sub)) => CliCommand::Format(FormatArgs {
            inputs: sub
                .get_many::<PathBuf>("inputs")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
            fixed_to_free: sub.get_flag("fixed-to-free"),
            reindent: sub.get_flag("reindent"),
            remove_empty_statements: sub.get_flag("remove-empty-statements"),
            split_statements: sub.get_flag("split-statements"),
            elaborate_end: sub.get_flag("elaborate-end"),
            indent: sub.get_one::<usize>("indent").copied(),
            stdout: sub.get_flag("stdout"),
            force: sub.get_flag("force"),
            recursive: sub.get_flag("recursive"),
            exclude: sub
                .get_many::<String>("exclude")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
            config: sub.get_one::<PathBuf>("config").cloned(),
            common: common_from_matches(sub),
        }),
        Some(("insert-use", sub)) => CliCommand::InsertUse(InsertUseArgs {
            call: sub
                .get_one::<String>("call")
                .cloned()
                .unwrap_or_default(),
            module: sub
                .get_one::<String>("module")
                .cloned()
                .unwrap_or_default(),
            files: sub
                .get_many::<PathBuf>("files")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
            only: sub
                .get_many::<String>("only")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default(),
            calls_from: sub.get_one::<PathBuf>("calls-from").cloned(),
            common: common_from_matches(sub),
        }),
        // subcommand_required(true) rules this out
        _ => unreachable!("clap enforces a known subcommand"),
    }
}
