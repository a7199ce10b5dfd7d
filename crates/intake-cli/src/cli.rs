//! Argument definitions for `sheet-intake`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sheet-intake",
    version,
    about = "Validate spreadsheet and JSON uploads against per-column rules",
    long_about = "Validate .xlsx and .json files against a declarative rule file.\n\n\
                  Rules are read from --rules, the INTAKE_RULES environment variable,\n\
                  or intake.toml in the working directory. Failing cells can be written\n\
                  back as a highlighted workbook with an explanatory note on each."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include cell values in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a file and report every violation.
    Validate(ValidateArgs),

    /// Validate a workbook and write a copy with failing cells highlighted.
    Annotate(AnnotateArgs),

    /// Show the configured column rules.
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// The .xlsx or .json file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rule file (TOML, or JSON by extension).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Print the full report as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct AnnotateArgs {
    /// The .xlsx workbook to highlight.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rule file (TOML, or JSON by extension).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Where to write the highlighted workbook
    /// (default: <FILE stem>_highlighted.xlsx next to the input).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Rule file (TOML, or JSON by extension).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
