//! sheet-intake CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use intake_cli::commands::{build_service, load_rules, run_annotate, run_validate};
use intake_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_annotation, print_rules, print_validation};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Runs one subcommand; `Ok(1)` means the input had violations.
fn run(command: &Command) -> Result<i32> {
    match command {
        Command::Validate(args) => {
            let outcome = run_validate(&args.file, args.rules.as_deref())?;
            if args.json {
                let json = serde_json::to_string_pretty(&outcome.report)
                    .context("serialize report")?;
                println!("{json}");
            } else {
                print_validation(&outcome);
            }
            Ok(i32::from(outcome.report.has_violations()))
        }
        Command::Annotate(args) => {
            let outcome =
                run_annotate(&args.file, args.rules.as_deref(), args.output.as_deref())?;
            print_annotation(&outcome);
            Ok(0)
        }
        Command::Rules(args) => {
            let rules = load_rules(args.rules.as_deref())?;
            build_service(&rules)?;
            print_rules(&rules);
            Ok(0)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        log_data: cli.log_data,
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
