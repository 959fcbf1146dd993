// src/cli.rs

//! CLI argument parsing for the demo binary.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `command-runner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "command-runner",
    version,
    about = "Demonstrate a single-flight command runner: bursts of triggers, one execution.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `CommandRunner.toml` in the current working directory. The
    /// built-in defaults are used if that file does not exist.
    #[arg(long, value_name = "PATH", default_value = "CommandRunner.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COMMAND_RUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Make the simulated action fail with this message (overrides
    /// `[demo].fail_with`).
    #[arg(long, value_name = "MESSAGE")]
    pub fail: Option<String>,

    /// Parse + validate, print the effective config, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
