// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cmdloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdloop",
    version,
    about = "Run a tick-driven robot command scheduler from a TOML description.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the robot description (TOML).
    ///
    /// Default: `Robot.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Robot.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the wiring, but don't run the loop.
    #[arg(long)]
    pub dry_run: bool,

    /// Tick back-to-back instead of waiting for each period.
    #[arg(long)]
    pub fast: bool,

    /// Stop after this many loop ticks (overrides `[loop].max_ticks`).
    #[arg(long, value_name = "N")]
    pub max_ticks: Option<u64>,
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
