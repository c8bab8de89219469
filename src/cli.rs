// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `workchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "workchain",
    version,
    about = "Run named chains of background work units with live status.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Workchain.toml` in the current working directory. A missing
    /// default file is tolerated when `--image` is given.
    #[arg(long, value_name = "PATH", default_value = "Workchain.toml")]
    pub config: String,

    /// Exit once every submitted chain has finished.
    #[arg(long)]
    pub once: bool,

    /// Submit only the chain with this name from the config.
    #[arg(long, value_name = "NAME")]
    pub chain: Option<String>,

    /// Submit the sample image pipeline for this image URI.
    #[arg(long, value_name = "URI")]
    pub image: Option<String>,

    /// Number of blur passes in the sample image pipeline.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub blur_level: usize,

    /// Pretend the device is charging (overrides `[device].charging`).
    #[arg(long)]
    pub charging: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WORKCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print chains, but don't execute anything.
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
