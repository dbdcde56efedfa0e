// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;

/// Command-line arguments for `lso`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lso",
    version,
    about = "Dispatch Ansible playbooks and executables as asynchronous jobs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", env = "LSO_CONFIG", default_value = "lso.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LSO_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a playbook from the playbooks root directory.
    Playbook(PlaybookArgs),

    /// Run an executable from the executables root directory.
    Execute(ExecuteArgs),

    /// Consume jobs from the broker at `[queue].worker_url`.
    Worker,

    /// Relay jobs from `[queue].broker_url` to connected workers.
    Broker,

    /// Validate the config file and print the effective settings.
    CheckConfig,
}

#[derive(Debug, Clone, Args)]
pub struct PlaybookArgs {
    /// Playbook file name.
    pub name: String,

    /// Inventory: host list or JSON inventory, or `@FILE` to read it from a file.
    #[arg(long, value_name = "TEXT|@FILE")]
    pub inventory: String,

    /// Extra variables as a JSON object.
    #[arg(long, value_name = "JSON")]
    pub extra_vars: Option<String>,

    /// URL receiving the completion payload.
    #[arg(long, value_name = "URL")]
    pub callback: Option<Url>,

    /// URL receiving progress updates.
    #[arg(long, value_name = "URL")]
    pub progress: Option<Url>,

    /// Send only the newest event with each progress update.
    #[arg(long)]
    pub incremental: bool,

    /// Ask the playbook to only report what it would change.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ExecuteArgs {
    /// Executable file name.
    pub name: String,

    /// Arguments passed to the executable.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// URL receiving the completion payload (required with `--async`).
    #[arg(long, value_name = "URL")]
    pub callback: Option<Url>,

    /// Run as a background job instead of waiting for the result.
    #[arg(long = "async")]
    pub is_async: bool,
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
