// src/cli.rs

//! CLI argument parsing using `clap`.

use std::net::SocketAddr;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::run::params::parse_assignment;

/// Command-line arguments for `runtrack`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runtrack",
    version,
    about = "Launch external pipeline runs and track them through their status files.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Runtrack.toml` in the current working directory. Client
    /// commands fall back to built-in defaults when the file is missing.
    #[arg(long, global = true, value_name = "PATH", default_value = "Runtrack.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNTRACK_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Override `[server].bind`.
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Parse + validate the config and print the effective settings.
    Check,

    /// Submit a run to a running server.
    Submit {
        /// Pipeline parameter, repeatable (e.g. `-p epochs=4 -p device=cpu`).
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, Value)>,

        /// Keep polling until the run completes or fails.
        #[arg(long)]
        wait: bool,

        /// Override `[client].base_url`.
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Print the current status snapshot of a run.
    Status {
        run_id: String,

        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Poll a run until it completes or fails.
    Watch {
        run_id: String,

        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Run one retention sweep over the work directory and exit.
    Sweep,
}

fn parse_param(s: &str) -> Result<(String, Value), String> {
    parse_assignment(s)
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
