//! Command line arguments.

use crate::config::CliOverrides;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Command to execute
#[derive(Debug, Clone, PartialEq, Eq, Default, Subcommand)]
pub enum Command {
    /// Run every check against the cluster (default)
    #[default]
    Check,
    /// List the built-in checks by phase
    List,
    /// Print version information
    Version,
}

/// Parsed command line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "index-doc",
    version,
    about = "Check Elasticsearch indices for problems before an upgrade"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Cluster URL
    #[arg(long, global = true, value_name = "URL")]
    pub host: Option<String>,

    /// Read the snapshot from a JSON file instead of the cluster
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Hide passing checks and indices without problems
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Request timeout in milliseconds
    #[arg(long = "timeout", global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl Args {
    /// Command to run; `check` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Values that override the config file and environment
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            timeout_ms: self.timeout_ms,
            snapshot_file: self.snapshot.clone(),
            format: self.format,
            no_color: self.no_color,
        }
    }
}
