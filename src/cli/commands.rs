//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wildsync - Declarative WildFly/JBoss configuration manager.
#[derive(Parser, Debug)]
#[command(name = "wildsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "WILDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the desired-state configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Show the commands an apply would issue (dry run).
    Plan {
        /// Show the reason behind every command.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Reconcile the server onto the desired state.
    Apply {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Continue with remaining resources when one fails.
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Show per-resource existence and drift.
    Status,

    /// Remove one named resource from the server.
    Remove {
        /// Name of the resource to remove.
        name: String,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
