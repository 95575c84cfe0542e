//! Command-line interface for wildsync.
//!
//! This module provides the CLI structure and output formatting.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
