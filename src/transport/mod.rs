//! Transport to the management CLI.
//!
//! All reads and mutations go through a single [`Transport`] implementation
//! that shells out to the server's management CLI. The shared CLI session
//! is not safe for concurrent use, so every invocation is serialized
//! through one process-wide lock.

pub mod cli;

pub use cli::{CommandOutput, JBossCli, Transport};

#[cfg(test)]
pub use cli::MockTransport;
