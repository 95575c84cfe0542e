//! Subprocess transport for the JBoss management CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::{Result, TransportError, WildsyncError};

/// Default timeout for one CLI invocation, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Raw output of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code.
    pub exit_code: i32,
}

/// Executes management commands against a live server.
///
/// Implementations must serialize invocations: the underlying CLI session
/// is stateful and commands must apply in program order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a single management command.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::CommandFailed`] when the process exits
    /// non-zero, [`TransportError::Timeout`] when it exceeds the configured
    /// timeout, and [`TransportError::LaunchFailed`] when it cannot start.
    async fn execute(&self, command: &str) -> Result<CommandOutput>;
}

/// Transport that shells out to `$JBOSS_HOME/bin/jboss-cli.sh`.
#[derive(Debug)]
pub struct JBossCli {
    /// The server installation directory.
    jboss_home: PathBuf,
    /// CLI script path, relative to the installation directory.
    cli_path: PathBuf,
    /// Per-invocation timeout.
    timeout: Duration,
    /// Serializes all invocations; the CLI session is shared state.
    lock: Mutex<()>,
}

impl JBossCli {
    /// Creates a transport for the given server installation.
    #[must_use]
    pub fn new(jboss_home: impl Into<PathBuf>) -> Self {
        Self {
            jboss_home: jboss_home.into(),
            cli_path: PathBuf::from("bin/jboss-cli.sh"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            lock: Mutex::new(()),
        }
    }

    /// Overrides the CLI script path (relative to the installation).
    #[must_use]
    pub fn with_cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cli_path = path.into();
        self
    }

    /// Overrides the per-invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute path of the CLI script.
    #[must_use]
    pub fn program(&self) -> PathBuf {
        self.jboss_home.join(&self.cli_path)
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        let program = self.program();
        trace!("Running management CLI: {}", command);

        let child = tokio::process::Command::new(&program)
            .arg("--connect")
            .arg(format!("--command={command}"))
            .current_dir(&self.jboss_home)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| launch_failed(&program, &e))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                WildsyncError::Transport(TransportError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            })?
            .map_err(|e| launch_failed(&program, &e))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        if result.exit_code != 0 {
            debug!(
                "Management CLI exited {} for command: {}",
                result.exit_code, command
            );
            return Err(WildsyncError::Transport(TransportError::CommandFailed {
                exit_code: result.exit_code,
                stderr: if result.stderr.trim().is_empty() {
                    result.stdout.clone()
                } else {
                    result.stderr.clone()
                },
            }));
        }

        Ok(result)
    }
}

fn launch_failed(program: &Path, err: &std::io::Error) -> WildsyncError {
    WildsyncError::Transport(TransportError::LaunchFailed {
        program: program.display().to_string(),
        message: err.to_string(),
    })
}

#[async_trait]
impl Transport for JBossCli {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        // Held for the whole invocation; released on every exit path.
        let _guard = self.lock.lock().await;
        self.run(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_path_joined_under_home() {
        let transport = JBossCli::new("/opt/wildfly");
        assert_eq!(
            transport.program(),
            PathBuf::from("/opt/wildfly/bin/jboss-cli.sh")
        );
    }

    #[test]
    fn test_cli_path_override() {
        let transport = JBossCli::new("/opt/wildfly").with_cli_path("bin/jboss-cli.ps1");
        assert_eq!(
            transport.program(),
            PathBuf::from("/opt/wildfly/bin/jboss-cli.ps1")
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_failure() {
        let transport = JBossCli::new("/nonexistent-wildfly-home")
            .with_timeout(Duration::from_secs(5));
        let err = transport.execute(":read-resource()").await.unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Transport(TransportError::LaunchFailed { .. })
        ));
    }
}
