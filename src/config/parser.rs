//! Configuration parser for loading the desired-state file.
//!
//! Handles loading configuration from YAML files and environment variables,
//! with proper precedence and error handling.

use crate::error::{ConfigError, Result, WildsyncError};
use std::path::Path;
use tracing::{debug, info};

use super::spec::SyncConfig;

/// Configuration parser for loading desired-state configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SyncConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(WildsyncError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            WildsyncError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<SyncConfig> {
        debug!("Parsing YAML configuration");

        let config: SyncConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            WildsyncError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Successfully parsed configuration with {} resources",
            config.resource_count()
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format:
    /// `WILDSYNC_<SECTION>_<KEY>` (e.g., `WILDSYNC_SERVER_JBOSS_HOME`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// override value cannot be parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<SyncConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
        if let Ok(home) = std::env::var("WILDSYNC_SERVER_JBOSS_HOME") {
            debug!("Overriding server.jboss_home from environment");
            config.server.jboss_home = home;
        }

        if let Ok(cli_path) = std::env::var("WILDSYNC_SERVER_CLI_PATH") {
            debug!("Overriding server.cli_path from environment");
            config.server.cli_path = cli_path;
        }

        if let Ok(timeout) = std::env::var("WILDSYNC_SERVER_TIMEOUT_SECS") {
            debug!("Overriding server.timeout_secs from environment");
            config.server.timeout_secs = timeout.parse().map_err(|_| {
                WildsyncError::Config(ConfigError::validation(
                    format!("WILDSYNC_SERVER_TIMEOUT_SECS is not a number: {timeout}"),
                    "server.timeout_secs",
                ))
            })?;
        }

        if let Ok(backend) = std::env::var("WILDSYNC_SECRETS_BACKEND") {
            debug!("Overriding secrets.backend from environment");
            config.secrets.backend = backend;
        }

        if let Ok(path) = std::env::var("WILDSYNC_SECRETS_PATH") {
            debug!("Overriding secrets.path from environment");
            config.secrets.path = Some(path);
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                WildsyncError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["wildsync.yaml", "wildsync.yml"];

/// Finds the configuration file in the given directory or parent directories.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(WildsyncError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
