//! Configuration module for the wildsync reconciliation system.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `wildsync.yaml`
//! - Environment variable overrides and `.env` loading
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{ConfigParser, find_config_file};
pub use spec::{
    DatasourceConfig, HandlerFileConfig, JdbcDriverConfig, LdapConnectionConfig, LdapRealmConfig,
    LoggerConfig, LoggingHandlerConfig, PoolConfig, ResourcesConfig, SecretsConfig,
    SecurityDomainConfig, ServerConfig, ServerModuleConfig, SyncConfig,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
