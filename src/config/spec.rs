//! Configuration specification types for the desired server state.
//!
//! This module defines the structs that map to the `wildsync.yaml` file.
//! These types are declarative: they fully describe the target state of the
//! managed server, and the reconciler converges the live server onto them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The root configuration structure for a managed server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Server connection configuration.
    pub server: ServerConfig,
    /// Secret backend configuration.
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Desired resources, grouped by kind.
    #[serde(default)]
    pub resources: ResourcesConfig,
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// The server installation directory (`JBOSS_HOME`).
    pub jboss_home: String,
    /// Management CLI script, relative to the installation directory.
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
    /// Per-command timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Secret backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretsConfig {
    /// Backend type (standard, encrypted, or vault).
    #[serde(default = "default_secret_backend")]
    pub backend: String,
    /// Bag directory for the file-based backends.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            backend: default_secret_backend(),
            path: None,
        }
    }
}

/// Desired resources, grouped by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcesConfig {
    /// JDBC driver registrations.
    #[serde(default)]
    pub jdbc_drivers: Vec<JdbcDriverConfig>,
    /// XA and non-XA datasources.
    #[serde(default)]
    pub datasources: Vec<DatasourceConfig>,
    /// Logging handlers.
    #[serde(default)]
    pub logging_handlers: Vec<LoggingHandlerConfig>,
    /// Logger categories.
    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
    /// Outbound LDAP connections.
    #[serde(default)]
    pub ldap_connections: Vec<LdapConnectionConfig>,
    /// LDAP-backed security realms.
    #[serde(default)]
    pub ldap_realms: Vec<LdapRealmConfig>,
    /// JAAS security domains.
    #[serde(default)]
    pub security_domains: Vec<SecurityDomainConfig>,
    /// Server modules (JAR registrations).
    #[serde(default)]
    pub modules: Vec<ServerModuleConfig>,
}

/// A JDBC driver registration under the datasources subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JdbcDriverConfig {
    /// Driver name, unique within the subsystem.
    pub name: String,
    /// The server module providing the driver classes.
    pub module_name: String,
    /// Optional module slot.
    #[serde(default)]
    pub module_slot: Option<String>,
    /// Fully qualified driver class name.
    #[serde(default)]
    pub driver_class: Option<String>,
    /// Fully qualified XA datasource class name.
    #[serde(default)]
    pub xa_datasource_class: Option<String>,
}

/// A datasource definition (XA or non-XA).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasourceConfig {
    /// Datasource name, unique within the subsystem.
    pub name: String,
    /// JNDI binding, e.g. `java:/OracleDS`.
    pub jndi_name: String,
    /// Name of the JDBC driver to use.
    pub driver: String,
    /// Whether this is an XA datasource.
    #[serde(default)]
    pub xa: bool,
    /// JDBC connection URL (non-XA datasources only).
    #[serde(default)]
    pub connection_url: Option<String>,
    /// Database user name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Database password; literal or a `secret://<bag>/<key>` reference.
    #[serde(default)]
    pub password: Option<String>,
    /// Connection pool settings.
    #[serde(default)]
    pub pool: PoolConfig,
    /// XA datasource properties, expanded into child resources
    /// (URL, User, ServerName, PortNumber, DatabaseName, ...).
    #[serde(default)]
    pub xa_properties: BTreeMap<String, String>,
}

/// Connection pool settings for a datasource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Minimum pool size.
    #[serde(default)]
    pub min_size: Option<u32>,
    /// Maximum pool size.
    #[serde(default)]
    pub max_size: Option<u32>,
    /// Validate connections on match.
    #[serde(default)]
    pub validate_on_match: Option<bool>,
    /// Validate connections in the background.
    #[serde(default)]
    pub background_validation: Option<bool>,
}

/// A logging handler under the logging subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingHandlerConfig {
    /// Handler name, unique within the subsystem.
    pub name: String,
    /// Handler type (file-handler, console-handler, ...).
    #[serde(rename = "type")]
    pub handler_type: String,
    /// Log level threshold.
    #[serde(default)]
    pub level: Option<String>,
    /// Format pattern.
    #[serde(default)]
    pub formatter: Option<String>,
    /// Target file for file-based handlers.
    #[serde(default)]
    pub file: Option<HandlerFileConfig>,
    /// Whether to append to an existing file.
    #[serde(default)]
    pub append: Option<bool>,
}

/// Target file of a file-based logging handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerFileConfig {
    /// Named base directory (e.g. `jboss.server.log.dir`).
    #[serde(default)]
    pub relative_to: Option<String>,
    /// File path, relative to the base directory.
    pub path: String,
}

/// A logger category under the logging subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Logger category, e.g. `com.example.app`.
    pub category: String,
    /// Log level threshold.
    pub level: String,
    /// Handlers attached to this category.
    #[serde(default)]
    pub handlers: Vec<String>,
    /// Whether to also log through parent handlers.
    #[serde(default)]
    pub use_parent_handlers: Option<bool>,
}

/// An outbound LDAP connection under the management core service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapConnectionConfig {
    /// Connection name.
    pub name: String,
    /// LDAP server URL, e.g. `ldap://directory.example.com:389`.
    pub url: String,
    /// Distinguished name to bind as.
    pub search_dn: String,
    /// Bind credential; literal or a `secret://<bag>/<key>` reference.
    pub search_credential: String,
}

/// LDAP authentication for a security realm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapRealmConfig {
    /// Security realm name.
    pub realm: String,
    /// Name of the LDAP connection to authenticate through.
    pub connection: String,
    /// Search base for user entries.
    pub base_dn: String,
    /// Optional advanced user filter.
    #[serde(default)]
    pub advanced_filter: Option<String>,
}

/// A JAAS security domain under the security subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityDomainConfig {
    /// Security domain name.
    pub name: String,
    /// Login module code, e.g. `LdapExtended`.
    pub code: String,
    /// Login module control flag.
    #[serde(default = "default_login_module_flag")]
    pub flag: String,
    /// Authentication cache type.
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
}

/// A server module registration (driver JAR installation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerModuleConfig {
    /// Module name, e.g. `com.oracle.jdbc`.
    pub name: String,
    /// Local path of the JAR to register.
    pub resources: String,
    /// Module dependencies.
    #[serde(default = "default_module_dependencies")]
    pub dependencies: Vec<String>,
}

// Default value functions

fn default_cli_path() -> String {
    String::from("bin/jboss-cli.sh")
}

const fn default_timeout_secs() -> u64 {
    600
}

fn default_secret_backend() -> String {
    String::from("standard")
}

fn default_module_dependencies() -> Vec<String> {
    vec![String::from("javax.api"), String::from("javax.transaction.api")]
}

fn default_login_module_flag() -> String {
    String::from("required")
}

fn default_cache_type() -> String {
    String::from("default")
}

impl SyncConfig {
    /// Returns the total number of declared resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        let r = &self.resources;
        r.jdbc_drivers.len()
            + r.datasources.len()
            + r.logging_handlers.len()
            + r.loggers.len()
            + r.ldap_connections.len()
            + r.ldap_realms.len()
            + r.security_domains.len()
            + r.modules.len()
    }
}

impl DatasourceConfig {
    /// The node type of this datasource in the management model.
    #[must_use]
    pub const fn node_type(&self) -> &'static str {
        if self.xa { "xa-data-source" } else { "data-source" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let yaml = r"
server:
  jboss_home: /opt/wildfly
";
        let config: SyncConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.cli_path, "bin/jboss-cli.sh");
        assert_eq!(config.server.timeout_secs, 600);
        assert_eq!(config.secrets.backend, "standard");
        assert_eq!(config.resource_count(), 0);
    }

    #[test]
    fn test_security_domain_defaults() {
        let yaml = r"
name: corp-ldap
code: LdapExtended
";
        let domain: SecurityDomainConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(domain.flag, "required");
        assert_eq!(domain.cache_type, "default");
    }

    #[test]
    fn test_datasource_node_type() {
        let yaml = r"
name: OracleDS
jndi_name: java:/OracleDS
driver: oracle
xa: true
";
        let ds: DatasourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ds.node_type(), "xa-data-source");
        assert!(ds.xa_properties.is_empty());
    }
}
