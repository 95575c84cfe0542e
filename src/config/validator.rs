//! Configuration validation for desired server state.
//!
//! This module provides comprehensive validation of the desired-state
//! configuration, ensuring all values are valid and consistent before any
//! command reaches the server.

use crate::error::{ConfigError, Result, WildsyncError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::spec::{DatasourceConfig, ResourcesConfig, SyncConfig};

/// Valid JNDI names: `java:/...` or `java:jboss/...`.
static JNDI_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^java(:|:jboss)?/[\w./-]+$").expect("valid pattern"));

/// Valid JDBC connection URLs, by vendor scheme.
static JDBC_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^jdbc:(oracle|db2|sqlserver|h2|postgresql|mysql):.+").expect("valid pattern")
});

/// Handler types the logging subsystem accepts.
const HANDLER_TYPES: &[&str] = &[
    "async-handler",
    "console-handler",
    "custom-handler",
    "file-handler",
    "size-rotating-file-handler",
    "periodic-rotating-file-handler",
];

/// Control flags JAAS accepts for a login module.
const LOGIN_MODULE_FLAGS: &[&str] = &["required", "requisite", "sufficient", "optional"];

/// Log levels the logging subsystem accepts.
const LOG_LEVELS: &[&str] = &[
    "ALL", "FINEST", "FINER", "TRACE", "DEBUG", "FINE", "CONFIG", "INFO", "WARN", "WARNING",
    "ERROR", "SEVERE", "FATAL", "OFF",
];

/// Validation result containing all findings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

/// Validator for desired-state configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a desired-state configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error when any check fails; the full
    /// list of findings is in the returned [`ValidationResult`] otherwise.
    pub fn validate(&self, config: &SyncConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_duplicates(&config.resources, &mut result);
        Self::validate_datasources(&config.resources, &mut result);
        Self::validate_logging(&config.resources, &mut result);
        Self::validate_ldap(&config.resources, &mut result);
        Self::validate_security_domains(&config.resources, &mut result);

        if result.errors.is_empty() {
            debug!(
                "Configuration validation passed with {} warnings",
                result.warnings.len()
            );
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(WildsyncError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    fn validate_server(config: &SyncConfig, result: &mut ValidationResult) {
        if config.server.jboss_home.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("server.jboss_home"),
                message: String::from("Server installation directory cannot be empty"),
            });
        }

        if config.server.timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("server.timeout_secs"),
                message: String::from("Timeout must be greater than zero"),
            });
        }
    }

    fn validate_duplicates(resources: &ResourcesConfig, result: &mut ValidationResult) {
        let groups: [(&str, Vec<&str>); 8] = [
            (
                "jdbc_driver",
                resources.jdbc_drivers.iter().map(|d| d.name.as_str()).collect(),
            ),
            (
                "datasource",
                resources.datasources.iter().map(|d| d.name.as_str()).collect(),
            ),
            (
                "logging_handler",
                resources
                    .logging_handlers
                    .iter()
                    .map(|h| h.name.as_str())
                    .collect(),
            ),
            (
                "logger",
                resources.loggers.iter().map(|l| l.category.as_str()).collect(),
            ),
            (
                "ldap_connection",
                resources
                    .ldap_connections
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect(),
            ),
            (
                "ldap_realm",
                resources.ldap_realms.iter().map(|r| r.realm.as_str()).collect(),
            ),
            (
                "security_domain",
                resources
                    .security_domains
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect(),
            ),
            (
                "module",
                resources.modules.iter().map(|m| m.name.as_str()).collect(),
            ),
        ];

        for (kind, names) in groups {
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name) {
                    result.errors.push(ValidationError {
                        field: format!("resources.{kind}s"),
                        message: format!("Duplicate {kind} name: {name}"),
                    });
                }
            }
        }
    }

    fn validate_datasources(resources: &ResourcesConfig, result: &mut ValidationResult) {
        let driver_names: HashSet<&str> = resources
            .jdbc_drivers
            .iter()
            .map(|d| d.name.as_str())
            .collect();

        for ds in &resources.datasources {
            let field = |suffix: &str| format!("resources.datasources.{}.{suffix}", ds.name);

            if !JNDI_NAME.is_match(&ds.jndi_name) {
                result.errors.push(ValidationError {
                    field: field("jndi_name"),
                    message: format!(
                        "JNDI name '{}' is invalid. Must match java:/... or java:jboss/...",
                        ds.jndi_name
                    ),
                });
            }

            Self::validate_connection_url(ds, &field("connection_url"), result);

            if let (Some(min), Some(max)) = (ds.pool.min_size, ds.pool.max_size) {
                if min > max {
                    result.errors.push(ValidationError {
                        field: field("pool"),
                        message: format!("Pool min_size {min} exceeds max_size {max}"),
                    });
                }
            }

            if !driver_names.contains(ds.driver.as_str()) {
                result.warnings.push(format!(
                    "Datasource '{}' references driver '{}' which is not declared; it must already exist on the server",
                    ds.name, ds.driver
                ));
            }
        }
    }

    fn validate_connection_url(
        ds: &DatasourceConfig,
        field: &str,
        result: &mut ValidationResult,
    ) {
        match (&ds.connection_url, ds.xa) {
            (Some(url), _) if !JDBC_URL.is_match(url) => {
                result.errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "Connection URL '{url}' does not match a supported JDBC scheme (oracle, db2, sqlserver, h2, postgresql, mysql)"
                    ),
                });
            }
            (Some(_), true) => {
                result.warnings.push(format!(
                    "Datasource '{}' is XA; connection_url is ignored, set xa_properties.URL instead",
                    ds.name
                ));
            }
            (None, false) => {
                result.errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "Datasource '{}' is non-XA and requires a connection_url",
                        ds.name
                    ),
                });
            }
            _ => {}
        }
    }

    fn validate_logging(resources: &ResourcesConfig, result: &mut ValidationResult) {
        let handler_names: HashSet<&str> = resources
            .logging_handlers
            .iter()
            .map(|h| h.name.as_str())
            .collect();

        for handler in &resources.logging_handlers {
            if !HANDLER_TYPES.contains(&handler.handler_type.as_str()) {
                result.errors.push(ValidationError {
                    field: format!("resources.logging_handlers.{}.type", handler.name),
                    message: format!(
                        "Unknown handler type '{}'. Expected one of: {}",
                        handler.handler_type,
                        HANDLER_TYPES.join(", ")
                    ),
                });
            }

            if let Some(level) = &handler.level {
                if !LOG_LEVELS.contains(&level.as_str()) {
                    result.errors.push(ValidationError {
                        field: format!("resources.logging_handlers.{}.level", handler.name),
                        message: format!("Unknown log level '{level}'"),
                    });
                }
            }
        }

        for logger in &resources.loggers {
            if !LOG_LEVELS.contains(&logger.level.as_str()) {
                result.errors.push(ValidationError {
                    field: format!("resources.loggers.{}.level", logger.category),
                    message: format!("Unknown log level '{}'", logger.level),
                });
            }

            for handler in &logger.handlers {
                if !handler_names.contains(handler.as_str()) {
                    result.warnings.push(format!(
                        "Logger '{}' references handler '{}' which is not declared; it must already exist on the server",
                        logger.category, handler
                    ));
                }
            }
        }
    }

    fn validate_security_domains(resources: &ResourcesConfig, result: &mut ValidationResult) {
        for domain in &resources.security_domains {
            if !LOGIN_MODULE_FLAGS.contains(&domain.flag.as_str()) {
                result.errors.push(ValidationError {
                    field: format!("resources.security_domains.{}.flag", domain.name),
                    message: format!(
                        "Unknown login module flag '{}'. Expected one of: {}",
                        domain.flag,
                        LOGIN_MODULE_FLAGS.join(", ")
                    ),
                });
            }

            if domain.code.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("resources.security_domains.{}.code", domain.name),
                    message: String::from("Login module code cannot be empty"),
                });
            }
        }
    }

    fn validate_ldap(resources: &ResourcesConfig, result: &mut ValidationResult) {
        let connection_names: HashSet<&str> = resources
            .ldap_connections
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        for connection in &resources.ldap_connections {
            if !connection.url.starts_with("ldap://") && !connection.url.starts_with("ldaps://") {
                result.errors.push(ValidationError {
                    field: format!("resources.ldap_connections.{}.url", connection.name),
                    message: format!(
                        "LDAP URL '{}' must start with ldap:// or ldaps://",
                        connection.url
                    ),
                });
            }
        }

        for realm in &resources.ldap_realms {
            if !connection_names.contains(realm.connection.as_str()) {
                result.warnings.push(format!(
                    "Realm '{}' references LDAP connection '{}' which is not declared; it must already exist on the server",
                    realm.realm, realm.connection
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::parser::ConfigParser;

    fn parse(yaml: &str) -> SyncConfig {
        ConfigParser::new().parse_yaml(yaml, None).unwrap()
    }

    fn base_config() -> String {
        String::from("server:\n  jboss_home: /opt/wildfly\n")
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = parse(&base_config());
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_jndi_name_rejected() {
        let yaml = base_config()
            + r"
resources:
  datasources:
    - name: AppDS
      jndi_name: jdbc/AppDS
      driver: h2
      connection_url: jdbc:h2:mem:test
";
        let config = parse(&yaml);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("JNDI name"));
    }

    #[test]
    fn test_unknown_jdbc_scheme_rejected() {
        let yaml = base_config()
            + r"
resources:
  datasources:
    - name: AppDS
      jndi_name: java:/AppDS
      driver: weird
      connection_url: jdbc:weirddb://host/db
";
        let config = parse(&yaml);
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_non_xa_requires_connection_url() {
        let yaml = base_config()
            + r"
resources:
  datasources:
    - name: AppDS
      jndi_name: java:/AppDS
      driver: h2
";
        let config = parse(&yaml);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("connection_url"));
    }

    #[test]
    fn test_xa_datasource_needs_no_url() {
        let yaml = base_config()
            + r"
resources:
  jdbc_drivers:
    - name: oracle
      module_name: com.oracle.jdbc
  datasources:
    - name: OracleDS
      jndi_name: java:/OracleDS
      driver: oracle
      xa: true
";
        let config = parse(&yaml);
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_xa_with_connection_url_is_warning() {
        let yaml = base_config()
            + r"
resources:
  jdbc_drivers:
    - name: oracle
      module_name: com.oracle.jdbc
  datasources:
    - name: OracleDS
      jndi_name: java:/OracleDS
      driver: oracle
      xa: true
      connection_url: jdbc:oracle:thin:@db.example.com:1521/ORCL
";
        let config = parse(&yaml);
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("xa_properties.URL"));
    }

    #[test]
    fn test_unknown_login_module_flag_rejected() {
        let yaml = base_config()
            + r"
resources:
  security_domains:
    - name: corp-ldap
      code: LdapExtended
      flag: mandatory
";
        let config = parse(&yaml);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("login module flag"));
    }

    #[test]
    fn test_valid_security_domain_passes() {
        let yaml = base_config()
            + r"
resources:
  security_domains:
    - name: corp-ldap
      code: LdapExtended
";
        let config = parse(&yaml);
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = base_config()
            + r"
resources:
  loggers:
    - category: com.example
      level: INFO
    - category: com.example
      level: DEBUG
";
        let config = parse(&yaml);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_pool_bounds_checked() {
        let yaml = base_config()
            + r"
resources:
  datasources:
    - name: AppDS
      jndi_name: java:/AppDS
      driver: h2
      connection_url: jdbc:h2:mem:test
      pool:
        min_size: 20
        max_size: 5
";
        let config = parse(&yaml);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("min_size"));
    }

    #[test]
    fn test_unknown_handler_type_rejected() {
        let yaml = base_config()
            + r"
resources:
  logging_handlers:
    - name: APP
      type: syslog-handler
      level: INFO
";
        let config = parse(&yaml);
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_undeclared_driver_is_warning() {
        let yaml = base_config()
            + r"
resources:
  datasources:
    - name: AppDS
      jndi_name: java:/AppDS
      driver: h2
      connection_url: jdbc:h2:mem:test
";
        let config = parse(&yaml);
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_ldap_url_scheme_checked() {
        let yaml = base_config()
            + r"
resources:
  ldap_connections:
    - name: corp
      url: http://directory.example.com
      search_dn: cn=admin,dc=example,dc=com
      search_credential: secret://ldap/bind
";
        let config = parse(&yaml);
        assert!(ConfigValidator::new().validate(&config).is_err());
    }
}
