//! XA and non-XA datasources under the datasources subsystem.

use crate::config::DatasourceConfig;
use crate::error::Result;
use crate::model::{Address, AttributeMap, CliValue};
use crate::secrets::SecretStore;

use super::ModelResource;

/// Builds the driver for a datasource.
///
/// Non-XA datasources carry their JDBC URL as the `connection-url`
/// attribute; XA datasources carry it (and the other vendor properties) as
/// `xa-datasource-properties` child resources, expanded by the reconciler.
///
/// # Errors
///
/// Fails when the password is a secret reference that cannot be resolved.
pub fn datasource(config: &DatasourceConfig, secrets: &SecretStore) -> Result<ModelResource> {
    let address =
        Address::new("subsystem", "datasources").child(config.node_type(), &config.name);

    let mut desired = AttributeMap::new();
    desired.insert("jndi-name", config.jndi_name.as_str());
    desired.insert("driver-name", config.driver.as_str());

    if !config.xa {
        if let Some(url) = &config.connection_url {
            desired.insert("connection-url", url.as_str());
        }
    }
    if let Some(user) = &config.user_name {
        desired.insert("user-name", user.as_str());
    }
    if let Some(password) = &config.password {
        desired.insert("password", secrets.resolve(password)?);
    }

    if let Some(min) = config.pool.min_size {
        desired.insert("min-pool-size", min);
    }
    if let Some(max) = config.pool.max_size {
        desired.insert("max-pool-size", max);
    }
    if let Some(validate) = config.pool.validate_on_match {
        desired.insert("validate-on-match", validate);
    }
    if let Some(background) = config.pool.background_validation {
        desired.insert("background-validation", background);
    }

    if config.xa && !config.xa_properties.is_empty() {
        let properties: Vec<(String, CliValue)> = config
            .xa_properties
            .iter()
            .map(|(prop, value)| {
                let resolved = secrets.resolve(value)?;
                Ok((
                    prop.clone(),
                    CliValue::record([("value", CliValue::from(resolved))]),
                ))
            })
            .collect::<Result<_>>()?;
        desired.insert("xa-datasource-properties", CliValue::tree(properties));
    }

    Ok(ModelResource::new(
        if config.xa { "xa-datasource" } else { "datasource" },
        &config.name,
        address,
        desired,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::resources::Resource as _;
    use crate::secrets::SecretBackend;
    use std::collections::BTreeMap;

    fn store() -> SecretStore {
        SecretStore::new(SecretBackend::Standard, "/nonexistent")
    }

    fn xa_config() -> DatasourceConfig {
        DatasourceConfig {
            name: String::from("OracleDS"),
            jndi_name: String::from("java:/OracleDS"),
            driver: String::from("oracle"),
            xa: true,
            connection_url: None,
            user_name: Some(String::from("app")),
            password: Some(String::from("s3cr3t")),
            pool: PoolConfig {
                min_size: Some(5),
                max_size: Some(20),
                validate_on_match: None,
                background_validation: None,
            },
            xa_properties: BTreeMap::from([(
                String::from("URL"),
                String::from("jdbc:oracle:thin:@db.example.com:1521/ORCL"),
            )]),
        }
    }

    #[test]
    fn test_xa_datasource_address_and_properties() {
        let resource = datasource(&xa_config(), &store()).unwrap();
        assert_eq!(
            resource.address().to_string(),
            "/subsystem=datasources/xa-data-source=OracleDS"
        );
        assert_eq!(resource.kind(), "xa-datasource");

        let properties = resource
            .desired()
            .get("xa-datasource-properties")
            .and_then(CliValue::as_map)
            .unwrap();
        let url = properties.get("URL").and_then(CliValue::as_map).unwrap();
        assert_eq!(
            url.get("value"),
            Some(&CliValue::from("jdbc:oracle:thin:@db.example.com:1521/ORCL"))
        );
    }

    #[test]
    fn test_non_xa_datasource_uses_connection_url() {
        let config = DatasourceConfig {
            name: String::from("AppDS"),
            jndi_name: String::from("java:/AppDS"),
            driver: String::from("h2"),
            xa: false,
            connection_url: Some(String::from("jdbc:h2:mem:test")),
            user_name: None,
            password: None,
            pool: PoolConfig::default(),
            xa_properties: BTreeMap::new(),
        };

        let resource = datasource(&config, &store()).unwrap();
        assert_eq!(
            resource.address().to_string(),
            "/subsystem=datasources/data-source=AppDS"
        );
        assert_eq!(
            resource.desired().get("connection-url"),
            Some(&CliValue::from("jdbc:h2:mem:test"))
        );
        assert!(!resource.desired().contains_key("xa-datasource-properties"));
    }

    #[test]
    fn test_unresolvable_password_fails() {
        let mut config = xa_config();
        config.password = Some(String::from("secret://datasources/missing"));
        assert!(datasource(&config, &store()).is_err());
    }
}
