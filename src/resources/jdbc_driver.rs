//! JDBC driver registrations under the datasources subsystem.

use crate::config::JdbcDriverConfig;
use crate::model::{Address, AttributeMap};

use super::ModelResource;

/// Builds the driver for a JDBC driver registration.
///
/// The driver lives at `/subsystem=datasources/jdbc-driver=<name>` and its
/// classes come from an already-registered server module.
#[must_use]
pub fn jdbc_driver(config: &JdbcDriverConfig) -> ModelResource {
    let address = Address::new("subsystem", "datasources").child("jdbc-driver", &config.name);

    let mut desired = AttributeMap::new();
    desired.insert("driver-name", config.name.as_str());
    desired.insert("driver-module-name", config.module_name.as_str());
    if let Some(slot) = &config.module_slot {
        desired.insert("module-slot", slot.as_str());
    }
    if let Some(class) = &config.driver_class {
        desired.insert("driver-class-name", class.as_str());
    }
    if let Some(class) = &config.xa_datasource_class {
        desired.insert("driver-xa-datasource-class-name", class.as_str());
    }

    ModelResource::new("jdbc-driver", &config.name, address, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CliValue;

    #[test]
    fn test_address_and_attributes() {
        let config = JdbcDriverConfig {
            name: String::from("oracle"),
            module_name: String::from("com.oracle.jdbc"),
            module_slot: None,
            driver_class: None,
            xa_datasource_class: Some(String::from(
                "oracle.jdbc.xa.client.OracleXADataSource",
            )),
        };

        let resource = jdbc_driver(&config);
        assert_eq!(
            resource.address().to_string(),
            "/subsystem=datasources/jdbc-driver=oracle"
        );
        assert_eq!(
            resource.desired().get("driver-module-name"),
            Some(&CliValue::from("com.oracle.jdbc"))
        );
        // Unset options stay out of the map entirely.
        assert!(!resource.desired().contains_key("module-slot"));
        assert!(!resource.desired().contains_key("driver-class-name"));
    }
}
