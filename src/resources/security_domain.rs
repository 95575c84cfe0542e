//! JAAS security domains under the security subsystem.

use crate::config::SecurityDomainConfig;
use crate::model::{Address, AttributeMap, CliValue};

use super::ModelResource;

/// Builds the driver for a JAAS security domain.
///
/// The domain itself carries only its cache type; the login module lives
/// on the `authentication=classic` child resource, expanded by the
/// reconciler, as a one-element `login-modules` list of `code`/`flag`
/// records.
#[must_use]
pub fn security_domain(config: &SecurityDomainConfig) -> ModelResource {
    let address = Address::new("subsystem", "security").child("security-domain", &config.name);

    let login_module = CliValue::record([
        ("code", CliValue::from(config.code.as_str())),
        ("flag", CliValue::from(config.flag.as_str())),
    ]);
    let authentication = CliValue::record([(
        "login-modules",
        CliValue::List(vec![login_module]),
    )]);

    let mut desired = AttributeMap::new();
    desired.insert("cache-type", config.cache_type.as_str());
    desired.insert(
        "authentication",
        CliValue::tree([("classic", authentication)]),
    );

    ModelResource::new("security-domain", &config.name, address, desired)
}
