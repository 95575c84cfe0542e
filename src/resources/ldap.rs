//! Outbound LDAP connections and LDAP-backed security realms.

use crate::config::{LdapConnectionConfig, LdapRealmConfig};
use crate::error::Result;
use crate::model::{Address, AttributeMap};
use crate::secrets::SecretStore;

use super::ModelResource;

/// Builds the driver for an outbound LDAP connection.
///
/// # Errors
///
/// Fails when the bind credential is a secret reference that cannot be
/// resolved.
pub fn ldap_connection(
    config: &LdapConnectionConfig,
    secrets: &SecretStore,
) -> Result<ModelResource> {
    let address =
        Address::new("core-service", "management").child("ldap-connection", &config.name);

    let mut desired = AttributeMap::new();
    desired.insert("url", config.url.as_str());
    desired.insert("search-dn", config.search_dn.as_str());
    desired.insert("search-credential", secrets.resolve(&config.search_credential)?);

    Ok(ModelResource::new(
        "ldap-connection",
        &config.name,
        address,
        desired,
    ))
}

/// Builds the driver for LDAP authentication on a security realm.
///
/// The realm itself must already exist; this manages its `authentication=ldap`
/// child.
#[must_use]
pub fn ldap_realm(config: &LdapRealmConfig) -> ModelResource {
    let address = Address::new("core-service", "management")
        .child("security-realm", &config.realm)
        .child("authentication", "ldap");

    let mut desired = AttributeMap::new();
    desired.insert("connection", config.connection.as_str());
    desired.insert("base-dn", config.base_dn.as_str());
    if let Some(filter) = &config.advanced_filter {
        desired.insert("advanced-filter", filter.as_str());
    }

    ModelResource::new("ldap-realm", &config.realm, address, desired)
}
