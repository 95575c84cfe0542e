//! Typed resource drivers.
//!
//! Each driver translates one configuration entry into a management model
//! address plus a desired attribute map, then delegates the read/diff/apply
//! mechanics to the reconciler. Drivers own the domain knowledge (which
//! subsystem, which attribute names); the reconciler owns the mechanics.

pub mod datasource;
pub mod jdbc_driver;
pub mod ldap;
pub mod logging;
pub mod module;
pub mod security_domain;

pub use datasource::datasource;
pub use jdbc_driver::jdbc_driver;
pub use ldap::{ldap_connection, ldap_realm};
pub use logging::{logger, logging_handler};
pub use module::ServerModule;
pub use security_domain::security_domain;

use async_trait::async_trait;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::model::{Address, AttributeMap};
use crate::reconciler::{PlannedCommand, ReconcileOutcome, Reconciler};
use crate::secrets::SecretStore;
use crate::transport::Transport;

/// A reconcilable resource.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The resource kind, for display and lookup.
    fn kind(&self) -> &'static str;

    /// The configured resource name.
    fn name(&self) -> &str;

    /// Where the resource lives, for display.
    fn describe(&self) -> String;

    /// Whether the resource currently exists on the server.
    async fn exists(&self, reconciler: &Reconciler<'_, dyn Transport>) -> Result<bool>;

    /// The commands a reconciliation would issue right now.
    async fn plan(&self, reconciler: &Reconciler<'_, dyn Transport>)
        -> Result<Vec<PlannedCommand>>;

    /// Converges the resource onto its desired state.
    async fn ensure(&self, reconciler: &Reconciler<'_, dyn Transport>)
        -> Result<ReconcileOutcome>;

    /// Removes the resource if present.
    async fn remove(&self, reconciler: &Reconciler<'_, dyn Transport>)
        -> Result<ReconcileOutcome>;
}

/// A resource backed by a management model address.
///
/// Covers every driver except server modules, which speak the `module`
/// CLI syntax instead of the management model.
#[derive(Debug, Clone)]
pub struct ModelResource {
    /// Resource kind, for display.
    kind: &'static str,
    /// Configured name.
    name: String,
    /// Management model address.
    address: Address,
    /// Desired attributes, secrets already resolved.
    desired: AttributeMap,
}

impl ModelResource {
    /// Creates a model-backed resource.
    #[must_use]
    pub fn new(
        kind: &'static str,
        name: impl Into<String>,
        address: Address,
        desired: AttributeMap,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            address,
            desired,
        }
    }

    /// The management model address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The desired attribute map.
    #[must_use]
    pub const fn desired(&self) -> &AttributeMap {
        &self.desired
    }
}

#[async_trait]
impl Resource for ModelResource {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        self.address.to_string()
    }

    async fn exists(&self, reconciler: &Reconciler<'_, dyn Transport>) -> Result<bool> {
        Ok(reconciler.read(&self.address).await?.is_some())
    }

    async fn plan(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<Vec<PlannedCommand>> {
        reconciler.plan_attributes(&self.address, &self.desired).await
    }

    async fn ensure(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<ReconcileOutcome> {
        reconciler.ensure_attributes(&self.address, &self.desired).await
    }

    async fn remove(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<ReconcileOutcome> {
        reconciler.ensure_absent(&self.address).await
    }
}

/// Builds the full driver list from configuration, in apply order.
///
/// Modules come first (drivers need their JARs), then JDBC drivers, then
/// datasources, then logging handlers before the loggers that reference
/// them, then LDAP connections before the realms that use them, then
/// security domains.
///
/// # Errors
///
/// Fails when a secret reference cannot be resolved.
pub fn from_config(config: &SyncConfig, secrets: &SecretStore) -> Result<Vec<Box<dyn Resource>>> {
    let r = &config.resources;
    let mut resources: Vec<Box<dyn Resource>> = Vec::new();

    for m in &r.modules {
        resources.push(Box::new(ServerModule::from_config(m)));
    }
    for d in &r.jdbc_drivers {
        resources.push(Box::new(jdbc_driver(d)));
    }
    for d in &r.datasources {
        resources.push(Box::new(datasource(d, secrets)?));
    }
    for h in &r.logging_handlers {
        resources.push(Box::new(logging_handler(h)));
    }
    for l in &r.loggers {
        resources.push(Box::new(logger(l)));
    }
    for c in &r.ldap_connections {
        resources.push(Box::new(ldap_connection(c, secrets)?));
    }
    for realm in &r.ldap_realms {
        resources.push(Box::new(ldap_realm(realm)));
    }
    for domain in &r.security_domains {
        resources.push(Box::new(security_domain(domain)));
    }

    Ok(resources)
}
