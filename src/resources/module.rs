//! Server module registration (driver JARs).
//!
//! Modules live on the module path, not in the management model, so this
//! driver speaks the plain `module add`/`module remove` CLI syntax and
//! probes existence through the datasources subsystem's installed-drivers
//! list instead of `read-resource`.

use async_trait::async_trait;
use tracing::debug;

use crate::config::ServerModuleConfig;
use crate::error::Result;
use crate::reconciler::{Command, PlannedCommand, ReconcileOutcome, Reconciler};
use crate::transport::Transport;

use super::Resource;

/// A server module carrying a driver JAR.
#[derive(Debug, Clone)]
pub struct ServerModule {
    /// Module name, e.g. `com.oracle.jdbc`.
    name: String,
    /// Local path of the JAR to register.
    resources: String,
    /// Module dependencies.
    dependencies: Vec<String>,
}

impl ServerModule {
    /// Creates the driver from its configuration entry.
    #[must_use]
    pub fn from_config(config: &ServerModuleConfig) -> Self {
        Self {
            name: config.name.clone(),
            resources: config.resources.clone(),
            dependencies: config.dependencies.clone(),
        }
    }

    async fn is_registered(&self, reconciler: &Reconciler<'_, dyn Transport>) -> Result<bool> {
        let probe = Command::InstalledDriversList;
        match reconciler.transport().execute(&probe.render()).await {
            Ok(output) => Ok(output.stdout.contains(&self.name)),
            Err(err) if err.is_command_failure() => {
                debug!("Installed-drivers probe failed; treating module {} as absent", self.name);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn add_command(&self) -> PlannedCommand {
        PlannedCommand {
            command: Command::ModuleAdd {
                name: self.name.clone(),
                resources: self.resources.clone(),
                dependencies: self.dependencies.clone(),
            },
            reason: format!("register module {}", self.name),
            best_effort: false,
        }
    }

    fn remove_command(&self) -> PlannedCommand {
        PlannedCommand {
            command: Command::ModuleRemove {
                name: self.name.clone(),
            },
            reason: format!("unregister module {}", self.name),
            best_effort: false,
        }
    }
}

#[async_trait]
impl Resource for ServerModule {
    fn kind(&self) -> &'static str {
        "module"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!("module {}", self.name)
    }

    async fn exists(&self, reconciler: &Reconciler<'_, dyn Transport>) -> Result<bool> {
        self.is_registered(reconciler).await
    }

    async fn plan(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<Vec<PlannedCommand>> {
        if self.is_registered(reconciler).await? {
            Ok(Vec::new())
        } else {
            Ok(vec![self.add_command()])
        }
    }

    async fn ensure(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<ReconcileOutcome> {
        if self.is_registered(reconciler).await? {
            debug!("Module {} already registered", self.name);
            return Ok(ReconcileOutcome::unchanged());
        }

        let plan = vec![self.add_command()];
        reconciler.apply(&plan).await?;
        Ok(ReconcileOutcome {
            changed: true,
            commands: plan,
        })
    }

    async fn remove(
        &self,
        reconciler: &Reconciler<'_, dyn Transport>,
    ) -> Result<ReconcileOutcome> {
        if !self.is_registered(reconciler).await? {
            debug!("Module {} already absent", self.name);
            return Ok(ReconcileOutcome::unchanged());
        }

        let plan = vec![self.remove_command()];
        reconciler.apply(&plan).await?;
        Ok(ReconcileOutcome {
            changed: true,
            commands: plan,
        })
    }
}
