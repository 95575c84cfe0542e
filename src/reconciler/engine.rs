//! Reconciler execution engine.
//!
//! Owns the read/plan/apply cycle for one resource address. Every decision
//! starts from a fresh `read-resource` against the live server; command
//! sequences then execute strictly in plan order through the shared
//! transport.

use tracing::{debug, info};

use crate::codec::{decode, CliResult};
use crate::error::{ManagementError, Result, WildsyncError};
use crate::model::{Address, AttributeMap};
use crate::transport::Transport;

use super::command::Command;
use super::diff::{DiffEngine, PlannedCommand};

/// Result of reconciling one resource.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Whether any mutating command was issued.
    pub changed: bool,
    /// The commands that were executed, in order.
    pub commands: Vec<PlannedCommand>,
}

impl ReconcileOutcome {
    /// An outcome for a resource already in its target state.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            changed: false,
            commands: Vec::new(),
        }
    }
}

/// Reconciler for management resources.
pub struct Reconciler<'a, T: Transport + ?Sized> {
    /// Transport to the management CLI.
    transport: &'a T,
    /// Plan computation.
    diff: DiffEngine,
}

impl<'a, T: Transport + ?Sized> Reconciler<'a, T> {
    /// Creates a reconciler over the given transport.
    #[must_use]
    pub const fn new(transport: &'a T) -> Self {
        Self {
            transport,
            diff: DiffEngine::new(),
        }
    }

    /// The transport this reconciler executes through.
    ///
    /// Resource drivers with non-model operations (module registration)
    /// issue their probes directly.
    #[must_use]
    pub const fn transport(&self) -> &'a T {
        self.transport
    }

    /// Reads the current recursive attribute map of a resource.
    ///
    /// A `CommandFailed` from the transport means the resource does not
    /// exist and yields `None`; this is the basis for every idempotency
    /// decision.
    ///
    /// # Errors
    ///
    /// Propagates launch failures, timeouts, and decode errors.
    pub async fn read(&self, address: &Address) -> Result<Option<AttributeMap>> {
        let command = Command::ReadResource {
            address: address.clone(),
            recursive: true,
        };

        let output = match self.transport.execute(&command.render()).await {
            Ok(output) => output,
            Err(err) if err.is_command_failure() => {
                debug!("Resource {} does not exist", address);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        match decode(&output.stdout)? {
            CliResult::Success(payload) => {
                let map = payload.as_map().cloned().ok_or_else(|| {
                    WildsyncError::Management(ManagementError::UnexpectedShape {
                        message: format!("read-resource at {address} returned a non-record payload"),
                    })
                })?;
                Ok(Some(map))
            }
            CliResult::Failure(description) => Err(WildsyncError::Management(
                ManagementError::OutcomeFailed { description },
            )),
        }
    }

    /// Plans the commands that `ensure_present` would execute.
    ///
    /// # Errors
    ///
    /// Propagates read and encoding failures.
    pub async fn plan_present(
        &self,
        address: &Address,
        desired: &AttributeMap,
    ) -> Result<Vec<PlannedCommand>> {
        let current = self.read(address).await?;
        if current.is_some() {
            return Ok(Vec::new());
        }
        self.diff.plan_create(address, None, desired)
    }

    /// Ensures the resource exists with the desired attributes.
    ///
    /// An existing resource is left untouched (use [`Self::ensure_attributes`]
    /// to converge attribute values); an absent one is created, depth-first
    /// through its expandable children.
    ///
    /// # Errors
    ///
    /// Propagates read failures and any fatal command failure.
    pub async fn ensure_present(
        &self,
        address: &Address,
        desired: &AttributeMap,
    ) -> Result<ReconcileOutcome> {
        let current = self.read(address).await?;
        if current.is_some() {
            debug!("Resource {} already exists", address);
            return Ok(ReconcileOutcome::unchanged());
        }

        let plan = self.diff.plan_create(address, None, desired)?;
        self.apply(&plan).await?;
        Ok(ReconcileOutcome {
            changed: !plan.is_empty(),
            commands: plan,
        })
    }

    /// Plans the commands that `ensure_attributes` would execute.
    ///
    /// # Errors
    ///
    /// Propagates read and encoding failures.
    pub async fn plan_attributes(
        &self,
        address: &Address,
        desired: &AttributeMap,
    ) -> Result<Vec<PlannedCommand>> {
        match self.read(address).await? {
            None => self.diff.plan_create(address, None, desired),
            Some(current) => self.diff.plan_update(address, &current, desired),
        }
    }

    /// Converges the resource's attributes onto the desired map.
    ///
    /// Creates the resource if absent; otherwise diffs current against
    /// desired and issues the minimal write/undefine sequence. Running this
    /// twice in a row issues no command the second time.
    ///
    /// # Errors
    ///
    /// Propagates read failures and any fatal command failure.
    pub async fn ensure_attributes(
        &self,
        address: &Address,
        desired: &AttributeMap,
    ) -> Result<ReconcileOutcome> {
        let plan = self.plan_attributes(address, desired).await?;
        if plan.is_empty() {
            debug!("Resource {} already converged", address);
            return Ok(ReconcileOutcome::unchanged());
        }

        self.apply(&plan).await?;
        Ok(ReconcileOutcome {
            changed: true,
            commands: plan,
        })
    }

    /// Removes the resource if it exists.
    ///
    /// # Errors
    ///
    /// Propagates read failures and remove failures.
    pub async fn ensure_absent(&self, address: &Address) -> Result<ReconcileOutcome> {
        if self.read(address).await?.is_none() {
            debug!("Resource {} already absent", address);
            return Ok(ReconcileOutcome::unchanged());
        }

        let plan = self.diff.plan_remove(address);
        self.apply(&plan).await?;
        Ok(ReconcileOutcome {
            changed: true,
            commands: plan,
        })
    }

    /// Executes a command plan sequentially.
    ///
    /// The first fatal failure aborts the remaining sequence; best-effort
    /// commands swallow `CommandFailed` (the resource was not there).
    ///
    /// # Errors
    ///
    /// Propagates transport errors and failed management outcomes.
    pub async fn apply(&self, plan: &[PlannedCommand]) -> Result<()> {
        for planned in plan {
            let rendered = planned.command.render();
            info!("Executing: {}", rendered);

            match self.transport.execute(&rendered).await {
                Ok(output) => {
                    if planned.command.is_mutating() && planned.command.has_management_outcome() {
                        if let Ok(CliResult::Failure(description)) = decode(&output.stdout) {
                            if planned.best_effort {
                                debug!(
                                    "Tolerated failed outcome for {}: {}",
                                    rendered, description
                                );
                                continue;
                            }
                            return Err(WildsyncError::Management(
                                ManagementError::OutcomeFailed { description },
                            ));
                        }
                    }
                }
                Err(err) if planned.best_effort && err.is_command_failure() => {
                    debug!("Tolerated command failure for {}: {}", rendered, err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CliValue;
    use crate::transport::{CommandOutput, MockTransport};
    use mockall::predicate::eq;

    fn success() -> CommandOutput {
        CommandOutput {
            stdout: String::from("{\"outcome\" => \"success\"}"),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    fn success_with(result: &str) -> CommandOutput {
        CommandOutput {
            stdout: format!("{{\"outcome\" => \"success\", \"result\" => {result}}}"),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    fn command_failed() -> WildsyncError {
        WildsyncError::Transport(crate::error::TransportError::CommandFailed {
            exit_code: 1,
            stderr: String::from("JBAS014807: Management resource not found"),
        })
    }

    fn oracle_ds() -> Address {
        Address::new("subsystem", "datasources").child("xa-data-source", "OracleDS")
    }

    fn logger_addr() -> Address {
        Address::new("subsystem", "logging").child("logger", "com.example")
    }

    #[tokio::test]
    async fn test_read_absent_resource_is_none() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=datasources/xa-data-source=OracleDS:read-resource(recursive=true)",
            ))
            .times(1)
            .returning(|_| Err(command_failed()));

        let reconciler = Reconciler::new(&transport);
        let current = reconciler.read(&oracle_ds()).await.unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_read_parses_current_attributes() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(success_with("{\"level\" => \"INFO\"}")));

        let reconciler = Reconciler::new(&transport);
        let current = reconciler.read(&logger_addr()).await.unwrap().unwrap();
        assert_eq!(current.get("level"), Some(&CliValue::from("INFO")));
    }

    #[tokio::test]
    async fn test_create_absent_datasource_issues_single_add() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=datasources/xa-data-source=OracleDS:read-resource(recursive=true)",
            ))
            .times(1)
            .returning(|_| Err(command_failed()));
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=datasources/xa-data-source=OracleDS:add(jndi-name=\"java:/OracleDS\",min-pool-size=5)",
            ))
            .times(1)
            .returning(|_| Ok(success()));

        let desired: AttributeMap = [
            ("jndi-name", CliValue::from("java:/OracleDS")),
            ("min-pool-size", CliValue::Int(5)),
        ]
        .into_iter()
        .collect();

        let reconciler = Reconciler::new(&transport);
        let outcome = reconciler.ensure_present(&oracle_ds(), &desired).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.commands.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_resource_left_untouched() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(success_with("{\"jndi-name\" => \"java:/OracleDS\"}")));

        let desired: AttributeMap = [("jndi-name", CliValue::from("java:/OracleDS"))]
            .into_iter()
            .collect();

        let reconciler = Reconciler::new(&transport);
        let outcome = reconciler.ensure_present(&oracle_ds(), &desired).await.unwrap();
        assert!(!outcome.changed);
        assert!(outcome.commands.is_empty());
    }

    #[tokio::test]
    async fn test_update_changed_level_issues_single_write() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=logging/logger=com.example:read-resource(recursive=true)",
            ))
            .times(1)
            .returning(|_| Ok(success_with("{\"level\" => \"INFO\"}")));
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=logging/logger=com.example:write-attribute(name=level,value=\"DEBUG\")",
            ))
            .times(1)
            .returning(|_| Ok(success()));

        let desired: AttributeMap = [("level", CliValue::from("DEBUG"))].into_iter().collect();

        let reconciler = Reconciler::new(&transport);
        let outcome = reconciler
            .ensure_attributes(&logger_addr(), &desired)
            .await
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.commands.len(), 1);
    }

    #[tokio::test]
    async fn test_update_is_idempotent_on_second_run() {
        // After the first run converged the level, a second read returns the
        // desired value and no mutating command may be issued.
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=logging/logger=com.example:read-resource(recursive=true)",
            ))
            .times(1)
            .returning(|_| Ok(success_with("{\"level\" => \"DEBUG\"}")));

        let desired: AttributeMap = [("level", CliValue::from("DEBUG"))].into_iter().collect();

        let reconciler = Reconciler::new(&transport);
        let outcome = reconciler
            .ensure_attributes(&logger_addr(), &desired)
            .await
            .unwrap();
        assert!(!outcome.changed);
        assert!(outcome.commands.is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_remove_failure_is_swallowed() {
        let plan = vec![
            PlannedCommand {
                command: Command::Remove { address: oracle_ds() },
                reason: String::from("resource exists; resetting before add"),
                best_effort: true,
            },
            PlannedCommand {
                command: Command::Add {
                    address: oracle_ds(),
                    params: String::from("driver-name=\"h2\""),
                },
                reason: String::from("create"),
                best_effort: false,
            },
        ];

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(eq("/subsystem=datasources/xa-data-source=OracleDS:remove()"))
            .times(1)
            .returning(|_| Err(command_failed()));
        transport
            .expect_execute()
            .with(eq(
                "/subsystem=datasources/xa-data-source=OracleDS:add(driver-name=\"h2\")",
            ))
            .times(1)
            .returning(|_| Ok(success()));

        let reconciler = Reconciler::new(&transport);
        reconciler.apply(&plan).await.unwrap();
    }

    #[tokio::test]
    async fn test_fatal_add_failure_aborts_sequence() {
        let plan = vec![
            PlannedCommand {
                command: Command::Add {
                    address: oracle_ds(),
                    params: String::from("driver-name=\"h2\""),
                },
                reason: String::from("create"),
                best_effort: false,
            },
            PlannedCommand {
                command: Command::WriteAttribute {
                    address: oracle_ds(),
                    name: String::from("min-pool-size"),
                    value: String::from("5"),
                },
                reason: String::from("set min-pool-size"),
                best_effort: false,
            },
        ];

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Err(command_failed()));

        let reconciler = Reconciler::new(&transport);
        let err = reconciler.apply(&plan).await.unwrap_err();
        assert!(err.is_command_failure());
    }

    #[tokio::test]
    async fn test_failed_outcome_with_zero_exit_is_fatal() {
        let plan = vec![PlannedCommand {
            command: Command::Add {
                address: oracle_ds(),
                params: String::from("driver-name=\"h2\""),
            },
            reason: String::from("create"),
            best_effort: false,
        }];

        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            Ok(CommandOutput {
                stdout: String::from(
                    "{\"outcome\" => \"failed\", \"failure-description\" => \"duplicate resource\"}",
                ),
                stderr: String::new(),
                exit_code: 0,
            })
        });

        let reconciler = Reconciler::new(&transport);
        let err = reconciler.apply(&plan).await.unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Management(ManagementError::OutcomeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_absent_resource_is_noop() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Err(command_failed()));

        let reconciler = Reconciler::new(&transport);
        let outcome = reconciler.ensure_absent(&oracle_ds()).await.unwrap();
        assert!(!outcome.changed);
    }
}
