//! Diff engine: desired vs current attribute maps to command plans.
//!
//! The planning functions are pure; execution (and the tolerance rules for
//! best-effort removes) lives in [`crate::reconciler::engine`]. Commands
//! are emitted in desired-map insertion order so dry-run output is
//! reproducible.

use tracing::debug;

use crate::codec::encode;
use crate::error::{CodecError, Result, WildsyncError};
use crate::model::{Address, AttributeMap, CliValue};

use super::command::Command;

/// A command plus the context needed to execute and display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    /// The command to issue.
    pub command: Command,
    /// Why the command is needed.
    pub reason: String,
    /// Whether a `CommandFailed` from this command is tolerated.
    ///
    /// Removes issued before an add are best-effort: failure means the
    /// resource was not there, the expected steady state for fresh
    /// resources.
    pub best_effort: bool,
}

impl PlannedCommand {
    fn fatal(command: Command, reason: impl Into<String>) -> Self {
        Self {
            command,
            reason: reason.into(),
            best_effort: false,
        }
    }

    fn tolerated(command: Command, reason: impl Into<String>) -> Self {
        Self {
            command,
            reason: reason.into(),
            best_effort: true,
        }
    }
}

/// Engine computing minimal command plans.
#[derive(Debug, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Plans the creation of a resource (and, recursively, its expandable
    /// child resources).
    ///
    /// Non-null leaf values become `key=value` parameters of a single
    /// `add`; a `remove` precedes it only when the resource currently
    /// exists. Tree-valued attributes expand depth-first into child
    /// addresses `address/key=subkey`.
    ///
    /// # Errors
    ///
    /// Fails when a desired value cannot be encoded, or when a tree entry
    /// is not itself a map of child attribute maps.
    pub fn plan_create(
        &self,
        address: &Address,
        current: Option<&AttributeMap>,
        desired: &AttributeMap,
    ) -> Result<Vec<PlannedCommand>> {
        let mut commands = Vec::new();

        let mut params = Vec::new();
        for (key, value) in desired.iter() {
            match value {
                CliValue::Tree(_) | CliValue::Null => {}
                other => params.push(format!("{key}={}", encode(other)?)),
            }
        }

        if current.is_some() {
            commands.push(PlannedCommand::tolerated(
                Command::Remove {
                    address: address.clone(),
                },
                "resource exists; resetting before add",
            ));
        }

        if params.is_empty() {
            debug!("No parameters to add at {}", address);
        } else {
            commands.push(PlannedCommand::fatal(
                Command::Add {
                    address: address.clone(),
                    params: params.join(","),
                },
                format!("create with {} parameter(s)", params.len()),
            ));
        }

        // Depth-first recursion into expandable child resources.
        for (key, value) in desired.iter() {
            let CliValue::Tree(children) = value else {
                continue;
            };
            for (subkey, subvalue) in children.iter() {
                let Some(sub_desired) = subvalue.as_map() else {
                    return Err(WildsyncError::Codec(CodecError::UnsupportedValueShape));
                };
                let child_address = address.child(key, subkey);
                let child_current = current
                    .and_then(|c| c.get(key))
                    .and_then(CliValue::as_map)
                    .and_then(|m| m.get(subkey))
                    .and_then(CliValue::as_map);
                commands.extend(self.plan_create(&child_address, child_current, sub_desired)?);
            }
        }

        Ok(commands)
    }

    /// Plans the attribute-level update of an existing resource.
    ///
    /// For each desired key, in insertion order: a null desired value for a
    /// present non-null current attribute yields `undefine-attribute`; a
    /// missing or differing current value yields `write-attribute`; a
    /// matching value yields nothing. Tree-valued entries are skipped here,
    /// they belong to the create path.
    ///
    /// # Errors
    ///
    /// Fails when a desired value cannot be encoded.
    pub fn plan_update(
        &self,
        address: &Address,
        current: &AttributeMap,
        desired: &AttributeMap,
    ) -> Result<Vec<PlannedCommand>> {
        let mut commands = Vec::new();

        for (key, value) in desired.iter() {
            match value {
                CliValue::Null => {
                    let currently_set = current.get(key).is_some_and(|v| !v.is_null());
                    if currently_set {
                        commands.push(PlannedCommand::fatal(
                            Command::UndefineAttribute {
                                address: address.clone(),
                                name: key.to_string(),
                            },
                            format!("unset {key}"),
                        ));
                    }
                }
                CliValue::Tree(_) => {
                    debug!("Skipping expandable attribute '{}' in update at {}", key, address);
                }
                other => {
                    if current.get(key) != Some(other) {
                        let reason = if current.contains_key(key) {
                            format!("update {key}")
                        } else {
                            format!("set {key}")
                        };
                        commands.push(PlannedCommand::fatal(
                            Command::WriteAttribute {
                                address: address.clone(),
                                name: key.to_string(),
                                value: encode(other)?,
                            },
                            reason,
                        ));
                    }
                }
            }
        }

        Ok(commands)
    }

    /// Plans the removal of a resource.
    #[must_use]
    pub fn plan_remove(&self, address: &Address) -> Vec<PlannedCommand> {
        vec![PlannedCommand::fatal(
            Command::Remove {
                address: address.clone(),
            },
            "resource not desired",
        )]
    }
}
