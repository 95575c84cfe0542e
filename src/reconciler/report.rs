//! Aggregated reconciliation reports across resources.
//!
//! These are the serializable summaries the CLI renders: a dry-run plan,
//! an apply result, and a status table. Commands are carried in rendered
//! form so the reports can be serialized as-is.

use serde::Serialize;

use super::command::Command;
use super::diff::PlannedCommand;
use super::engine::ReconcileOutcome;

/// What an apply did to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceAction {
    /// The resource was created.
    Created,
    /// Existing attributes were converged.
    Updated,
    /// The resource was removed.
    Removed,
    /// The resource was already in its target state.
    Unchanged,
    /// Reconciliation failed for this resource.
    Failed,
}

impl ResourceAction {
    /// Classifies an ensure outcome by the commands it executed.
    #[must_use]
    pub fn from_outcome(outcome: &ReconcileOutcome) -> Self {
        if !outcome.changed {
            return Self::Unchanged;
        }
        let created = outcome.commands.iter().any(|planned| {
            matches!(
                planned.command,
                Command::Add { .. } | Command::ModuleAdd { .. }
            )
        });
        if created { Self::Created } else { Self::Updated }
    }
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
            Self::Failed => "failed",
        };
        write!(f, "{text}")
    }
}

/// One rendered command with its reason.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    /// The rendered CLI command.
    pub command: String,
    /// Why the command is needed.
    pub reason: String,
}

impl From<&PlannedCommand> for PlannedStep {
    fn from(planned: &PlannedCommand) -> Self {
        Self {
            command: planned.command.render(),
            reason: planned.reason.clone(),
        }
    }
}

/// Planned commands for one resource.
#[derive(Debug, Serialize)]
pub struct PlanEntry {
    /// Resource kind.
    pub kind: String,
    /// Configured resource name.
    pub name: String,
    /// Address or module path.
    pub location: String,
    /// Commands apply would issue, in order.
    pub steps: Vec<PlannedStep>,
}

/// Dry-run plan across all resources.
#[derive(Debug, Default, Serialize)]
pub struct PlanReport {
    /// Per-resource entries, in apply order.
    pub entries: Vec<PlanEntry>,
}

impl PlanReport {
    /// Returns true if no resource needs any command.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.entries.iter().all(|e| e.steps.is_empty())
    }

    /// Total number of commands across all resources.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.entries.iter().map(|e| e.steps.len()).sum()
    }
}

/// Apply result for one resource.
#[derive(Debug, Serialize)]
pub struct ResourceResult {
    /// Resource kind.
    pub kind: String,
    /// Configured resource name.
    pub name: String,
    /// What happened.
    pub action: ResourceAction,
    /// Commands that were executed.
    pub steps: Vec<PlannedStep>,
    /// Failure cause, when action is `Failed`.
    pub error: Option<String>,
}

/// Apply result across all resources.
#[derive(Debug, Default, Serialize)]
pub struct ApplyReport {
    /// Per-resource results, in apply order.
    pub results: Vec<ResourceResult>,
}

impl ApplyReport {
    /// Number of resources with the given action.
    #[must_use]
    pub fn count(&self, action: ResourceAction) -> usize {
        self.results.iter().filter(|r| r.action == action).count()
    }

    /// Returns true if no resource failed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.count(ResourceAction::Failed) == 0
    }
}

/// Observed status of one resource.
#[derive(Debug, Serialize)]
pub struct ResourceStatus {
    /// Resource kind.
    pub kind: String,
    /// Configured resource name.
    pub name: String,
    /// Address or module path.
    pub location: String,
    /// Whether the resource exists on the server.
    pub exists: bool,
    /// Number of commands an apply would issue.
    pub pending_steps: usize,
}

/// Status table across all resources.
#[derive(Debug, Default, Serialize)]
pub struct StatusReport {
    /// Per-resource rows, in apply order.
    pub rows: Vec<ResourceStatus>,
}

impl StatusReport {
    /// Number of resources that have drifted from their target state.
    #[must_use]
    pub fn drifted(&self) -> usize {
        self.rows.iter().filter(|r| r.pending_steps > 0).count()
    }
}
