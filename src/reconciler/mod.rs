//! Reconciliation engine.
//!
//! Given a resource address and a desired attribute map, the reconciler
//! reads the current state from the live server, computes the minimal
//! ordered command sequence that converges the resource, and applies it
//! through the transport. The live server is the single source of truth;
//! no state survives between reconciliation calls.

pub mod command;
pub mod diff;
pub mod engine;
pub mod report;

pub use command::Command;
pub use diff::{DiffEngine, PlannedCommand};
pub use engine::{ReconcileOutcome, Reconciler};
pub use report::{
    ApplyReport, PlanEntry, PlanReport, PlannedStep, ResourceAction, ResourceResult,
    ResourceStatus, StatusReport,
};
