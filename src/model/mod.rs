//! Core data model for management resources.
//!
//! This module defines the typed values exchanged with the management CLI,
//! the hierarchical addresses identifying configuration nodes, and the
//! insertion-ordered attribute maps that describe desired or current state.

pub mod address;
pub mod value;

pub use address::Address;
pub use value::{AttributeMap, CliValue};
