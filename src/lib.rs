// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Wildsync
//!
//! A declarative, idempotent configuration manager for WildFly/JBoss
//! application servers, driven through the management CLI.
//!
//! ## Overview
//!
//! Wildsync converges a live application server onto a desired state
//! described in a YAML file:
//!
//! - Define datasources, JDBC drivers, logging, and LDAP as code
//! - Read the current state from the server before every decision
//! - Issue only the minimal command sequence needed to converge
//! - Run it twice and the second run changes nothing
//!
//! ## Architecture
//!
//! The system is built around **desired state reconciliation**, with the
//! live server as the single source of truth:
//!
//! 1. **Desired State**: Defined in `wildsync.yaml`
//! 2. **Observed State**: Read from the server via `read-resource`
//! 3. **Reconciler**: Diffs the two and executes the minimal command plan
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`model`]: Typed attribute values and resource addresses
//! - [`codec`]: CLI literal encoding and response decoding
//! - [`transport`]: Management CLI subprocess transport
//! - [`reconciler`]: Diff computation and command execution
//! - [`resources`]: Typed drivers for each resource kind
//! - [`secrets`]: Credential resolution
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! server:
//!   jboss_home: /opt/wildfly
//!
//! resources:
//!   datasources:
//!     - name: OracleDS
//!       jndi_name: java:/OracleDS
//!       driver: oracle
//!       xa: true
//!       xa_properties:
//!         URL: jdbc:oracle:thin:@db.example.com:1521/ORCL
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod resources;
pub mod secrets;
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use codec::{CliResult, decode, encode};
pub use config::{ConfigParser, ConfigValidator, SyncConfig};
pub use error::{Result, WildsyncError};
pub use model::{Address, AttributeMap, CliValue};
pub use reconciler::{Command, DiffEngine, PlannedCommand, ReconcileOutcome, Reconciler};
pub use resources::{ModelResource, Resource, ServerModule};
pub use secrets::{SecretBackend, SecretStore};
pub use transport::{CommandOutput, JBossCli, Transport};
