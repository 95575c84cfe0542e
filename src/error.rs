//! Error types for the wildsync configuration manager.
//!
//! This module provides a comprehensive error hierarchy for all operations
//! in the reconciliation lifecycle: configuration, secret resolution,
//! transport, CLI output decoding, and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the wildsync configuration manager.
#[derive(Debug, Error)]
pub enum WildsyncError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Secret resolution errors.
    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    /// Management CLI transport errors.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Value encoding/decoding errors.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Errors reported by the management interface itself.
    #[error("Management error: {0}")]
    Management(#[from] ManagementError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Duplicate resource definition.
    #[error("Duplicate {resource_type} name: {name}")]
    DuplicateName {
        /// Type of resource (datasource, logger, etc.).
        resource_type: String,
        /// The duplicated name.
        name: String,
    },

    /// A resource address segment is malformed.
    #[error("Invalid resource address '{address}': bad segment '{segment}'")]
    InvalidAddress {
        /// The full address text.
        address: String,
        /// The offending segment.
        segment: String,
    },

    /// No resource with the given name is defined.
    #[error("Unknown resource: {name}")]
    UnknownResource {
        /// The requested resource name.
        name: String,
    },
}

/// Secret resolution errors.
///
/// A missing or unresolvable credential is a hard failure: proceeding with
/// an empty password would silently configure a broken resource.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The configured secret backend is not supported.
    #[error("Unsupported secret backend: {backend}")]
    UnsupportedBackend {
        /// The unrecognized backend name.
        backend: String,
    },

    /// A secret bag could not be read.
    #[error("Failed to read secret bag '{bag}': {message}")]
    BagUnreadable {
        /// The bag name.
        bag: String,
        /// Description of the failure.
        message: String,
    },

    /// The requested key is missing from the bag.
    #[error("Secret '{key}' not found in bag '{bag}'")]
    MissingKey {
        /// The bag name.
        bag: String,
        /// The missing key.
        key: String,
    },

    /// A secret reference string is malformed.
    #[error("Malformed secret reference: {reference}")]
    MalformedReference {
        /// The offending reference.
        reference: String,
    },

    /// An encrypted value envelope could not be decoded.
    #[error("Failed to decode encrypted value for '{key}' in bag '{bag}': {message}")]
    DecodeFailed {
        /// The bag name.
        bag: String,
        /// The key.
        key: String,
        /// Description of the failure.
        message: String,
    },
}

/// Management CLI transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The CLI subprocess could not be launched.
    #[error("Failed to launch management CLI '{program}': {message}")]
    LaunchFailed {
        /// The program that failed to start.
        program: String,
        /// Description of the launch failure.
        message: String,
    },

    /// The CLI subprocess exited with a non-zero status.
    ///
    /// During existence checks this is a signal (resource absent), not an
    /// error; during mutating operations it is fatal.
    #[error("Management CLI command failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        /// The exit status.
        exit_code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The CLI subprocess exceeded its timeout.
    #[error("Management CLI command timed out after {timeout_secs} seconds")]
    Timeout {
        /// The configured timeout in seconds.
        timeout_secs: u64,
    },
}

/// Value encoding/decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A non-flat nested mapping was passed to the literal encoder.
    ///
    /// Expandable attribute trees must be traversed into child resource
    /// addresses, never inlined; hitting this is a programming error in
    /// desired-state construction.
    #[error("Cannot inline-encode an expandable attribute tree; wrap the value in a flat record or expand it into child resources")]
    UnsupportedValueShape,

    /// The CLI response text could not be parsed.
    #[error("Failed to parse management CLI output at offset {offset}: {message}")]
    Parse {
        /// Byte offset of the failure.
        offset: usize,
        /// Description of the parse failure.
        message: String,
    },
}

/// Errors reported by the management interface itself.
#[derive(Debug, Error)]
pub enum ManagementError {
    /// The decoded response carried `outcome => "failed"`.
    #[error("Management operation failed: {description}")]
    OutcomeFailed {
        /// The server-supplied diagnostic text.
        description: String,
    },

    /// The decoded response had an unexpected shape.
    #[error("Unexpected management response shape: {message}")]
    UnexpectedShape {
        /// Description of the problem.
        message: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Reconciliation failed for a specific resource.
    #[error("Failed to reconcile {resource_type} '{name}' at {address}: {reason}")]
    ResourceFailed {
        /// Type of resource.
        resource_type: String,
        /// Name of the resource.
        name: String,
        /// The management address involved.
        address: String,
        /// Reason for failure.
        reason: String,
    },

    /// Reconciliation was aborted.
    #[error("Reconciliation aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },
}

/// Result type alias for wildsync operations.
pub type Result<T> = std::result::Result<T, WildsyncError>;

impl WildsyncError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error means "the subprocess exited non-zero".
    ///
    /// Existence checks reinterpret this as "resource absent"; everything
    /// else treats it as fatal.
    #[must_use]
    pub const fn is_command_failure(&self) -> bool {
        matches!(self, Self::Transport(TransportError::CommandFailed { .. }))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl CodecError {
    /// Creates a parse error at the given offset.
    #[must_use]
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}
