//! Hierarchical resource addresses.
//!
//! An address identifies a configuration node within the server's management
//! model as an ordered sequence of `node_type=node_name` pairs, rendered
//! `/subsystem=datasources/xa-data-source=OracleDS`.

use crate::error::{ConfigError, WildsyncError};

/// A hierarchical management resource address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Address {
    segments: Vec<(String, String)>,
}

impl Address {
    /// The management root (empty address).
    #[must_use]
    pub const fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Builds an address from a single `node_type=node_name` pair.
    pub fn new(node_type: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            segments: vec![(node_type.into(), node_name.into())],
        }
    }

    /// Returns a new address with one more `node_type=node_name` segment.
    #[must_use]
    pub fn child(&self, node_type: impl Into<String>, node_name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push((node_type.into(), node_name.into()));
        Self { segments }
    }

    /// Parses an address from its textual form.
    ///
    /// # Errors
    ///
    /// Returns an error if any segment is not a `node_type=node_name` pair.
    pub fn parse(text: &str) -> Result<Self, WildsyncError> {
        let mut segments = Vec::new();
        for part in text.split('/').filter(|p| !p.is_empty()) {
            let (node_type, node_name) = part.split_once('=').ok_or_else(|| {
                WildsyncError::Config(ConfigError::InvalidAddress {
                    address: text.to_string(),
                    segment: part.to_string(),
                })
            })?;
            if node_type.is_empty() || node_name.is_empty() {
                return Err(WildsyncError::Config(ConfigError::InvalidAddress {
                    address: text.to_string(),
                    segment: part.to_string(),
                }));
            }
            segments.push((node_type.to_string(), node_name.to_string()));
        }
        Ok(Self { segments })
    }

    /// The segments of this address, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    /// The name of the innermost node, if any.
    #[must_use]
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(|(_, name)| name.as_str())
    }

    /// Returns true if this is the management root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for (node_type, node_name) in &self.segments {
            write!(f, "/{node_type}={node_name}")?;
        }
        Ok(())
    }
}
