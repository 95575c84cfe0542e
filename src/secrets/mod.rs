//! Secret resolution for credential attributes.
//!
//! Config values may be literal or `secret://<bag>/<key>` references. A
//! reference that cannot be resolved is a hard error: configuring a
//! resource with an empty credential would look successful and fail only
//! at connection time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::error::{Result, SecretError, WildsyncError};

/// Prefix marking a config value as a secret reference.
const SECRET_SCHEME: &str = "secret://";

/// Supported secret backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    /// Plaintext YAML bag files under the configured directory.
    Standard,
    /// YAML bag files whose values are base64 envelopes written by an
    /// external encryption step.
    Encrypted,
    /// Environment variables of the form `WILDSYNC_VAULT_<BAG>_<KEY>`.
    Vault,
}

impl SecretBackend {
    /// Parses a backend name from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::UnsupportedBackend`] for anything but
    /// `standard`, `encrypted`, or `vault`.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "standard" => Ok(Self::Standard),
            "encrypted" => Ok(Self::Encrypted),
            "vault" => Ok(Self::Vault),
            other => Err(WildsyncError::Secret(SecretError::UnsupportedBackend {
                backend: other.to_string(),
            })),
        }
    }
}

/// Resolves secret references against one configured backend.
#[derive(Debug)]
pub struct SecretStore {
    /// Which backend to consult.
    backend: SecretBackend,
    /// Bag directory for the file-based backends.
    path: PathBuf,
}

impl SecretStore {
    /// Creates a store for the given backend and bag directory.
    #[must_use]
    pub fn new(backend: SecretBackend, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }

    /// Resolves a config value, dereferencing `secret://` references.
    ///
    /// Literal values pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::MalformedReference`] for a reference missing
    /// its bag or key, plus any lookup failure.
    pub fn resolve(&self, value: &str) -> Result<String> {
        let Some(reference) = value.strip_prefix(SECRET_SCHEME) else {
            return Ok(value.to_string());
        };

        let (bag, key) = reference.split_once('/').ok_or_else(|| {
            WildsyncError::Secret(SecretError::MalformedReference {
                reference: value.to_string(),
            })
        })?;
        if bag.is_empty() || key.is_empty() || key.contains('/') {
            return Err(WildsyncError::Secret(SecretError::MalformedReference {
                reference: value.to_string(),
            }));
        }

        self.lookup(bag, key)
    }

    /// Looks up one key in one bag.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::BagUnreadable`] when the bag file cannot be
    /// read or parsed, [`SecretError::MissingKey`] when the key is absent,
    /// and [`SecretError::DecodeFailed`] when an encrypted envelope is
    /// corrupt.
    pub fn lookup(&self, bag: &str, key: &str) -> Result<String> {
        debug!("Resolving secret {}/{}", bag, key);
        match self.backend {
            SecretBackend::Standard => self.lookup_in_bag(bag, key),
            SecretBackend::Encrypted => {
                let envelope = self.lookup_in_bag(bag, key)?;
                decode_envelope(bag, key, &envelope)
            }
            SecretBackend::Vault => lookup_vault(bag, key),
        }
    }

    fn bag_path(&self, bag: &str) -> PathBuf {
        self.path.join(format!("{bag}.yaml"))
    }

    fn lookup_in_bag(&self, bag: &str, key: &str) -> Result<String> {
        let entries = read_bag(bag, &self.bag_path(bag))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| {
                WildsyncError::Secret(SecretError::MissingKey {
                    bag: bag.to_string(),
                    key: key.to_string(),
                })
            })
    }
}

fn read_bag(bag: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let unreadable = |message: String| {
        WildsyncError::Secret(SecretError::BagUnreadable {
            bag: bag.to_string(),
            message,
        })
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|e| unreadable(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&contents).map_err(|e| unreadable(e.to_string()))
}

fn decode_envelope(bag: &str, key: &str, envelope: &str) -> Result<String> {
    let failed = |message: String| {
        WildsyncError::Secret(SecretError::DecodeFailed {
            bag: bag.to_string(),
            key: key.to_string(),
            message,
        })
    };

    let bytes = BASE64
        .decode(envelope.trim())
        .map_err(|e| failed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| failed(e.to_string()))
}

/// Environment variable name for a vault-backed secret.
#[must_use]
pub fn vault_env_name(bag: &str, key: &str) -> String {
    let sanitize = |s: &str| {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect::<String>()
    };
    format!("WILDSYNC_VAULT_{}_{}", sanitize(bag), sanitize(key))
}

fn lookup_vault(bag: &str, key: &str) -> Result<String> {
    std::env::var(vault_env_name(bag, key)).map_err(|_| {
        WildsyncError::Secret(SecretError::MissingKey {
            bag: bag.to_string(),
            key: key.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bag_dir(bag: &str, contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(format!("{bag}.yaml"))).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_parse_backend_names() {
        assert_eq!(
            SecretBackend::parse("standard").unwrap(),
            SecretBackend::Standard
        );
        assert_eq!(
            SecretBackend::parse("encrypted").unwrap(),
            SecretBackend::Encrypted
        );
        assert_eq!(SecretBackend::parse("vault").unwrap(), SecretBackend::Vault);
    }

    #[test]
    fn test_unsupported_backend_is_hard_error() {
        let err = SecretBackend::parse("keyring").unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Secret(SecretError::UnsupportedBackend { .. })
        ));
    }

    #[test]
    fn test_literal_value_passes_through() {
        let store = SecretStore::new(SecretBackend::Standard, "/nonexistent");
        assert_eq!(store.resolve("plain-password").unwrap(), "plain-password");
    }

    #[test]
    fn test_standard_lookup() {
        let dir = bag_dir("datasources", "oracle_password: s3cr3t\n");
        let store = SecretStore::new(SecretBackend::Standard, dir.path());
        assert_eq!(
            store.resolve("secret://datasources/oracle_password").unwrap(),
            "s3cr3t"
        );
    }

    #[test]
    fn test_missing_key_is_hard_error() {
        let dir = bag_dir("datasources", "oracle_password: s3cr3t\n");
        let store = SecretStore::new(SecretBackend::Standard, dir.path());
        let err = store.resolve("secret://datasources/db2_password").unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Secret(SecretError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_unreadable_bag_is_hard_error() {
        let store = SecretStore::new(SecretBackend::Standard, "/nonexistent");
        let err = store.lookup("datasources", "oracle_password").unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Secret(SecretError::BagUnreadable { .. })
        ));
    }

    #[test]
    fn test_encrypted_lookup_decodes_envelope() {
        // "s3cr3t" base64-encoded.
        let dir = bag_dir("datasources", "oracle_password: czNjcjN0\n");
        let store = SecretStore::new(SecretBackend::Encrypted, dir.path());
        assert_eq!(
            store.lookup("datasources", "oracle_password").unwrap(),
            "s3cr3t"
        );
    }

    #[test]
    fn test_corrupt_envelope_is_decode_failure() {
        let dir = bag_dir("datasources", "oracle_password: '%%%not-base64%%%'\n");
        let store = SecretStore::new(SecretBackend::Encrypted, dir.path());
        let err = store.lookup("datasources", "oracle_password").unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Secret(SecretError::DecodeFailed { .. })
        ));
    }

    #[test]
    fn test_malformed_references_rejected() {
        let store = SecretStore::new(SecretBackend::Standard, "/nonexistent");
        for reference in ["secret://", "secret://bagonly", "secret:///key", "secret://bag/"] {
            let err = store.resolve(reference).unwrap_err();
            assert!(matches!(
                err,
                WildsyncError::Secret(SecretError::MalformedReference { .. })
            ));
        }
    }

    #[test]
    fn test_vault_env_name_mapping() {
        assert_eq!(
            vault_env_name("datasources", "oracle-password"),
            "WILDSYNC_VAULT_DATASOURCES_ORACLE_PASSWORD"
        );
    }

    #[test]
    fn test_vault_missing_variable_is_hard_error() {
        let store = SecretStore::new(SecretBackend::Vault, "/unused");
        let err = store.lookup("no_such_bag", "no_such_key").unwrap_err();
        assert!(matches!(
            err,
            WildsyncError::Secret(SecretError::MissingKey { .. })
        ));
    }
}
