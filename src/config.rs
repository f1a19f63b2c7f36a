//! Configuration constants and types for the crypto vault.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Current token format version.
pub const TOKEN_VERSION: u8 = 0x01;

/// Nonce size for AES-GCM (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Per-record salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Creation timestamp width in bytes (big-endian unix seconds).
pub const TIMESTAMP_SIZE: usize = 8;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 390_000;

/// Default derived key length (AES-256).
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Default token freshness window (one hour).
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// How far in the future a token timestamp may be before it is rejected.
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Shortest accepted derivation secret.
pub const MIN_DERIVATION_SECRET_LEN: usize = 8;

/// Key lengths the cipher accepts (AES-128 and AES-256).
pub const SUPPORTED_KEY_LENGTHS: [usize; 2] = [16, 32];

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_key_length() -> usize {
    DEFAULT_KEY_LENGTH
}

fn default_max_age() -> Option<u64> {
    Some(DEFAULT_MAX_AGE_SECS)
}

/// Deployment configuration for the cipher engine.
///
/// There is deliberately no `Default`: the derivation secret has to come
/// from the deployment.
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Application-wide derivation secret mixed into every PBKDF2 salt.
    pub derivation_secret: String,

    /// PBKDF2 iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Derived key length in bytes (16 or 32).
    #[serde(default = "default_key_length")]
    pub key_length: usize,

    /// Token freshness window in seconds. `None` means unbounded.
    #[serde(default = "default_max_age")]
    pub max_age_secs: Option<u64>,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("derivation_secret", &"[REDACTED]")
            .field("iterations", &self.iterations)
            .field("key_length", &self.key_length)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl VaultConfig {
    /// Create a configuration with the given secret and default parameters.
    pub fn new(derivation_secret: impl Into<String>) -> Self {
        Self {
            derivation_secret: derivation_secret.into(),
            iterations: DEFAULT_ITERATIONS,
            key_length: DEFAULT_KEY_LENGTH,
            max_age_secs: default_max_age(),
        }
    }

    /// Set the PBKDF2 iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the derived key length in bytes.
    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    /// Set the freshness window; `None` disables expiry.
    pub fn with_max_age(mut self, max_age_secs: Option<u64>) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.derivation_secret.len() < MIN_DERIVATION_SECRET_LEN {
            return Err(Error::InvalidConfig(format!(
                "derivation secret must be at least {} bytes",
                MIN_DERIVATION_SECRET_LEN
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "iteration count must be greater than 0".to_string(),
            ));
        }
        if !SUPPORTED_KEY_LENGTHS.contains(&self.key_length) {
            return Err(Error::InvalidConfig(format!(
                "key length must be one of {:?} bytes, got {}",
                SUPPORTED_KEY_LENGTHS, self.key_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_uses_defaults() {
        let config = VaultConfig::new("deployment-secret");
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.key_length, DEFAULT_KEY_LENGTH);
        assert_eq!(config.max_age_secs, Some(DEFAULT_MAX_AGE_SECS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let config = VaultConfig::new("short");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = VaultConfig::new("deployment-secret").with_iterations(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_unsupported_key_length() {
        let config = VaultConfig::new("deployment-secret").with_key_length(24);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = VaultConfig::new("deployment-secret").with_key_length(16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = VaultConfig::new("do-not-print-me");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("do-not-print-me"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"derivation_secret": "from-a-file-1234"}}"#).unwrap();

        let config = VaultConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.derivation_secret, "from-a-file-1234");
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.max_age_secs, Some(DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn test_from_json_file_null_max_age_is_unbounded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"derivation_secret": "from-a-file-1234", "iterations": 1000, "max_age_secs": null}}"#
        )
        .unwrap();

        let config = VaultConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.max_age_secs, None);
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"derivation_secret": "tiny"}}"#).unwrap();

        assert!(matches!(
            VaultConfig::from_json_file(file.path()),
            Err(Error::InvalidConfig(_))
        ));
    }
}
