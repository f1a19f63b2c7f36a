//! PBKDF2-HMAC-SHA256 key derivation for password-based encryption.

use crate::config::{VaultConfig, SALT_SIZE};
use crate::error::{Error, Result};
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

/// Derive `key_length` bytes from a password with PBKDF2-HMAC-SHA256.
///
/// Deterministic: the same password, salt and iteration count always give
/// the same key.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut key = Zeroizing::new(vec![0u8; key_length]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, key.as_mut_slice())
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Generate a random per-record salt.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Key derivation bound to one deployment's secret and parameters.
#[derive(Clone)]
pub struct KeyDerivation {
    secret: Zeroizing<Vec<u8>>,
    iterations: u32,
    key_length: usize,
}

impl fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDerivation")
            .field("secret", &"[REDACTED]")
            .field("iterations", &self.iterations)
            .field("key_length", &self.key_length)
            .finish()
    }
}

impl KeyDerivation {
    /// Create a KDF from a validated configuration.
    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            secret: Zeroizing::new(config.derivation_secret.as_bytes().to_vec()),
            iterations: config.iterations,
            key_length: config.key_length,
        }
    }

    /// Derive the key for one record.
    ///
    /// The PBKDF2 salt is the deployment secret followed by the record salt.
    pub fn derive_key(
        &self,
        password: &str,
        record_salt: &[u8; SALT_SIZE],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let mut salt = Zeroizing::new(Vec::with_capacity(self.secret.len() + SALT_SIZE));
        salt.extend_from_slice(&self.secret);
        salt.extend_from_slice(record_salt);

        derive_key(
            password.as_bytes(),
            &salt,
            self.iterations,
            self.key_length,
        )
    }
}
