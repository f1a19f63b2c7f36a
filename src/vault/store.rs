//! Concurrency-safe map from account identifier to encrypted token.

use crate::config::VaultConfig;
use crate::crypto::Cipher;
use crate::error::{DecryptFailure, Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

/// In-memory secret store.
///
/// The lock guards only the map. Key derivation, encryption and decryption
/// always run with the lock released.
#[derive(Debug)]
pub struct SecretStore {
    cipher: Cipher,
    /// account id → token
    records: RwLock<HashMap<String, String>>,
}

impl SecretStore {
    /// Create an empty store from a configuration.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        Ok(Self::with_cipher(Cipher::new(config)?))
    }

    /// Create an empty store around an existing cipher.
    pub fn with_cipher(cipher: Cipher) -> Self {
        Self {
            cipher,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Encrypt `plaintext` and insert or overwrite the record for `id`.
    pub fn put(&self, id: &str, plaintext: &str, password: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidAccountId);
        }

        let token = self
            .cipher
            .encrypt(plaintext.as_bytes(), password)
            .map_err(|e| {
                warn!(account = id, error = %e, "encryption failed");
                e
            })?;

        let replaced = self.records.write().insert(id.to_string(), token).is_some();
        debug!(account = id, replaced, "secret stored");
        Ok(())
    }

    /// Look up the record for `id` and decrypt it with `password`.
    pub fn get(&self, id: &str, password: &str) -> Result<String> {
        let token = self
            .records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let plaintext = self.cipher.decrypt(&token, password).map_err(|e| {
            if let Some(reason) = e.decrypt_failure() {
                debug!(account = id, reason = reason.as_str(), "decryption rejected");
            }
            e
        })?;

        String::from_utf8(plaintext).map_err(|_| Error::Decryption(DecryptFailure::MalformedToken))
    }

    /// Drop the record for `id`. Returns whether one existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.records.write().remove(id).is_some();
        if removed {
            debug!(account = id, "secret removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// The raw token stored for `id`, if any.
    pub fn token(&self, id: &str) -> Option<String> {
        self.records.read().get(id).cloned()
    }
}
