//! The two operations offered to request handlers.

use crate::config::VaultConfig;
use crate::error::{ErrorKind, Result};
use crate::vault::store::SecretStore;
use std::sync::Arc;

/// Cloneable handle to one shared [`SecretStore`].
///
/// Build it once at startup and hand a clone to every handler. Errors are
/// reported as [`ErrorKind`], so decryption sub-reasons never leave the core.
#[derive(Debug, Clone)]
pub struct Vault {
    store: Arc<SecretStore>,
}

impl Vault {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        Ok(Self::from_store(SecretStore::new(config)?))
    }

    pub fn from_store(store: SecretStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Encrypt and keep `secret` for `account_id`.
    pub fn store(
        &self,
        account_id: &str,
        secret: &str,
        password: &str,
    ) -> std::result::Result<(), ErrorKind> {
        Ok(self.store.put(account_id, secret, password)?)
    }

    /// Return the secret for `account_id` if `password` opens it.
    pub fn retrieve(
        &self,
        account_id: &str,
        password: &str,
    ) -> std::result::Result<String, ErrorKind> {
        Ok(self.store.get(account_id, password)?)
    }

    /// Forget the secret for `account_id`.
    pub fn remove(&self, account_id: &str) -> bool {
        self.store.remove(account_id)
    }

    /// Number of accounts holding a secret.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vault() -> Vault {
        Vault::new(&VaultConfig::new("service-test-secret").with_iterations(1000)).unwrap()
    }

    #[test]
    fn test_store_retrieve() {
        let vault = test_vault();
        vault.store("alice", "key-1", "pw").unwrap();
        assert_eq!(vault.retrieve("alice", "pw").unwrap(), "key-1");
    }

    #[test]
    fn test_error_kinds() {
        let vault = test_vault();
        vault.store("alice", "key-1", "pw").unwrap();

        assert_eq!(vault.retrieve("bob", "pw"), Err(ErrorKind::NotFound));
        assert_eq!(vault.retrieve("alice", "nope"), Err(ErrorKind::Decryption));
        assert_eq!(vault.store("", "x", "pw"), Err(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_clones_share_state() {
        let vault = test_vault();
        let handler = vault.clone();

        handler.store("alice", "shared", "pw").unwrap();

        assert_eq!(vault.retrieve("alice", "pw").unwrap(), "shared");
        assert_eq!(vault.len(), 1);
        assert!(vault.remove("alice"));
        assert!(handler.is_empty());
    }
}
