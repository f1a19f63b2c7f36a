//! Crypto Vault
//!
//! Minimal in-memory secret custody. A secret is encrypted under a key
//! derived from the caller's password and only the resulting token is kept,
//! keyed by account identifier. Retrieval re-derives the key and returns the
//! plaintext only if the token authenticates.
//!
//! # Features
//!
//! - **PBKDF2-HMAC-SHA256**: password key derivation with a deployment secret
//!   and a per-record random salt
//! - **AES-GCM tokens**: versioned, timestamped, authenticated, URL-safe base64
//! - **Freshness window**: configurable token max age, or unbounded
//! - **Concurrent store**: readers-writer lock around the map only
//!
//! # Architecture
//!
//! ```text
//! put: plaintext → PBKDF2 → AES-GCM → token → map[id]
//! get: map[id] → token → PBKDF2 → AES-GCM open → plaintext
//! ```
//!
//! # Example
//!
//! ```rust
//! use crypto_vault::{Vault, VaultConfig};
//!
//! let config = VaultConfig::new("deployment-secret").with_iterations(1_000);
//! let vault = Vault::new(&config).unwrap();
//!
//! vault.store("alice", "my private key", "hunter2").unwrap();
//! assert_eq!(vault.retrieve("alice", "hunter2").unwrap(), "my private key");
//! assert!(vault.retrieve("alice", "wrong").is_err());
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod vault;

pub use config::VaultConfig;
pub use crypto::{Cipher, Token};
pub use error::{DecryptFailure, Error, ErrorKind, Result};
pub use vault::{SecretStore, Vault};
