//! AES-GCM authenticated encryption of password-protected tokens.

use crate::config::{VaultConfig, NONCE_SIZE};
use crate::crypto::kdf::{generate_salt, KeyDerivation};
use crate::crypto::token::Token;
use crate::error::{DecryptFailure, Error, Result};
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use chrono::Utc;
use rand::RngCore;

/// AES-GCM keyed for one call. Variant follows the derived key length.
enum AeadKey {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

impl AeadKey {
    fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(AeadKey::Aes128)
                .map_err(|e| Error::Encryption(e.to_string())),
            32 => Aes256Gcm::new_from_slice(key)
                .map(AeadKey::Aes256)
                .map_err(|e| Error::Encryption(e.to_string())),
            n => Err(Error::Encryption(format!(
                "unsupported key length: {} bytes",
                n
            ))),
        }
    }

    fn seal(
        &self,
        nonce: &[u8; NONCE_SIZE],
        aad: &[u8],
        plaintext: &[u8],
    ) -> std::result::Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::from_slice(nonce);
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        match self {
            AeadKey::Aes128(c) => c.encrypt(nonce, payload),
            AeadKey::Aes256(c) => c.encrypt(nonce, payload),
        }
    }

    fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        aad: &[u8],
        sealed: &[u8],
    ) -> std::result::Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::from_slice(nonce);
        let payload = Payload { msg: sealed, aad };
        match self {
            AeadKey::Aes128(c) => c.decrypt(nonce, payload),
            AeadKey::Aes256(c) => c.decrypt(nonce, payload),
        }
    }
}

/// Password-based token cipher.
///
/// Holds only configuration; every call derives its own key and drops it
/// (zeroized) before returning, so one `Cipher` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Cipher {
    kdf: KeyDerivation,
    max_age_secs: Option<u64>,
}

impl Cipher {
    /// Create a cipher from a configuration, validating it first.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            kdf: KeyDerivation::from_config(config),
            max_age_secs: config.max_age_secs,
        })
    }

    /// Freshness window applied on decryption.
    pub fn max_age_secs(&self) -> Option<u64> {
        self.max_age_secs
    }

    /// Encrypt `plaintext` under `password`, returning an encoded token.
    pub fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<String> {
        self.encrypt_at(plaintext, password, Utc::now().timestamp())
    }

    /// Encrypt with an explicit creation time (unix seconds).
    pub fn encrypt_at(&self, plaintext: &[u8], password: &str, now: i64) -> Result<String> {
        let created_at = u64::try_from(now)
            .map_err(|_| Error::Encryption("clock is before the unix epoch".to_string()))?;

        let salt = generate_salt();
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let key = self.kdf.derive_key(password, &salt)?;
        let aead = AeadKey::new(&key)?;

        let header = Token::new(created_at, salt, nonce, Vec::new()).header_bytes();
        let sealed = aead
            .seal(&nonce, &header, plaintext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        Ok(Token::new(created_at, salt, nonce, sealed).encode())
    }

    /// Decrypt a token with `password`, enforcing the freshness window.
    pub fn decrypt(&self, token: &str, password: &str) -> Result<Vec<u8>> {
        self.decrypt_at(token, password, Utc::now().timestamp())
    }

    /// Decrypt as if the current time were `now` (unix seconds).
    pub fn decrypt_at(&self, token: &str, password: &str, now: i64) -> Result<Vec<u8>> {
        let token = Token::parse(token).map_err(Error::Decryption)?;
        token
            .check_freshness(now, self.max_age_secs)
            .map_err(Error::Decryption)?;

        let key = self.kdf.derive_key(password, token.salt())?;
        let aead = AeadKey::new(&key)?;

        // GCM compares tags in constant time.
        aead.open(token.nonce(), &token.header_bytes(), token.sealed())
            .map_err(|_| Error::Decryption(DecryptFailure::AuthenticationFailed))
    }
}
