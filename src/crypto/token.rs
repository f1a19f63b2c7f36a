//! Token wire format.
//!
//! ```text
//! version (1) | created_at (8, BE unix secs) | salt (16) | nonce (12) | ciphertext | tag (16)
//! ```
//!
//! The whole byte string is URL-safe base64 encoded. The header (everything
//! before the ciphertext) is bound to the tag as AEAD associated data.

use crate::config::{
    MAX_CLOCK_SKEW_SECS, NONCE_SIZE, SALT_SIZE, TAG_SIZE, TIMESTAMP_SIZE, TOKEN_VERSION,
};
use crate::error::DecryptFailure;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, Utc};

/// Length of the authenticated header.
pub const HEADER_SIZE: usize = 1 + TIMESTAMP_SIZE + SALT_SIZE + NONCE_SIZE;

/// Smallest decodable token: header plus tag, empty payload.
pub const MIN_TOKEN_SIZE: usize = HEADER_SIZE + TAG_SIZE;

/// A parsed (not yet verified) token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    version: u8,
    created_at: u64,
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the tag appended.
    sealed: Vec<u8>,
}

impl Token {
    /// Assemble a current-version token from its parts.
    pub fn new(
        created_at: u64,
        salt: [u8; SALT_SIZE],
        nonce: [u8; NONCE_SIZE],
        sealed: Vec<u8>,
    ) -> Self {
        Self {
            version: TOKEN_VERSION,
            created_at,
            salt,
            nonce,
            sealed,
        }
    }

    /// Decode and split a token. Does not check freshness or authenticity.
    ///
    /// The input must be exactly what [`Token::encode`] produced; surrounding
    /// whitespace is rejected.
    pub fn parse(encoded: &str) -> Result<Self, DecryptFailure> {
        let raw = URL_SAFE
            .decode(encoded)
            .map_err(|_| DecryptFailure::MalformedToken)?;

        match raw.first() {
            None => return Err(DecryptFailure::MalformedToken),
            Some(&TOKEN_VERSION) => {}
            Some(_) => return Err(DecryptFailure::UnsupportedVersion),
        }
        if raw.len() < MIN_TOKEN_SIZE {
            return Err(DecryptFailure::MalformedToken);
        }

        let mut offset = 1;
        let mut timestamp = [0u8; TIMESTAMP_SIZE];
        timestamp.copy_from_slice(&raw[offset..offset + TIMESTAMP_SIZE]);
        offset += TIMESTAMP_SIZE;

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&raw[offset..offset + SALT_SIZE]);
        offset += SALT_SIZE;

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&raw[offset..offset + NONCE_SIZE]);
        offset += NONCE_SIZE;

        Ok(Self {
            version: raw[0],
            created_at: u64::from_be_bytes(timestamp),
            salt,
            nonce,
            sealed: raw[offset..].to_vec(),
        })
    }

    /// Serialize to URL-safe base64.
    pub fn encode(&self) -> String {
        let mut raw = self.header_bytes();
        raw.extend_from_slice(&self.sealed);
        URL_SAFE.encode(raw)
    }

    /// The associated data covered by the tag.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(HEADER_SIZE + self.sealed.len());
        header.push(self.version);
        header.extend_from_slice(&self.created_at.to_be_bytes());
        header.extend_from_slice(&self.salt);
        header.extend_from_slice(&self.nonce);
        header
    }

    /// Reject tokens from the future (beyond skew) or older than `max_age_secs`.
    pub fn check_freshness(
        &self,
        now: i64,
        max_age_secs: Option<u64>,
    ) -> Result<(), DecryptFailure> {
        let created = i128::from(self.created_at);
        let now = i128::from(now);

        if created > now + i128::from(MAX_CLOCK_SKEW_SECS) {
            return Err(DecryptFailure::Expired);
        }
        if let Some(max_age) = max_age_secs {
            if now - created > i128::from(max_age) {
                return Err(DecryptFailure::Expired);
            }
        }
        Ok(())
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Creation time in unix seconds.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Creation time as a UTC datetime, if representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.created_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    /// Encrypted payload length, excluding the tag.
    pub fn payload_len(&self) -> usize {
        self.sealed.len().saturating_sub(TAG_SIZE)
    }
}
