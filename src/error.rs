//! Error types for the crypto vault.

use thiserror::Error;

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a token failed to decrypt.
///
/// Kept for diagnostics only. The `Display` of [`Error::Decryption`] is the
/// same for every reason, and the transport-facing [`ErrorKind`] collapses
/// them into one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// Not valid base64, or too short to hold a header and tag.
    MalformedToken,
    /// Version byte is not one this build understands.
    UnsupportedVersion,
    /// Created too far in the future, or older than the freshness window.
    Expired,
    /// Tag mismatch: wrong password or tampered token.
    AuthenticationFailed,
}

impl DecryptFailure {
    /// Short machine-friendly name, safe to log.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecryptFailure::MalformedToken => "malformed_token",
            DecryptFailure::UnsupportedVersion => "unsupported_version",
            DecryptFailure::Expired => "expired",
            DecryptFailure::AuthenticationFailed => "authentication_failed",
        }
    }
}

/// Errors that can occur in vault operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encryption error (internal fault).
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Decryption error (wrong password, corrupted or expired token).
    #[error("Decryption failed: wrong password or corrupted data")]
    Decryption(DecryptFailure),

    /// No record stored for the account.
    #[error("No secret stored for account: {0}")]
    NotFound(String),

    /// Account identifiers must be non-empty.
    #[error("Invalid account identifier: must not be empty")]
    InvalidAccountId,

    /// Rejected configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// The decryption sub-reason, if this is a decryption failure.
    pub fn decrypt_failure(&self) -> Option<DecryptFailure> {
        match self {
            Error::Decryption(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Coarse classification for callers at the transport boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decryption(_) => ErrorKind::Decryption,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidAccountId | Error::InvalidConfig(_) => ErrorKind::InvalidInput,
            Error::Io(_)
            | Error::Encryption(_)
            | Error::KeyDerivation(_)
            | Error::Serialization(_) => ErrorKind::Encryption,
        }
    }
}

/// What an external caller is allowed to learn about a failure.
///
/// A transport adapter maps these to its own status codes, e.g. 500, 404,
/// 401 and 400 for HTTP.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server-side cryptographic fault.
    #[error("encryption failed")]
    Encryption,

    /// Nothing stored under the identifier.
    #[error("no such account")]
    NotFound,

    /// Any decryption failure, reason withheld.
    #[error("decryption failed")]
    Decryption,

    /// Caller supplied an unusable argument.
    #[error("invalid input")]
    InvalidInput,
}

impl From<Error> for ErrorKind {
    fn from(e: Error) -> Self {
        e.kind()
    }
}
