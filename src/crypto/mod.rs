//! Cryptographic operations for the crypto vault.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 password-based key derivation
//! - AES-GCM authenticated encryption into versioned, timestamped tokens

mod cipher;
mod kdf;
mod token;

pub use cipher::Cipher;
pub use kdf::{derive_key, generate_salt, KeyDerivation};
pub use token::{Token, HEADER_SIZE, MIN_TOKEN_SIZE};
