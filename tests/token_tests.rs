//! Token-level tests: tamper sensitivity, freshness and wire format.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use crypto_vault::config::TOKEN_VERSION;
use crypto_vault::crypto::MIN_TOKEN_SIZE;
use crypto_vault::{Cipher, DecryptFailure, Token, VaultConfig};

fn test_cipher() -> Cipher {
    Cipher::new(&VaultConfig::new("token-test-secret").with_iterations(1_000))
        .expect("Failed to create cipher")
}

#[test]
fn test_every_single_bit_flip_is_rejected() {
    let cipher = test_cipher();
    let created = 1_700_000_000;
    let token = cipher
        .encrypt_at(b"sensitive-data", "password", created)
        .unwrap();
    let raw = URL_SAFE.decode(&token).unwrap();

    for byte in 0..raw.len() {
        for bit in 0..8 {
            let mut flipped = raw.clone();
            flipped[byte] ^= 1 << bit;
            let tampered = URL_SAFE.encode(&flipped);

            let result = cipher.decrypt_at(&tampered, "password", created);
            assert!(
                result.is_err(),
                "bit {} of byte {} flipped but decryption succeeded",
                bit,
                byte
            );
        }
    }
}

#[test]
fn test_every_bit_flip_of_encoded_text_is_rejected() {
    let cipher = test_cipher();
    let created = 1_700_000_000;
    let token = cipher
        .encrypt_at(b"sensitive-data", "password", created)
        .unwrap();
    let text = token.as_bytes();

    for index in 0..text.len() {
        for bit in 0..8 {
            let mut flipped = text.to_vec();
            flipped[index] ^= 1 << bit;

            // A flip that leaves UTF-8 cannot even be handed over as a token.
            let Ok(tampered) = String::from_utf8(flipped) else {
                continue;
            };

            let result = cipher.decrypt_at(&tampered, "password", created);
            assert!(
                result.is_err(),
                "bit {} of character {} flipped but decryption succeeded",
                bit,
                index
            );
        }
    }
}

#[test]
fn test_whitespace_around_token_is_malformed() {
    let cipher = test_cipher();
    let token = cipher.encrypt(b"data", "password").unwrap();

    let err = cipher
        .decrypt(&format!("{}\n", token), "password")
        .unwrap_err();
    assert_eq!(err.decrypt_failure(), Some(DecryptFailure::MalformedToken));
}

#[test]
fn test_body_tamper_reports_authentication_failure() {
    let cipher = test_cipher();
    let created = 1_700_000_000;
    let token = cipher.encrypt_at(b"data", "password", created).unwrap();
    let mut raw = URL_SAFE.decode(&token).unwrap();

    // Flip a bit in the salt, which is covered only by the tag.
    raw[10] ^= 0x01;
    let err = cipher
        .decrypt_at(&URL_SAFE.encode(&raw), "password", created)
        .unwrap_err();

    assert_eq!(
        err.decrypt_failure(),
        Some(DecryptFailure::AuthenticationFailed)
    );
}

#[test]
fn test_version_byte_is_checked() {
    let cipher = test_cipher();
    let token = cipher.encrypt(b"data", "password").unwrap();
    let mut raw = URL_SAFE.decode(&token).unwrap();
    raw[0] = 0x80;

    let err = cipher
        .decrypt(&URL_SAFE.encode(&raw), "password")
        .unwrap_err();
    assert_eq!(
        err.decrypt_failure(),
        Some(DecryptFailure::UnsupportedVersion)
    );
}

#[test]
fn test_truncated_token_is_malformed() {
    let cipher = test_cipher();
    let token = cipher.encrypt(b"data", "password").unwrap();
    let raw = URL_SAFE.decode(&token).unwrap();
    let truncated = URL_SAFE.encode(&raw[..MIN_TOKEN_SIZE - 1]);

    let err = cipher.decrypt(&truncated, "password").unwrap_err();
    assert_eq!(err.decrypt_failure(), Some(DecryptFailure::MalformedToken));

    let err = cipher.decrypt("%%%", "password").unwrap_err();
    assert_eq!(err.decrypt_failure(), Some(DecryptFailure::MalformedToken));
}

#[test]
fn test_token_from_the_future_is_rejected() {
    let cipher = test_cipher();
    let now = 1_700_000_000;
    let token = cipher.encrypt_at(b"data", "password", now + 3_600).unwrap();

    let err = cipher.decrypt_at(&token, "password", now).unwrap_err();
    assert_eq!(err.decrypt_failure(), Some(DecryptFailure::Expired));
}

#[test]
fn test_token_older_than_window_is_rejected() {
    let cipher = test_cipher();
    let created = 1_700_000_000;
    let token = cipher.encrypt_at(b"data", "password", created).unwrap();

    let max_age = cipher.max_age_secs().unwrap() as i64;
    assert!(cipher
        .decrypt_at(&token, "password", created + max_age)
        .is_ok());

    let err = cipher
        .decrypt_at(&token, "password", created + max_age + 1)
        .unwrap_err();
    assert_eq!(err.decrypt_failure(), Some(DecryptFailure::Expired));
}

#[test]
fn test_wire_format_header() {
    let cipher = test_cipher();
    let created = 1_700_000_000;
    let token = cipher.encrypt_at(b"hello", "password", created).unwrap();

    let parsed = Token::parse(&token).unwrap();
    assert_eq!(parsed.version(), TOKEN_VERSION);
    assert_eq!(parsed.created_at(), created as u64);
    assert_eq!(parsed.payload_len(), 5);

    let raw = URL_SAFE.decode(&token).unwrap();
    assert_eq!(raw.len(), MIN_TOKEN_SIZE + 5);
    assert_eq!(raw[0], TOKEN_VERSION);
}

#[test]
fn test_tokens_are_url_safe() {
    let cipher = test_cipher();
    for _ in 0..16 {
        let token = cipher.encrypt(b"some secret value", "password").unwrap();
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }
}
