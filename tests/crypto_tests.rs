//! Integration tests for the msk crypto module.

use chrono::{TimeZone, Utc};
use msk::crypto::kdf::SALT_LEN;
use msk::crypto::{decrypt, decrypt_envelope, derive_key, encrypt, generate_salt, MasterKeyStore};
use msk::errors::MskError;
use msk::vault::format::{self, HEADER_LEN, NONCE_LEN};
use msk::vault::Secret;

fn sample() -> Secret {
    let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    Secret::with_created_at("github", b"p@ss1", created)
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_key_is_deterministic() {
    let salt = [0x5Au8; SALT_LEN];
    let a = derive_key(b"master", &salt).unwrap();
    let b = derive_key(b"master", &salt).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_bytes().len(), 32);
}

#[test]
fn derive_key_depends_on_salt() {
    let a = derive_key(b"master", &[1u8; SALT_LEN]).unwrap();
    let b = derive_key(b"master", &[2u8; SALT_LEN]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn derive_key_depends_on_master_key() {
    let salt = generate_salt();
    let a = derive_key(b"master-a", &salt).unwrap();
    let b = derive_key(b"master-b", &salt).unwrap();
    assert_ne!(a, b);
}

#[test]
fn derive_key_validates_inputs() {
    assert!(matches!(
        derive_key(b"", &[0u8; SALT_LEN]),
        Err(MskError::InvalidMasterKey)
    ));
    assert!(matches!(
        derive_key(b"master", &[0u8; 12]),
        Err(MskError::InvalidSalt {
            expected: 16,
            actual: 12
        })
    ));
}

// ---------------------------------------------------------------------------
// Encrypt / decrypt
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let secret = sample();
    let enc = encrypt(b"master", &secret).unwrap();

    let dec = decrypt(b"master", &enc.salt, &enc.nonce, &enc.ciphertext).unwrap();
    assert_eq!(dec, secret);
    assert_eq!(dec.created_at, secret.created_at);
}

#[test]
fn encrypt_uses_fresh_salt_and_nonce() {
    let secret = sample();
    let a = encrypt(b"master", &secret).unwrap();
    let b = encrypt(b"master", &secret).unwrap();

    assert_ne!(a.salt, b.salt);
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn ciphertext_does_not_contain_plaintext() {
    let enc = encrypt(b"master", &sample()).unwrap();
    let haystack = &enc.ciphertext;
    assert!(!haystack.windows(5).any(|w| w == b"p@ss1"));
    assert!(!haystack.windows(6).any(|w| w == b"github"));
}

#[test]
fn wrong_master_key_is_rejected() {
    let enc = encrypt(b"key-a", &sample()).unwrap();
    let result = decrypt(b"key-b", &enc.salt, &enc.nonce, &enc.ciphertext);
    assert!(matches!(result, Err(MskError::DecryptionFailed)));
}

#[test]
fn any_flipped_ciphertext_byte_is_detected() {
    let enc = encrypt(b"master", &sample()).unwrap();

    // Each probe re-derives the key, so sample a spread of positions.
    let len = enc.ciphertext.len();
    for i in [0, 1, len / 2, len - 17, len - 16, len - 1] {
        let mut tampered = enc.ciphertext.clone();
        tampered[i] ^= 0x80;
        let result = decrypt(b"master", &enc.salt, &enc.nonce, &tampered);
        assert!(
            matches!(result, Err(MskError::DecryptionFailed)),
            "flip at byte {i} went unnoticed"
        );
    }
}

#[test]
fn flipped_header_bytes_in_file_are_detected() {
    let file = format::encode_envelope(&encrypt(b"master", &sample()).unwrap());
    assert_eq!(decrypt_envelope(b"master", &file).unwrap(), sample());

    // One salt byte, then every nonce byte (offsets 20..32).
    let nonce_start = HEADER_LEN - NONCE_LEN;
    for i in std::iter::once(4).chain(nonce_start..HEADER_LEN) {
        let mut tampered = file.clone();
        tampered[i] ^= 0x01;
        let result = decrypt_envelope(b"master", &tampered);
        assert!(
            matches!(result, Err(MskError::DecryptionFailed)),
            "flip at file offset {i} went unnoticed"
        );
    }
}

#[test]
fn tampered_salt_is_detected() {
    let enc = encrypt(b"master", &sample()).unwrap();
    let mut salt = enc.salt;
    salt[0] ^= 0x01;
    let result = decrypt(b"master", &salt, &enc.nonce, &enc.ciphertext);
    assert!(matches!(result, Err(MskError::DecryptionFailed)));
}

#[test]
fn truncated_ciphertext_is_detected() {
    let enc = encrypt(b"master", &sample()).unwrap();
    let short = &enc.ciphertext[..enc.ciphertext.len() - 1];
    let result = decrypt(b"master", &enc.salt, &enc.nonce, short);
    assert!(matches!(result, Err(MskError::DecryptionFailed)));
}

// ---------------------------------------------------------------------------
// Master key store
// ---------------------------------------------------------------------------

#[test]
fn master_key_store_scopes_access() {
    let keys = MasterKeyStore::new();
    keys.configure(b"master");

    let enc = keys.with_master_key(|mk| encrypt(mk, &sample())).unwrap();
    let dec = keys
        .with_master_key(|mk| decrypt(mk, &enc.salt, &enc.nonce, &enc.ciphertext))
        .unwrap();
    assert_eq!(dec.password, b"p@ss1");

    keys.destroy();
    keys.destroy();
    let after = keys.with_master_key(|mk| encrypt(mk, &sample()));
    assert!(matches!(after, Err(MskError::InvalidMasterKey)));
}
