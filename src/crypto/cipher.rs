//! AES-256-GCM authenticated encryption of secret records.
//!
//! `encrypt` turns a plaintext [`Secret`] into an [`EncryptedSecret`]:
//!
//! 1. fresh random salt (16 bytes) and nonce (12 bytes),
//! 2. key = Argon2id(master_key, salt),
//! 3. record = binary encoding of the secret,
//! 4. ciphertext = AES-256-GCM seal(key, nonce, record), no associated data.
//!
//! `decrypt` runs the same steps backwards. GCM authentication is the only
//! check that the master key is right: a wrong key and a tampered file both
//! surface as `DecryptionFailed`.
//!
//! The derived key and the serialized record are zero-on-drop buffers, so
//! they are wiped on every return path, including errors.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::kdf::{derive_key, generate_salt};
use super::keys::DerivedKey;
use crate::errors::{MskError, Result};
use crate::vault::format::{self, NONCE_LEN};
use crate::vault::secret::{EncryptedSecret, Secret};

/// Encrypt `secret` under a key derived from `master_key`.
pub fn encrypt(master_key: &[u8], secret: &Secret) -> Result<EncryptedSecret> {
    let salt = generate_salt();
    let nonce = generate_nonce();

    let key = derive_key(master_key, &salt)?;
    let record = format::encode_secret(secret)?;
    let ciphertext = seal(&key, &nonce, &record)?;

    Ok(EncryptedSecret {
        salt,
        nonce,
        ciphertext,
    })
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// Fails with `InvalidSalt` or `CorruptedFile` if the salt or nonce have the
/// wrong length, and with `DecryptionFailed` if authentication fails.
pub fn decrypt(master_key: &[u8], salt: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Secret> {
    let nonce: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| {
        MskError::CorruptedFile(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        ))
    })?;

    let key = derive_key(master_key, salt)?;
    let record = open(&key, nonce, ciphertext)?;
    format::decode_secret(&record)
}

/// Decode a raw vault file and decrypt the secret inside it.
pub fn decrypt_envelope(master_key: &[u8], data: &[u8]) -> Result<Secret> {
    let envelope = format::decode_envelope(data)?;
    decrypt(
        master_key,
        &envelope.salt,
        &envelope.nonce,
        &envelope.ciphertext,
    )
}

/// Seal `plaintext` with AES-256-GCM. The output includes the 16-byte tag.
fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| MskError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| MskError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Open an AES-256-GCM ciphertext, verifying its tag.
fn open(key: &DerivedKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| MskError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| MskError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Generate a fresh random 12-byte GCM nonce from the OS RNG.
fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
