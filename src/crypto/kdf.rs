//! Per-record key derivation using Argon2id.
//!
//! Every secret file carries its own random salt, and the encryption key
//! for that file is `Argon2id(master_key, salt)`. The cost parameters are
//! fixed: they are not recorded in the file header, so changing them would
//! make every existing vault file undecryptable.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{MskError, Result};

/// Length of the per-record salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Argon2id time cost (passes over memory).
pub const ARGON2_TIME_COST: u32 = 2;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id parallelism lanes.
pub const ARGON2_PARALLELISM: u32 = 4;

/// Derive the 32-byte encryption key for one record.
///
/// The same master key + salt always produce the same key, which is what
/// lets `decrypt` reproduce the key used at encryption time.
pub fn derive_key(master_key: &[u8], salt: &[u8]) -> Result<DerivedKey> {
    if master_key.is_empty() {
        return Err(MskError::InvalidMasterKey);
    }
    if salt.len() != SALT_LEN {
        return Err(MskError::InvalidSalt {
            expected: SALT_LEN,
            actual: salt.len(),
        });
    }

    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(KEY_LEN),
    )
    .map_err(|e| MskError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = DerivedKey::zeroed();
    argon2
        .hash_password_into(master_key, salt, key.as_mut_bytes())
        .map_err(|e| MskError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a fresh random 16-byte salt from the OS RNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
