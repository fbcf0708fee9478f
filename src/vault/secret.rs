//! Secret and EncryptedSecret types.
//!
//! A `Secret` is the plaintext record: it only exists in memory while a
//! command is running and wipes its name and password when dropped. An
//! `EncryptedSecret` is what actually reaches the disk.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::format::{NONCE_LEN, SALT_LEN};

/// A plaintext password record.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    /// The name the secret was added under (e.g. "github").
    pub name: String,

    /// The password bytes.
    pub password: Vec<u8>,

    /// When this secret was first added, at whole-second precision.
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
}

impl Secret {
    /// Build a new record stamped with the current time.
    pub fn new(name: &str, password: &[u8]) -> Self {
        Self::with_created_at(name, password, Utc::now())
    }

    /// Build a record with an explicit creation time.
    ///
    /// Sub-second precision is dropped because the on-disk record stores
    /// whole seconds.
    pub fn with_created_at(name: &str, password: &[u8], created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            password: password.to_vec(),
            created_at: created_at.trunc_subsecs(0),
        }
    }

    /// Consume the record and hand back only the password.
    pub fn into_password(mut self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(std::mem::take(&mut self.password))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// An encrypted secret as produced by the cipher.
///
/// `ciphertext` is the AES-256-GCM output over the encoded [`Secret`],
/// including the authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}
