//! In-memory lifecycle of the master key and the keys derived from it.
//!
//! The master key lives in exactly one place, a [`MasterKeyStore`], and is
//! only ever lent out for the duration of a single closure call. Derived
//! keys are [`DerivedKey`] values that wipe themselves on drop, so every
//! early return or `?` in the cipher path still clears them.
//!
//! Zeroing goes through the `zeroize` crate, whose volatile writes cannot
//! be removed by dead-store elimination.

use std::fmt;

use parking_lot::RwLock;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{MskError, Result};

/// Length of a derived encryption key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte key derived from the master key and a salt.
///
/// The bytes are zeroed when the value is dropped.
pub struct DerivedKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl DerivedKey {
    /// An all-zero key buffer, ready to be filled by the KDF.
    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: Zeroizing::new([0u8; KEY_LEN]),
        }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Access the raw key bytes (e.g. to build an AES-256-GCM cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_slice().ct_eq(other.bytes.as_slice()).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Owner of the session's master key.
///
/// Readers share the key through a read lock; `configure` and `destroy`
/// take the write lock, so a reader observes either the old key or the
/// new one, never a mix. The stored copy is wiped on replacement, on
/// `destroy`, and (as a backstop) when the store itself is dropped.
#[derive(Default)]
pub struct MasterKeyStore {
    inner: RwLock<Option<Zeroizing<Vec<u8>>>>,
}

impl MasterKeyStore {
    /// Create an empty store with no key configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a private copy of `bytes` as the master key.
    ///
    /// Any previously configured key is zeroed and replaced. The caller's
    /// buffer is not retained and may be wiped as soon as this returns.
    pub fn configure(&self, bytes: &[u8]) {
        let fresh = Zeroizing::new(bytes.to_vec());
        let previous = self.inner.write().replace(fresh);
        // `previous` is zeroed here, after the write lock is released.
        drop(previous);
    }

    /// Run `f` with a read-only view of the master key.
    ///
    /// Fails with `InvalidMasterKey` if no key is configured.
    pub fn with_master_key<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let guard = self.inner.read();
        match guard.as_ref() {
            Some(key) => f(key.as_slice()),
            None => Err(MskError::InvalidMasterKey),
        }
    }

    /// Zero and release the stored master key.
    ///
    /// Calling this on an empty store is a no-op.
    pub fn destroy(&self) {
        if let Some(mut key) = self.inner.write().take() {
            key.zeroize();
        }
    }

    /// Returns `true` if a master key is currently held.
    pub fn is_configured(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl fmt::Debug for MasterKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKeyStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}
