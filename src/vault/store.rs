//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` ties the repository to the cipher so commands can work
//! with calls like `store.add_secret(&keys, &cancel, "github", b"p@ss1")`.
//! The master key is never stored here; each call borrows it from the
//! caller's [`MasterKeyStore`] for exactly one cipher operation.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::cipher::{decrypt_envelope, encrypt};
use crate::crypto::keys::MasterKeyStore;
use crate::errors::{MskError, Result};

use super::repository::{FileRepository, VaultRepository};
use super::secret::Secret;

/// The main vault handle.
pub struct VaultStore<R: VaultRepository = FileRepository> {
    repo: R,
}

impl VaultStore<FileRepository> {
    /// Open (creating if needed) the vault directory at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self::new(FileRepository::open(dir)?))
    }
}

impl<R: VaultRepository> VaultStore<R> {
    /// Wrap an existing repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Encrypt and store a new secret. Fails if the name is taken.
    pub fn add_secret(
        &self,
        keys: &MasterKeyStore,
        cancel: &CancellationToken,
        name: &str,
        password: &[u8],
    ) -> Result<()> {
        if self.repo.exists(cancel, name)? {
            return Err(MskError::AlreadyExists(name.to_string()));
        }

        let secret = Secret::new(name, password);
        let encrypted = keys.with_master_key(|mk| encrypt(mk, &secret))?;
        self.repo.save(cancel, name, &encrypted)?;

        info!(name, "added secret");
        Ok(())
    }

    /// Replace the password of an existing secret.
    ///
    /// The current file is decrypted first, so a wrong master key is
    /// rejected before anything is overwritten. The original creation time
    /// is kept; salt and nonce are fresh.
    pub fn update_secret(
        &self,
        keys: &MasterKeyStore,
        cancel: &CancellationToken,
        name: &str,
        password: &[u8],
    ) -> Result<()> {
        let current = self.get_record(keys, cancel, name)?;

        let secret = Secret::with_created_at(&current.name, password, current.created_at);
        let encrypted = keys.with_master_key(|mk| encrypt(mk, &secret))?;
        self.repo.save(cancel, name, &encrypted)?;

        info!(name, "updated secret");
        Ok(())
    }

    /// Delete a secret after proving the master key can open it.
    pub fn delete_secret(
        &self,
        keys: &MasterKeyStore,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<()> {
        // Decrypting proves the key; the record itself is wiped on drop.
        drop(self.get_record(keys, cancel, name)?);
        self.repo.delete(cancel, name)?;

        info!(name, "deleted secret");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Decrypt the full record for `name`.
    pub fn get_record(
        &self,
        keys: &MasterKeyStore,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<Secret> {
        let data = Zeroizing::new(self.repo.get(cancel, name)?);
        keys.with_master_key(|mk| decrypt_envelope(mk, &data))
    }

    /// Decrypt and return only the password for `name`.
    pub fn get_secret(
        &self,
        keys: &MasterKeyStore,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.get_record(keys, cancel, name)?.into_password())
    }

    /// Sorted names of all stored secrets.
    pub fn list_secrets(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.repo.list(cancel)
    }

    /// Whether a secret called `name` exists (case-insensitive).
    pub fn exists(&self, cancel: &CancellationToken, name: &str) -> Result<bool> {
        self.repo.exists(cancel, name)
    }
}
