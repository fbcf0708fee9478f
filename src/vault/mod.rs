//! Vault module — encrypted secret storage.
//!
//! This module provides:
//! - `Secret` and `EncryptedSecret` types (`secret`)
//! - The binary record and `.msk` envelope codec (`format`)
//! - Atomic one-file-per-secret persistence (`repository`)
//! - High-level `VaultStore` orchestrating crypto and storage (`store`)

pub mod format;
pub mod repository;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use repository::{FileRepository, VaultRepository};
pub use secret::{EncryptedSecret, Secret};
pub use store::VaultStore;
