//! Cryptographic primitives for MSK.
//!
//! This module provides:
//! - Argon2id key derivation from the master key and a per-record salt (`kdf`)
//! - AES-256-GCM sealing and opening of secret records (`cipher`)
//! - The master key store and zero-on-drop key buffers (`keys`)

pub mod cipher;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, MasterKeyStore};
pub use cipher::{decrypt, decrypt_envelope, encrypt};
pub use kdf::{derive_key, generate_salt};
pub use keys::{DerivedKey, MasterKeyStore};
