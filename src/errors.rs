use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in MSK.
#[derive(Debug, Error)]
pub enum MskError {
    // --- Key derivation errors ---
    #[error("Invalid master key — it must not be empty")]
    InvalidMasterKey,

    #[error("Invalid salt — expected exactly {expected} bytes, got {actual}")]
    InvalidSalt { expected: usize, actual: usize },

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Cipher errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong master password or corrupted data")]
    DecryptionFailed,

    // --- File format errors ---
    #[error("Corrupted vault file: {0}")]
    CorruptedFile(String),

    #[error("Unsupported vault file version {0}")]
    UnsupportedFileVersion(u8),

    #[error("Secret record too large: {0}")]
    RecordTooLarge(String),

    // --- Repository errors ---
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Secret '{0}' already exists (use `update` to change it)")]
    AlreadyExists(String),

    #[error("Not a secret file: {0}")]
    InvalidVaultEntry(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Password mismatch — passwords do not match")]
    PasswordMismatch,

    #[error("Clipboard error: {0}")]
    ClipboardError(String),
}

/// Convenience type alias for MSK results.
pub type Result<T> = std::result::Result<T, MskError>;
