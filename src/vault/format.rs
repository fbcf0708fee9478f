//! Binary encodings for secret records and `.msk` vault files.
//!
//! A `.msk` file has this layout:
//!
//! ```text
//! [MSK: 3 bytes][version: 1 byte][salt: 16 bytes][nonce: 12 bytes][ciphertext + tag: N bytes]
//! ```
//!
//! - **Magic** (`MSK`): identifies the file as an MSK vault file.
//! - **Version**: format version (currently `1`).
//! - **Salt**: Argon2id salt for this record.
//! - **Nonce**: AES-256-GCM nonce for this record.
//! - **Ciphertext**: the sealed record, GCM tag included. Opaque here.
//!
//! The plaintext record sealed inside is:
//!
//! ```text
//! [name_len: u16 BE][name][password_len: u16 BE][password][created_at: i64 BE unix seconds]
//! ```
//!
//! The `created_at` trailer is always written but optional on read: a bare
//! `[name_len][name][password_len][password]` record decodes with
//! `created_at` set to the Unix epoch. Anything after the password other
//! than nothing or exactly one 8-byte timestamp is rejected.

use chrono::DateTime;
use zeroize::Zeroizing;

use super::secret::{EncryptedSecret, Secret};
use crate::errors::{MskError, Result};

pub use crate::crypto::kdf::SALT_LEN;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
pub const MAGIC: &[u8; 3] = b"MSK";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Length of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Fixed-size header: 3 (magic) + 1 (version) + 16 (salt) + 12 (nonce).
pub const HEADER_LEN: usize = MAGIC.len() + 1 + SALT_LEN + NONCE_LEN;

/// Extension of vault files, without the dot.
pub const FILE_EXTENSION: &str = "msk";

/// Width of each length prefix in the plaintext record.
const LEN_PREFIX: usize = 2;

/// Width of the trailing timestamp in the plaintext record.
const TIMESTAMP_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Plaintext record
// ---------------------------------------------------------------------------

/// Serialize a secret into its plaintext record bytes.
///
/// The returned buffer is wiped on drop. Fails with `RecordTooLarge` if the
/// name or password does not fit a 16-bit length prefix.
pub fn encode_secret(secret: &Secret) -> Result<Zeroizing<Vec<u8>>> {
    let name = secret.name.as_bytes();
    let name_len = u16::try_from(name.len()).map_err(|_| {
        MskError::RecordTooLarge(format!("name is {} bytes, max {}", name.len(), u16::MAX))
    })?;
    let password_len = u16::try_from(secret.password.len()).map_err(|_| {
        MskError::RecordTooLarge(format!(
            "password is {} bytes, max {}",
            secret.password.len(),
            u16::MAX
        ))
    })?;

    let total = LEN_PREFIX + name.len() + LEN_PREFIX + secret.password.len() + TIMESTAMP_LEN;
    let mut buf = Zeroizing::new(Vec::with_capacity(total));

    buf.extend_from_slice(&name_len.to_be_bytes());
    buf.extend_from_slice(name);
    buf.extend_from_slice(&password_len.to_be_bytes());
    buf.extend_from_slice(&secret.password);
    buf.extend_from_slice(&secret.created_at.timestamp().to_be_bytes());

    Ok(buf)
}

/// Parse plaintext record bytes back into a secret.
///
/// Fails with `CorruptedFile` if a declared length runs past the end of
/// the buffer, the name is not UTF-8, or the bytes after the password are
/// not a single timestamp.
pub fn decode_secret(data: &[u8]) -> Result<Secret> {
    let mut reader = Reader::new(data);

    let name_len = usize::from(u16::from_be_bytes(reader.take_array("name length")?));
    let name = std::str::from_utf8(reader.take(name_len, "name")?)
        .map_err(|_| MskError::CorruptedFile("secret name is not valid UTF-8".into()))?;

    let password_len = usize::from(u16::from_be_bytes(reader.take_array("password length")?));
    let password = reader.take(password_len, "password")?;

    let created_at = match reader.remaining() {
        0 => DateTime::UNIX_EPOCH,
        TIMESTAMP_LEN => {
            let created_secs = i64::from_be_bytes(reader.take_array("timestamp")?);
            DateTime::from_timestamp(created_secs, 0).ok_or_else(|| {
                MskError::CorruptedFile(format!("timestamp {created_secs} out of range"))
            })?
        }
        n => {
            return Err(MskError::CorruptedFile(format!(
                "{n} unexpected trailing bytes in record"
            )))
        }
    };

    Ok(Secret::with_created_at(name, password, created_at))
}

// ---------------------------------------------------------------------------
// File envelope
// ---------------------------------------------------------------------------

/// Wrap an encrypted secret into the on-disk file bytes.
///
/// The ciphertext is copied as-is; it is never inspected here.
pub fn encode_envelope(secret: &EncryptedSecret) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + secret.ciphertext.len());

    buf.extend_from_slice(MAGIC); // 3 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&secret.salt); // 16 bytes
    buf.extend_from_slice(&secret.nonce); // 12 bytes
    buf.extend_from_slice(&secret.ciphertext); // rest

    buf
}

/// Split on-disk file bytes back into salt, nonce and ciphertext.
///
/// Fails with `CorruptedFile` if the buffer is shorter than the header or
/// the magic is wrong, and with `UnsupportedFileVersion` on an unknown
/// version byte.
pub fn decode_envelope(data: &[u8]) -> Result<EncryptedSecret> {
    if data.len() < HEADER_LEN {
        return Err(MskError::CorruptedFile(format!(
            "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
            data.len()
        )));
    }

    let mut reader = Reader::new(data);

    let magic: [u8; 3] = reader.take_array("magic")?;
    if &magic != MAGIC {
        return Err(MskError::CorruptedFile("missing MSK magic bytes".into()));
    }

    let [version]: [u8; 1] = reader.take_array("version")?;
    if version != CURRENT_VERSION {
        return Err(MskError::UnsupportedFileVersion(version));
    }

    let salt = reader.take_array("salt")?;
    let nonce = reader.take_array("nonce")?;
    let ciphertext = reader.rest().to_vec();

    Ok(EncryptedSecret {
        salt,
        nonce,
        ciphertext,
    })
}

// ---------------------------------------------------------------------------
// Bounds-checked cursor
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                MskError::CorruptedFile(format!("{field} runs past the end of the data"))
            })?;

        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N]> {
        let slice = self.take(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.offset..];
        self.offset = self.data.len();
        slice
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}
