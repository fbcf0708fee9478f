//! Random password generation for `add --generate` / `update --generate`.

use rand::Rng;
use zeroize::Zeroizing;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Length used when zero is requested.
pub const DEFAULT_LENGTH: usize = 16;

/// Generate a random password of `length` characters.
///
/// Characters are drawn uniformly from letters and digits, plus symbols
/// when `symbols` is set. A `length` of zero falls back to
/// [`DEFAULT_LENGTH`].
pub fn generate_password(length: usize, symbols: bool) -> Zeroizing<Vec<u8>> {
    let length = if length == 0 { DEFAULT_LENGTH } else { length };

    let mut charset = ALPHANUMERIC.to_vec();
    if symbols {
        charset.extend_from_slice(SYMBOLS);
    }

    let mut rng = rand::rng();
    let password = (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())])
        .collect();

    Zeroizing::new(password)
}
