//! Key derivation helpers using HKDF-SHA256.
//!
//! A message key is derived from the low-entropy PIN and the operator
//! salt.  HKDF (RFC 5869) runs both steps: `extract` with the operator
//! salt over the PIN, then `expand` with an empty `info` into a 128-bit
//! AES key.  The derivation is deterministic because the PIN is the only
//! secret available again at reveal time.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, SecretShareError};

/// Output size of SHA-256; the operator salt must be exactly this long.
pub const SALT_LEN: usize = 32;

/// Length of the derived message key (128 bits, for AES-128).
pub const KEY_LEN: usize = 16;

/// A 16-byte message key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MessageKey {
    bytes: [u8; KEY_LEN],
}

impl MessageKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MessageKey(<redacted>)")
    }
}

/// Derive a message key from `pass_text` and the operator `salt_text`.
///
/// Fails with `InvalidSaltLength` unless the salt is exactly
/// [`SALT_LEN`] bytes.
pub fn derive_key(pass_text: &str, salt_text: &str) -> Result<MessageKey> {
    if salt_text.len() != SALT_LEN {
        return Err(SecretShareError::InvalidSaltLength {
            expected: SALT_LEN,
            got: salt_text.len(),
        });
    }

    let hk = Hkdf::<Sha256>::new(Some(salt_text.as_bytes()), pass_text.as_bytes());

    let mut okm = [0u8; KEY_LEN];
    hk.expand(&[], &mut okm)
        .map_err(|e| SecretShareError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    let key = MessageKey::new(okm);
    okm.zeroize();
    Ok(key)
}

/// Content-addressed message id: hex SHA-256 of the ciphertext token.
pub fn content_id(ciphertext: &str) -> String {
    hex::encode(Sha256::digest(ciphertext.as_bytes()))
}
