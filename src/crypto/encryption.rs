//! AES-128-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  The result is hex-encoded so it can be
//! stored in text-only backends.  `decrypt` decodes the token and splits
//! the nonce back out before decrypting.
//!
//! Layout of the token before hex encoding:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes128Gcm, Nonce};
use zeroize::Zeroize;

use super::keys::MessageKey;
use crate::errors::{Result, SecretShareError};

/// Size of the AES-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, returning a hex token
/// (nonce || ciphertext).
pub fn encrypt(key: &MessageKey, plaintext: &str) -> Result<String> {
    let cipher = Aes128Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SecretShareError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes128Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| SecretShareError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(hex::encode(output))
}

/// Decrypt a token produced by `encrypt`.
///
/// Any malformed, truncated or tampered token fails with
/// `DecryptionFailed`; no partial plaintext is ever returned.
pub fn decrypt(key: &MessageKey, token: &str) -> Result<String> {
    let raw = hex::decode(token).map_err(|_| SecretShareError::DecryptionFailed)?;

    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(SecretShareError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes128Gcm::new_from_slice(key.as_bytes()).map_err(|_| SecretShareError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| SecretShareError::DecryptionFailed)?;

    // On error, wipe the bytes before discarding them.
    String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        SecretShareError::DecryptionFailed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> MessageKey {
        MessageKey::new([byte; 16])
    }

    #[test]
    fn token_is_hex_and_not_plaintext() {
        let token = encrypt(&key(1), "abc").unwrap();
        assert_ne!(token, "abc");
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
        // nonce + 3 bytes + tag, two hex chars each
        assert_eq!(token.len(), (NONCE_LEN + 3 + TAG_LEN) * 2);
    }

    #[test]
    fn decrypt_rejects_non_hex_token() {
        assert!(matches!(
            decrypt(&key(1), "zz-not-hex"),
            Err(SecretShareError::DecryptionFailed)
        ));
    }

    #[test]
    fn decrypt_rejects_token_shorter_than_nonce_and_tag() {
        let short = hex::encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(decrypt(&key(1), &short).is_err());
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let token = encrypt(&key(7), "").unwrap();
        assert_eq!(decrypt(&key(7), &token).unwrap(), "");
    }
}
