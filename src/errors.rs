use thiserror::Error;

use crate::store::RepositoryError;

/// All errors that can occur in SecretShare.
#[derive(Debug, Error)]
pub enum SecretShareError {
    // --- Lifecycle outcomes ---
    #[error("Message not found")]
    NotFound,

    #[error("Wrong PIN")]
    WrongPin,

    // --- Crypto errors ---
    #[error("Invalid salt length: must be {expected} bytes, got {got}")]
    InvalidSaltLength { expected: usize, got: usize },

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Corrupt PIN hash format: {0}")]
    CorruptHashFormat(String),

    #[error("Invalid credential")]
    InvalidCredential,

    // --- Storage errors ---
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    // --- Input errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl SecretShareError {
    /// Transient storage failures the caller may retry.
    ///
    /// The lifecycle itself never retries these, so a retried reveal is
    /// a fresh attempt decided by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::Io(_)))
    }

    /// Outcomes that surface to the person revealing a message as the
    /// same generic "could not retrieve secret" answer.
    pub fn is_reveal_denial(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::WrongPin
                | Self::InvalidCredential
                | Self::CorruptHashFormat(_)
                | Self::DecryptionFailed
        )
    }
}

/// Convenience type alias for SecretShare results.
pub type Result<T> = std::result::Result<T, SecretShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_repository_io_is_retryable() {
        assert!(SecretShareError::Repository(RepositoryError::Io("timeout".into())).is_retryable());
        assert!(!SecretShareError::Repository(RepositoryError::Conflict {
            id: "abc".into()
        })
        .is_retryable());
        assert!(!SecretShareError::WrongPin.is_retryable());
    }

    #[test]
    fn not_found_and_wrong_pin_are_both_denials() {
        assert!(SecretShareError::NotFound.is_reveal_denial());
        assert!(SecretShareError::WrongPin.is_reveal_denial());
        assert!(!SecretShareError::Cancelled.is_reveal_denial());
    }
}
