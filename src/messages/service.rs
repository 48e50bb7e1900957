//! Lifecycle of a one-time message.
//!
//! A message is `Active` from creation until one of two terminal events
//! removes it from the repository:
//!
//! - **Revealed**: the correct PIN was presented once.
//! - **Exhausted**: `MAX_ATTEMPTS` wrong PINs were presented.
//!
//! Nothing else ever changes a stored record except the attempt counter.
//!
//! Races are settled by the repository: a reveal only returns plaintext
//! if its own `delete` removed the record, and a wrong-PIN decrement is a
//! compare-and-replace on the attempt count.  Every cryptographic step
//! runs on a snapshot before the single mutation that commits it, so a
//! cancelled operation leaves the record untouched.

use std::sync::Arc;

use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::config::OperatorSalt;
use crate::crypto::{decrypt, derive_key, encrypt, generate_pin, is_pin_shaped};
use crate::crypto::{PinHashParams, PinHasher};
use crate::errors::{Result, SecretShareError};
use crate::store::{
    CreatedMessage, MessageMetadata, MessageRecord, MessageRepository, RepositoryError,
    RevealedMessage, MAX_ATTEMPTS,
};

use super::cancel::CancelToken;

/// Entry point for creating, inspecting and revealing messages.
///
/// Holds the injected repository, the operator salt and the PIN hasher;
/// all three are read-only for the lifetime of the service.
pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
    salt: OperatorSalt,
    hasher: PinHasher,
}

impl MessageService {
    /// Build a service with default PIN hashing parameters.
    pub fn new(repo: Arc<dyn MessageRepository>, salt: OperatorSalt) -> Result<Self> {
        Self::with_pin_params(repo, salt, PinHashParams::default())
    }

    /// Build a service with explicit PIN hashing parameters.
    pub fn with_pin_params(
        repo: Arc<dyn MessageRepository>,
        salt: OperatorSalt,
        params: PinHashParams,
    ) -> Result<Self> {
        Ok(Self {
            repo,
            salt,
            hasher: PinHasher::new(params)?,
        })
    }

    /// Encrypt `text` under a fresh PIN and store it for `owner`.
    ///
    /// The returned PIN is the only copy; it is not retrievable again.
    pub fn create(&self, text: &str, owner: &str, cancel: &CancelToken) -> Result<CreatedMessage> {
        if text.is_empty() {
            return Err(SecretShareError::InvalidInput("message text is empty".into()));
        }
        validate_owner(owner)?;
        cancel.check()?;

        let pin = Zeroizing::new(generate_pin());
        let key = derive_key(&pin, self.salt.as_str())?;
        let ciphertext = encrypt(&key, text)?;
        let pin_hash = self.hasher.hash(&pin)?;
        let record = MessageRecord::new(owner, ciphertext, pin_hash);

        cancel.check()?;
        self.repo.create(&record)?;

        info!(id = %record.id(), owner = %owner, "created message");
        Ok(CreatedMessage {
            id: record.id().to_string(),
            pin,
        })
    }

    /// Metadata of an active message, without content or PIN.
    pub fn metadata(&self, id: &str, cancel: &CancelToken) -> Result<MessageMetadata> {
        cancel.check()?;
        self.repo
            .get(id)?
            .map(|record| record.metadata())
            .ok_or(SecretShareError::NotFound)
    }

    /// Decrypt a message with `candidate_pin`, destroying it.
    ///
    /// Returns `NotFound` if the message does not exist (or another
    /// caller revealed it first) and `WrongPin` for any rejected PIN,
    /// whether or not that attempt was the last one.
    pub fn reveal(
        &self,
        id: &str,
        candidate_pin: &str,
        cancel: &CancelToken,
    ) -> Result<RevealedMessage> {
        if !is_pin_shaped(candidate_pin) {
            return Err(SecretShareError::InvalidInput(
                "PIN must be 4 or 5 digits".into(),
            ));
        }
        cancel.check()?;

        let Some(record) = self.repo.get(id)? else {
            // Pay for a verification anyway so absence is not observable
            // through response time.
            self.hasher.verify_dummy(candidate_pin);
            return Err(SecretShareError::NotFound);
        };

        match self.hasher.verify(&record.pin, candidate_pin) {
            Ok(()) => self.open_verified(record, candidate_pin, cancel),
            Err(SecretShareError::InvalidCredential) => self.record_failed_attempt(record, cancel),
            Err(SecretShareError::CorruptHashFormat(reason)) => {
                warn!(id = %record.id(), reason = %reason, "stored PIN hash is corrupt");
                // Parsing failed before any hashing; pay for it now.
                self.hasher.verify_dummy(candidate_pin);
                self.record_failed_attempt(record, cancel)
            }
            Err(other) => Err(other),
        }
    }

    /// Active messages created by `owner`, oldest first.
    pub fn list(&self, owner: &str, cancel: &CancelToken) -> Result<Vec<MessageMetadata>> {
        validate_owner(owner)?;
        cancel.check()?;
        Ok(self
            .repo
            .list_by_owner(owner)?
            .iter()
            .map(MessageRecord::metadata)
            .collect())
    }

    /// Number of active messages.
    pub fn count(&self, cancel: &CancelToken) -> Result<usize> {
        cancel.check()?;
        Ok(self.repo.count()?)
    }

    /// PIN verified: decrypt the snapshot, then claim the record.
    ///
    /// Only the caller whose `delete` removed the record gets the
    /// plaintext.  A record that fails to decrypt despite a correct PIN
    /// is destroyed as well.
    fn open_verified(
        &self,
        record: MessageRecord,
        pin: &str,
        cancel: &CancelToken,
    ) -> Result<RevealedMessage> {
        let decrypted = derive_key(pin, self.salt.as_str())
            .and_then(|key| decrypt(&key, &record.content))
            .map(Zeroizing::new);

        cancel.check()?;
        if !self.repo.delete(record.id())? {
            return Err(SecretShareError::NotFound);
        }

        match decrypted {
            Ok(text) => {
                info!(id = %record.id(), owner = %record.owner(), "revealed message");
                Ok(RevealedMessage {
                    metadata: record.metadata(),
                    content: text,
                })
            }
            Err(e) => {
                error!(
                    id = %record.id(),
                    error = %e,
                    "correct PIN but content could not be decrypted; message destroyed"
                );
                Err(e)
            }
        }
    }

    /// Wrong PIN: spend one attempt, destroying the record on the last.
    ///
    /// A `Conflict` means another caller spent an attempt first, so the
    /// record is re-read and the decrement retried.  Every retry observes
    /// a strictly smaller count, which bounds the loop.
    fn record_failed_attempt(
        &self,
        record: MessageRecord,
        cancel: &CancelToken,
    ) -> Result<RevealedMessage> {
        let mut current = record;

        for _ in 0..=MAX_ATTEMPTS {
            cancel.check()?;

            let next = current.decremented();
            if next.attempts_remaining <= 0 {
                if self.repo.delete(current.id())? {
                    info!(id = %current.id(), owner = %current.owner(), "attempts exhausted, message destroyed");
                }
                return Err(SecretShareError::WrongPin);
            }

            match self.repo.update(&next, current.attempts_remaining) {
                Ok(()) => {
                    warn!(
                        id = %current.id(),
                        attempts_remaining = next.attempts_remaining,
                        "wrong PIN"
                    );
                    return Err(SecretShareError::WrongPin);
                }
                Err(RepositoryError::Conflict { .. }) => match self.repo.get(current.id())? {
                    Some(fresh) => current = fresh,
                    None => return Err(SecretShareError::WrongPin),
                },
                Err(RepositoryError::Missing { .. }) => return Err(SecretShareError::WrongPin),
                Err(e) => return Err(e.into()),
            }
        }

        Err(SecretShareError::WrongPin)
    }
}

fn validate_owner(owner: &str) -> Result<()> {
    if owner.trim().is_empty() {
        return Err(SecretShareError::InvalidInput("owner is empty".into()));
    }
    Ok(())
}
