//! Message record types shared by every repository backend.
//!
//! A `MessageRecord` is what gets persisted: ciphertext, PIN hash and the
//! remaining attempt budget.  The views returned to callers
//! (`MessageMetadata`, `CreatedMessage`, `RevealedMessage`) never carry
//! the PIN hash, and only a reveal carries plaintext.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::content_id;

/// Failed PIN attempts a message survives before it is destroyed.
pub const MAX_ATTEMPTS: i32 = 5;

/// Table addressing fields every stored entity carries.
///
/// For messages the partition key is the content id and the row key is
/// the owner.  Serialized under the names the stored encoding uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRecord {
    #[serde(rename = "id")]
    pub partition_key: String,

    #[serde(rename = "owner")]
    pub row_key: String,

    #[serde(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

/// A stored message.
///
/// `content` and `pin` are written once at creation; only
/// `attempts_remaining` ever changes afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(flatten)]
    pub base: BaseRecord,

    /// Hex ciphertext token (nonce + ciphertext + tag).
    pub content: String,

    /// Argon2id PHC string of the PIN.
    pub pin: String,

    pub attempts_remaining: i32,
}

impl MessageRecord {
    /// Build a fresh record whose id is derived from the ciphertext.
    pub fn new(owner: &str, ciphertext: String, pin_hash: String) -> Self {
        Self {
            base: BaseRecord {
                partition_key: content_id(&ciphertext),
                row_key: owner.to_string(),
                timestamp: Utc::now(),
            },
            content: ciphertext,
            pin: pin_hash,
            attempts_remaining: MAX_ATTEMPTS,
        }
    }

    pub fn id(&self) -> &str {
        &self.base.partition_key
    }

    pub fn owner(&self) -> &str {
        &self.base.row_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.base.timestamp
    }

    /// Copy of this record with one fewer attempt left.
    pub fn decremented(&self) -> Self {
        Self {
            attempts_remaining: self.attempts_remaining - 1,
            ..self.clone()
        }
    }

    /// Strip ciphertext and PIN hash.
    pub fn metadata(&self) -> MessageMetadata {
        MessageMetadata {
            id: self.id().to_string(),
            owner: self.owner().to_string(),
            attempts_remaining: self.attempts_remaining,
            created_at: self.created_at(),
        }
    }
}

impl fmt::Debug for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRecord")
            .field("base", &self.base)
            .field("content", &format_args!("<{} hex chars>", self.content.len()))
            .field("pin", &"<redacted>")
            .field("attempts_remaining", &self.attempts_remaining)
            .finish()
    }
}

/// Lightweight metadata about a message (no content, no PIN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageMetadata {
    pub id: String,
    pub owner: String,
    pub attempts_remaining: i32,
    pub created_at: DateTime<Utc>,
}

/// Result of creating a message: the only time the PIN is ever shown.
pub struct CreatedMessage {
    pub id: String,
    pub pin: Zeroizing<String>,
}

impl fmt::Debug for CreatedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedMessage")
            .field("id", &self.id)
            .field("pin", &"<redacted>")
            .finish()
    }
}

/// A message whose content was decrypted by a successful reveal.
///
/// The stored record no longer exists by the time this is returned.
pub struct RevealedMessage {
    pub metadata: MessageMetadata,
    pub content: Zeroizing<String>,
}

impl fmt::Debug for RevealedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealedMessage")
            .field("metadata", &self.metadata)
            .field("content", &"<redacted>")
            .finish()
    }
}
