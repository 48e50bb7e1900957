//! Persistence abstraction for message records.
//!
//! The lifecycle in `crate::messages` only ever talks to
//! `dyn MessageRepository`; which backend sits behind it is decided once,
//! at startup, by [`open_repository`].

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::file_table::FileTableClient;
use super::memory::MemoryRepository;
use super::record::MessageRecord;
use super::table::TableRepository;
use crate::config::{Backend, Settings};
use crate::errors::Result;

/// Errors that can occur during repository operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A conditional write lost against a concurrent writer, or a create
    /// collided with an existing id.
    #[error("conflicting write for message {id}")]
    Conflict { id: String },

    /// The record vanished before a conditional write reached it.
    #[error("message {id} no longer exists")]
    Missing { id: String },

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying storage failure; the caller may retry.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Storage for message records, keyed by message id.
///
/// Implementations must be safe to share between threads.  Operations on
/// one id are linearizable: `update` is a compare-and-replace on
/// `attempts_remaining`, and `delete` reports `true` to exactly one
/// caller.
pub trait MessageRepository: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// `Conflict` if a record with the same id already exists.
    fn create(&self, record: &MessageRecord) -> std::result::Result<(), RepositoryError>;

    /// Fetch a record by id.  `None` if absent.
    fn get(&self, id: &str) -> std::result::Result<Option<MessageRecord>, RepositoryError>;

    /// Replace a record wholesale, but only if the stored copy still has
    /// `expected_attempts` attempts remaining.
    ///
    /// # Errors
    ///
    /// `Conflict` if the stored count differs, `Missing` if the record
    /// is gone.
    fn update(
        &self,
        record: &MessageRecord,
        expected_attempts: i32,
    ) -> std::result::Result<(), RepositoryError>;

    /// Remove a record.  Returns `true` only if this call removed it.
    fn delete(&self, id: &str) -> std::result::Result<bool, RepositoryError>;

    /// All records created by `owner`.
    fn list_by_owner(&self, owner: &str)
        -> std::result::Result<Vec<MessageRecord>, RepositoryError>;

    /// Number of stored records.
    fn count(&self) -> std::result::Result<usize, RepositoryError>;
}

/// Build the repository selected by `settings`.
///
/// Relative data directories are resolved against `project_dir`.
pub fn open_repository(
    settings: &Settings,
    project_dir: &Path,
) -> Result<Arc<dyn MessageRepository>> {
    match settings.backend {
        Backend::Memory => Ok(Arc::new(MemoryRepository::new())),
        Backend::Table => {
            let root = settings.data_path(project_dir);
            let client = FileTableClient::open(&root, &settings.table_name)?;
            Ok(Arc::new(TableRepository::new(client)))
        }
    }
}
