//! Message repository over a partitioned key/value table.
//!
//! Entities are addressed by `(partition_key, row_key)` and stored as JSON
//! with an opaque etag.  Messages use their id as the partition key and
//! their owner as the row key, so a reveal is a single-partition query
//! and listing is a row-key query.
//!
//! Conditional writes use the etag observed alongside the record, which
//! closes the gap between reading a record and replacing it.

use std::cmp::Ordering;

use tracing::{debug, warn};

use super::record::MessageRecord;
use super::repository::{MessageRepository, RepositoryError};

/// One stored entity and the etag of its current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntity {
    pub partition_key: String,
    pub row_key: String,
    pub etag: String,
    pub body: Vec<u8>,
}

/// Minimal partitioned table API the repository needs.
///
/// Query results are ordered by `(partition_key, row_key)`.
pub trait TableClient: Send + Sync {
    /// All entities in one partition.
    fn query_partition(&self, partition_key: &str) -> Result<Vec<TableEntity>, RepositoryError>;

    /// All entities with the given row key, across partitions.
    fn query_row_key(&self, row_key: &str) -> Result<Vec<TableEntity>, RepositoryError>;

    /// Total number of entities in the table.
    fn count(&self) -> Result<usize, RepositoryError>;

    /// Insert a new entity; `Conflict` if the key is taken.
    fn insert(&self, partition_key: &str, row_key: &str, body: &[u8])
        -> Result<(), RepositoryError>;

    /// Replace an entity if its etag still equals `if_match`.
    fn replace(
        &self,
        partition_key: &str,
        row_key: &str,
        body: &[u8],
        if_match: &str,
    ) -> Result<(), RepositoryError>;

    /// Delete an entity.  Returns `true` only if this call removed it.
    fn delete(&self, partition_key: &str, row_key: &str) -> Result<bool, RepositoryError>;
}

/// `MessageRepository` adapter for any `TableClient`.
pub struct TableRepository<C> {
    client: C,
}

impl<C: TableClient> TableRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Access the underlying table client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Look up a message together with the etag it was read at.
    ///
    /// Ids are content-addressed, so one partition should hold at most
    /// one entity.  If it holds more, the first is used and the anomaly
    /// is logged.
    fn fetch(&self, id: &str) -> Result<Option<(MessageRecord, String)>, RepositoryError> {
        let mut entities = self.client.query_partition(id)?;
        if entities.len() > 1 {
            warn!(id = %id, total = entities.len(), "more than one message with the same id");
        }
        if entities.is_empty() {
            return Ok(None);
        }
        let first = entities.swap_remove(0);
        let record: MessageRecord = serde_json::from_slice(&first.body)?;
        Ok(Some((record, first.etag)))
    }
}

impl<C: TableClient> MessageRepository for TableRepository<C> {
    fn create(&self, record: &MessageRecord) -> Result<(), RepositoryError> {
        let body = serde_json::to_vec(record)?;
        self.client.insert(record.id(), record.owner(), &body)?;
        debug!(id = %record.id(), owner = %record.owner(), "stored message entity");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<MessageRecord>, RepositoryError> {
        Ok(self.fetch(id)?.map(|(record, _)| record))
    }

    fn update(&self, record: &MessageRecord, expected_attempts: i32) -> Result<(), RepositoryError> {
        let Some((stored, etag)) = self.fetch(record.id())? else {
            return Err(RepositoryError::Missing {
                id: record.id().to_string(),
            });
        };

        if stored.attempts_remaining != expected_attempts {
            return Err(RepositoryError::Conflict {
                id: record.id().to_string(),
            });
        }

        let body = serde_json::to_vec(record)?;
        self.client
            .replace(stored.id(), stored.owner(), &body, &etag)
    }

    fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let Some((stored, _)) = self.fetch(id)? else {
            return Ok(false);
        };
        let removed = self.client.delete(stored.id(), stored.owner())?;
        if removed {
            debug!(id = %id, owner = %stored.owner(), "deleted message entity");
        }
        Ok(removed)
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<MessageRecord>, RepositoryError> {
        let mut list = self
            .client
            .query_row_key(owner)?
            .into_iter()
            .map(|entity| serde_json::from_slice::<MessageRecord>(&entity.body))
            .collect::<Result<Vec<_>, _>>()?;

        list.sort_by(|a, b| match a.created_at().cmp(&b.created_at()) {
            Ordering::Equal => a.id().cmp(b.id()),
            other => other,
        });
        Ok(list)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        self.client.count()
    }
}
