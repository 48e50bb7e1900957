//! In-process message repository backed by a sharded concurrent map.
//!
//! Each operation holds at most one shard lock, and only for the
//! duration of the map access itself.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::record::MessageRecord;
use super::repository::{MessageRepository, RepositoryError};

/// In-memory message storage.  Lives as long as the owning process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    messages: DashMap<String, MessageRecord>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
        }
    }
}

impl MessageRepository for MemoryRepository {
    fn create(&self, record: &MessageRecord) -> Result<(), RepositoryError> {
        match self.messages.entry(record.id().to_string()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict {
                id: record.id().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                debug!(id = %record.id(), owner = %record.owner(), "stored message");
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Option<MessageRecord>, RepositoryError> {
        Ok(self.messages.get(id).map(|entry| entry.value().clone()))
    }

    fn update(&self, record: &MessageRecord, expected_attempts: i32) -> Result<(), RepositoryError> {
        let Some(mut stored) = self.messages.get_mut(record.id()) else {
            return Err(RepositoryError::Missing {
                id: record.id().to_string(),
            });
        };

        if stored.attempts_remaining != expected_attempts {
            return Err(RepositoryError::Conflict {
                id: record.id().to_string(),
            });
        }

        *stored = record.clone();
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let removed = self.messages.remove(id).is_some();
        if removed {
            debug!(id = %id, "deleted message");
        }
        Ok(removed)
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<MessageRecord>, RepositoryError> {
        let mut list: Vec<MessageRecord> = self
            .messages
            .iter()
            .filter(|entry| entry.value().owner() == owner)
            .map(|entry| entry.value().clone())
            .collect();

        list.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(list)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.messages.len())
    }
}
