//! Store module: persistence for message records.
//!
//! This module provides:
//! - `MessageRecord` and the caller-facing views (`record`)
//! - The `MessageRepository` trait and backend factory (`repository`)
//! - A concurrent in-memory backend (`memory`)
//! - A partitioned-table backend and its file-based client (`table`, `file_table`)

pub mod file_table;
pub mod memory;
pub mod record;
pub mod repository;
pub mod table;

pub use file_table::FileTableClient;
pub use memory::MemoryRepository;
pub use record::{
    BaseRecord, CreatedMessage, MessageMetadata, MessageRecord, RevealedMessage, MAX_ATTEMPTS,
};
pub use repository::{open_repository, MessageRepository, RepositoryError};
pub use table::{TableClient, TableEntity, TableRepository};
