//! Partitioned table stored as JSON files on local disk.
//!
//! Layout:
//!
//! ```text
//! <root>/<table>/<hex(partition_key)>/<hex(row_key)>.json
//! ```
//!
//! Keys are hex-encoded so any string is a safe file name.  Every write
//! goes to a temp file in the same directory and is then renamed into
//! place, so readers see either the old or the new entity, never a torn
//! one.  The etag of an entity is the SHA-256 of its bytes.
//!
//! Writers inside one process are serialised by a lock, which makes
//! `replace` a true compare-and-swap and `delete` report success to one
//! caller only.  Two processes sharing a directory are not excluded from
//! each other: a replace racing a replace from another process can still
//! lose an update between the etag check and the rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use super::repository::RepositoryError;
use super::table::{TableClient, TableEntity};

const ENTITY_EXT: &str = "json";

/// File-backed `TableClient`.
#[derive(Debug)]
pub struct FileTableClient {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTableClient {
    /// Open (or create) `<root>/<table_name>`.
    pub fn open(root: &Path, table_name: &str) -> Result<Self, RepositoryError> {
        if table_name.is_empty() || !table_name.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(RepositoryError::Io(format!(
                "table name '{table_name}' must be non-empty ASCII letters and digits"
            )));
        }

        let dir = root.join(table_name);
        fs::create_dir_all(&dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
        }

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn partition_dir(&self, partition_key: &str) -> PathBuf {
        self.dir.join(hex::encode(partition_key))
    }

    fn entity_path(&self, partition_key: &str, row_key: &str) -> PathBuf {
        self.partition_dir(partition_key)
            .join(format!("{}.{ENTITY_EXT}", hex::encode(row_key)))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, RepositoryError> {
        self.write_lock
            .lock()
            .map_err(|_| RepositoryError::Io("table write lock poisoned".into()))
    }

    /// Read an entity, or `None` if it does not exist.
    fn read_entity(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, RepositoryError> {
        match fs::read(self.entity_path(partition_key, row_key)) {
            Ok(body) => Ok(Some(TableEntity {
                partition_key: partition_key.to_string(),
                row_key: row_key.to_string(),
                etag: etag_of(&body),
                body,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Row keys present in a partition, sorted.
    fn row_keys(&self, partition_dir: &Path) -> Result<Vec<String>, RepositoryError> {
        let entries = match fs::read_dir(partition_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTITY_EXT) {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Partition keys present in the table, sorted.
    fn partition_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(key) = entry.file_name().to_str().and_then(decode_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Write `body` to `path` via temp file + rename.
    fn write_atomic(path: &Path, body: &[u8]) -> Result<(), RepositoryError> {
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(body)?;
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl TableClient for FileTableClient {
    fn query_partition(&self, partition_key: &str) -> Result<Vec<TableEntity>, RepositoryError> {
        let mut entities = Vec::new();
        for row_key in self.row_keys(&self.partition_dir(partition_key))? {
            if let Some(entity) = self.read_entity(partition_key, &row_key)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    fn query_row_key(&self, row_key: &str) -> Result<Vec<TableEntity>, RepositoryError> {
        let mut entities = Vec::new();
        for partition_key in self.partition_keys()? {
            if let Some(entity) = self.read_entity(&partition_key, row_key)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let mut total = 0;
        for partition_key in self.partition_keys()? {
            total += self.row_keys(&self.partition_dir(&partition_key))?.len();
        }
        Ok(total)
    }

    fn insert(&self, partition_key: &str, row_key: &str, body: &[u8]) -> Result<(), RepositoryError> {
        let _guard = self.lock()?;
        let path = self.entity_path(partition_key, row_key);
        if path.exists() {
            return Err(RepositoryError::Conflict {
                id: partition_key.to_string(),
            });
        }
        Self::write_atomic(&path, body)
    }

    fn replace(
        &self,
        partition_key: &str,
        row_key: &str,
        body: &[u8],
        if_match: &str,
    ) -> Result<(), RepositoryError> {
        let _guard = self.lock()?;
        let Some(current) = self.read_entity(partition_key, row_key)? else {
            return Err(RepositoryError::Missing {
                id: partition_key.to_string(),
            });
        };
        if current.etag != if_match {
            return Err(RepositoryError::Conflict {
                id: partition_key.to_string(),
            });
        }
        Self::write_atomic(&self.entity_path(partition_key, row_key), body)
    }

    fn delete(&self, partition_key: &str, row_key: &str) -> Result<bool, RepositoryError> {
        let _guard = self.lock()?;
        match fs::remove_file(self.entity_path(partition_key, row_key)) {
            Ok(()) => {
                // Only succeeds once the partition is empty.
                let _ = fs::remove_dir(self.partition_dir(partition_key));
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn etag_of(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

fn decode_key(encoded: &str) -> Option<String> {
    hex::decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}
