//! Session record store
//!
//! The session manager keeps a durable row per user in its `users` table.
//! When a termination request fails, that row is deleted so the manager's
//! bookkeeping and the directory state cannot drift apart. This component
//! only ever deletes rows; it never creates or reads them, and it never
//! touches the schema.

use rusqlite::{params, Connection, OpenFlags};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Narrow view of the durable record store consumed by the reconciler
pub trait RecordStore {
    /// Delete `username`'s row from the `users` table.
    fn delete_record(&self, username: &str) -> StorageResult<()>;
}

/// Record store backed by the session manager's SQLite database
///
/// The connection is opened per call: deletes only happen on the rare
/// termination-failure path, and the file is owned by the session manager.
pub struct SqliteRecordStore {
    db_path: PathBuf,
}

impl SqliteRecordStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn open(&self) -> StorageResult<Connection> {
        // Read-write without CREATE: a missing database is an error here,
        // not something to silently initialize.
        if !self.db_path.exists() {
            return Err(StorageError::NotFound {
                path: self.db_path.clone(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        Ok(Connection::open_with_flags(&self.db_path, flags)?)
    }
}

impl RecordStore for SqliteRecordStore {
    fn delete_record(&self, username: &str) -> StorageResult<()> {
        let conn = self.open()?;
        let deleted = conn.execute("DELETE FROM users WHERE name = ?1", params![username])?;
        debug!(username, deleted, "Removed user record");
        Ok(())
    }
}
