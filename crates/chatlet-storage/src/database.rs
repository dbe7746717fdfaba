// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed durable key/value store.
//!
//! One connection behind a mutex serves every read and write, so callers see
//! their own writes immediately and never hit `SQLITE_BUSY` from themselves.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chatlet_config::model::StorageConfig;
use chatlet_core::{ChatletError, DurableStore};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::migrations;

/// Durable store persisted in a single SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run pending migrations.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, ChatletError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ChatletError::Storage {
                source: Box::new(e),
            })?;
        }

        let mut conn = Connection::open(path).map_err(map_sql_err)?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(map_sql_err)?;
        if wal_mode {
            let mode: String = conn
                .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                .map_err(map_sql_err)?;
            debug!(journal_mode = %mode, "journal mode set");
        }
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(map_sql_err)?;
        migrations::run_migrations(&mut conn)?;

        let path = path.display().to_string();
        debug!(path = %path, wal_mode, "SQLite store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open the store described by the `[storage]` config section.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ChatletError> {
        Self::open(&config.database_path, config.wal_mode)
    }

    /// Open a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> Result<Self, ChatletError> {
        let mut conn = Connection::open_in_memory().map_err(map_sql_err)?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, ChatletError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(map_sql_err)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, ChatletError> {
        Ok(self.len()? == 0)
    }

    /// Flush the WAL into the main database file.
    pub fn checkpoint(&self) -> Result<(), ChatletError> {
        self.conn()?
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(map_sql_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ChatletError> {
        self.conn
            .lock()
            .map_err(|e| ChatletError::Internal(format!("SQLite connection lock poisoned: {e}")))
    }
}

impl DurableStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatletError> {
        self.conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(map_sql_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatletError> {
        self.conn()?
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )
            .map_err(map_sql_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatletError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(map_sql_err)?;
        Ok(())
    }
}

pub(crate) fn map_sql_err(e: rusqlite::Error) -> ChatletError {
    ChatletError::Storage {
        source: Box::new(e),
    }
}
