//! SQLite key-value storage adapter.

use crate::domain::error::LedgerError;
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::StoragePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

/// Database file used when `[storage] path` is not set.
pub const DEFAULT_DB_PATH: &str = "stockledger.db";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> LedgerError {
    LedgerError::Storage {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> LedgerError {
    LedgerError::StorageQuery {
        reason: e.to_string(),
    }
}

/// Database path from `[storage] path`, or [`DEFAULT_DB_PATH`] when unset.
pub fn db_path(config: &dyn ConfigPort) -> Result<String, LedgerError> {
    match config.get_string("storage", "path") {
        None => Ok(DEFAULT_DB_PATH.to_string()),
        Some(path) if path.trim().is_empty() => Err(LedgerError::ConfigInvalid {
            section: "storage".into(),
            key: "path".into(),
            reason: "path must not be empty".into(),
        }),
        Some(path) => Ok(path.trim().to_string()),
    }
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let db_path = db_path(config)?;
        let pool_size = config.get_int("storage", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        tracing::debug!(path = %db_path, pool_size, "opened sqlite store");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, LedgerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn initialize_schema(&self) -> Result<(), LedgerError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );",
            )
            .map_err(query_error)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, LedgerError> {
        self.pool.get().map_err(pool_error)
    }
}

impl StoragePort for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        self.conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(query_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.conn()?
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(query_error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(query_error)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, LedgerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM kv ORDER BY key")
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_error)?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(query_error)?);
        }
        Ok(keys)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")
            .map_err(query_error)?;
        let rows = stmt
            .query_map(params![prefix], |row| row.get(0))
            .map_err(query_error)?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(query_error)?);
        }
        Ok(keys)
    }
}
