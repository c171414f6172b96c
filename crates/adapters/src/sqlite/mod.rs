mod queries;

use std::fs;
use std::path::{Path, PathBuf};

use crashlens_application::{ApplicationError, UsageStore};
use crashlens_domain::USAGE_COUNT_KEY;
use rusqlite::Connection;
use tracing::debug;

use crate::migrations::MIGRATIONS;

/// Usage counter persisted in a `settings` key/value table.
#[derive(Debug, Clone)]
pub struct SqliteUsageStore {
    path: PathBuf,
    key: String,
}

impl SqliteUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: USAGE_COUNT_KEY.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "usage database path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration)
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        }

        debug!(path = %self.path.display(), "usage store ready");
        Ok(())
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

impl UsageStore for SqliteUsageStore {
    fn read(&self) -> Result<Option<String>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::read_setting(&conn, &self.key)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }

    fn write(&self, value: &str) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        queries::write_setting(&conn, &self.key, value)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("nested").join("usage.sqlite3");
        let store = SqliteUsageStore::new(&db_path);
        store.initialize().expect("initialize");
        store.initialize().expect("idempotent");

        let conn = Connection::open(db_path).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='settings'",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_key_reads_none_then_overwrites() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteUsageStore::new(dir.path().join("usage.sqlite3"));
        store.initialize().expect("initialize");

        assert_eq!(store.read().expect("read"), None);
        store.write("1").expect("write");
        store.write("2").expect("overwrite");
        assert_eq!(store.read().expect("read").as_deref(), Some("2"));

        let reopened = SqliteUsageStore::new(store.path());
        assert_eq!(reopened.read().expect("read").as_deref(), Some("2"));
    }

    #[test]
    fn value_is_stored_under_the_usage_key() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("usage.sqlite3");
        let store = SqliteUsageStore::new(&db_path);
        store.initialize().expect("initialize");
        store.write("7").expect("write");

        let conn = Connection::open(db_path).expect("open");
        let value: String = conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'accidentReportAppUsageCount'",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(value, "7");
    }

    #[test]
    fn uninitialized_store_fails_to_read() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteUsageStore::new(dir.path().join("usage.sqlite3"));
        assert!(matches!(
            store.read(),
            Err(ApplicationError::Persistence(_))
        ));
    }
}
