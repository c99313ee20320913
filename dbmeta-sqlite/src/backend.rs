//! SQLite implementation of the engine backend.

use std::path::{Path, PathBuf};

use dbmeta_migrate::{Backend, CreateOptions, MigrateResult, MigrationError};
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::connection::SqliteSession;
use crate::error::{SqliteError, SqliteResult};

/// Value stamped into the `application_id` header field of created files.
pub const APPLICATION_ID: i32 = 0x6462_6D74;

/// Sidecar files SQLite may leave next to a database.
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// Backend that creates and opens SQLite database files.
///
/// Connection targets are SQLite URLs or plain paths, see
/// [`SqliteConfig::from_url`]. Files created by a build are reopened by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBackend;

impl SqliteBackend {
    /// Create a backend.
    pub fn new() -> Self {
        Self
    }

    fn create_file(&self, path: &Path, options: &CreateOptions) -> SqliteResult<()> {
        if path.exists() {
            if !options.overwrite {
                return Err(SqliteError::create(format!(
                    "database file already exists: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Replacing existing database");
            std::fs::remove_file(path)?;
            for sidecar in sidecars(path) {
                if sidecar.exists() {
                    std::fs::remove_file(&sidecar)?;
                }
            }
        }

        let config = SqliteConfig::for_create(path, options);
        let session = SqliteSession::create(&config)?;
        // First write: fixes the page size and materializes the file.
        session
            .connection()
            .pragma_update(None, "application_id", APPLICATION_ID)?;

        Ok(())
    }
}

impl Backend for SqliteBackend {
    type Session = SqliteSession;

    fn create_database(&self, path: &Path, options: &CreateOptions) -> MigrateResult<()> {
        self.create_file(path, options)
            .map_err(|e| MigrationError::create_database(e.to_string()))?;
        info!(path = %path.display(), page_size = options.page_size, "Created database");
        Ok(())
    }

    fn open(&self, path: &Path) -> MigrateResult<SqliteSession> {
        Ok(SqliteSession::open(&SqliteConfig::file(path))?)
    }

    fn connect(&self, target: &str) -> MigrateResult<SqliteSession> {
        let config = SqliteConfig::from_url(target)?;
        Ok(SqliteSession::open(&config)?)
    }
}

fn sidecars(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    SIDECAR_SUFFIXES.iter().map(move |suffix| {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pragma(path: &Path, name: &str) -> i64 {
        let conn = rusqlite::Connection::open(path).unwrap();
        conn.query_row(&format!("PRAGMA {name}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");

        SqliteBackend::new()
            .create_database(&path, &CreateOptions::new().page_size(8192))
            .unwrap();

        assert!(path.is_file());
        assert_eq!(pragma(&path, "page_size"), 8192);
        assert_eq!(pragma(&path, "application_id"), i64::from(APPLICATION_ID));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");
        std::fs::write(&path, b"keep me").unwrap();

        let err = SqliteBackend::new()
            .create_database(&path, &CreateOptions::default())
            .unwrap_err();

        assert!(matches!(err, MigrationError::CreateDatabase(_)));
        assert!(err.message().contains("already exists"));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn test_create_overwrites_when_allowed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");
        std::fs::write(&path, b"stale").unwrap();

        SqliteBackend::new()
            .create_database(&path, &CreateOptions::new().overwrite(true))
            .unwrap();

        assert_eq!(pragma(&path, "application_id"), i64::from(APPLICATION_ID));
    }

    #[test]
    fn test_connect_missing_database() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing.db");

        let err = SqliteBackend::new()
            .connect(&target.to_string_lossy())
            .err()
            .unwrap();

        assert!(matches!(err, MigrationError::Connection(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_connect_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");
        let backend = SqliteBackend::new();
        backend.create_database(&path, &CreateOptions::default()).unwrap();

        let session = backend
            .connect(&format!("sqlite://{}?busy_timeout=250", path.display()))
            .unwrap();

        assert_eq!(session.config().busy_timeout_ms, Some(250));
    }
}
