//! SQLite script session.

use std::time::Duration;

use dbmeta_migrate::{MigrateResult, MigrationError, ScriptSession};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, trace};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};

/// A connection that runs script statements inside explicit transactions.
///
/// Statements go through `execute_batch`, so a statement may carry several
/// SQL commands (a trigger body, for instance) and trailing comments.
pub struct SqliteSession {
    conn: Connection,
    config: SqliteConfig,
}

impl SqliteSession {
    /// Open an existing database.
    ///
    /// A missing database file is an error; it is never created here.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        Self::open_with_flags(config, OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX)
    }

    /// Open a database, creating the file if needed.
    pub(crate) fn create(config: &SqliteConfig) -> SqliteResult<Self> {
        Self::open_with_flags(
            config,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(config: &SqliteConfig, flags: OpenFlags) -> SqliteResult<Self> {
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory()?,
            DatabasePath::File(path) => Connection::open_with_flags(path, flags).map_err(|e| {
                SqliteError::connection(format!("cannot open {}: {}", path.display(), e))
            })?,
        };

        if let Some(ms) = config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(u64::from(ms)))?;
        }
        conn.execute_batch(&config.init_sql())?;
        let mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_pragma(),
            |row| row.get(0),
        )?;

        debug!(path = %config.path.display(), journal_mode = %mode, "Opened SQLite connection");
        Ok(Self {
            conn,
            config: config.clone(),
        })
    }

    /// Get the inner connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get the configuration the session was opened with.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl ScriptSession for SqliteSession {
    fn begin(&mut self) -> MigrateResult<()> {
        if self.in_transaction() {
            return Err(MigrationError::transaction("a transaction is already active"));
        }
        self.conn
            .execute_batch("BEGIN")
            .map_err(|e| MigrationError::transaction(e.to_string()))
    }

    fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        trace!(sql = %sql, "Executing statement");
        if self.in_transaction() && ends_transaction(sql) {
            return Err(MigrationError::transaction(
                "statement would end the file transaction",
            ));
        }

        self.conn
            .execute_batch(sql)
            .map_err(|e| -> MigrationError { SqliteError::from(e).into() })?;

        // A batch can still carry a COMMIT after other commands.
        if !self.in_transaction() {
            return Err(MigrationError::transaction(
                "statement ended the file transaction",
            ));
        }
        Ok(())
    }

    fn commit(&mut self) -> MigrateResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| MigrationError::transaction(e.to_string()))
    }

    fn rollback(&mut self) -> MigrateResult<()> {
        // Some errors make SQLite roll back on its own.
        if !self.in_transaction() {
            debug!("Transaction already closed by SQLite");
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| MigrationError::transaction(e.to_string()))
    }
}

/// Whether `sql` starts with a command that closes the open transaction.
///
/// Leading comments are skipped. `ROLLBACK TO` only unwinds a savepoint and
/// is allowed.
fn ends_transaction(sql: &str) -> bool {
    let words: Vec<String> = strip_leading_comments(sql)
        .split_whitespace()
        .take(3)
        .map(|w| w.trim_end_matches(';').to_ascii_uppercase())
        .collect();

    match words.first().map(String::as_str) {
        Some("COMMIT" | "END") => true,
        Some("ROLLBACK") => !words[1..].iter().any(|w| w == "TO"),
        _ => false,
    }
}

fn strip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn count(session: &SqliteSession, table: &str) -> i64 {
        session
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_commit_persists() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        assert!(session.in_transaction());
        session.execute("CREATE TABLE t (id INTEGER)").unwrap();
        session.execute("INSERT INTO t VALUES (1)").unwrap();
        session.commit().unwrap();

        assert!(!session.in_transaction());
        assert_eq!(count(&session, "t"), 1);
    }

    #[test]
    fn test_rollback_discards_ddl() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        session.execute("CREATE TABLE t (id INTEGER)").unwrap();
        session.rollback().unwrap();

        let err = session.execute("SELECT * FROM t").unwrap_err();
        assert!(err.message().contains("no such table: t"));
    }

    #[test]
    fn test_rollback_without_transaction_is_noop() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();
        session.rollback().unwrap();
    }

    #[test]
    fn test_nested_begin_is_rejected() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();
        session.begin().unwrap();
        let err = session.begin().unwrap_err();
        assert!(matches!(err, MigrationError::Transaction(_)));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.db");

        let result = SqliteSession::open(&SqliteConfig::file(&path));
        assert!(matches!(result, Err(SqliteError::Connection(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_transaction_control_is_refused() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        session.execute("CREATE TABLE t (id INTEGER)").unwrap();
        for sql in ["COMMIT", "-- done\ncommit work", "END TRANSACTION", "/* x */ ROLLBACK"] {
            let err = session.execute(sql).unwrap_err();
            assert!(matches!(err, MigrationError::Transaction(_)), "{sql}");
        }
        assert!(session.in_transaction());

        session.rollback().unwrap();
        assert!(session.execute("SELECT * FROM t").is_err());
    }

    #[test]
    fn test_savepoints_are_allowed() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        session.execute("CREATE TABLE t (id INTEGER)").unwrap();
        session.execute("SAVEPOINT s1").unwrap();
        session.execute("INSERT INTO t VALUES (1)").unwrap();
        session.execute("ROLLBACK TO s1").unwrap();
        session.execute("RELEASE s1").unwrap();
        session.commit().unwrap();

        assert_eq!(count(&session, "t"), 0);
    }

    #[test]
    fn test_batch_ending_transaction_is_an_error() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        let err = session
            .execute("CREATE TABLE t (id INTEGER); COMMIT")
            .unwrap_err();
        assert!(matches!(err, MigrationError::Transaction(_)));
        session.rollback().unwrap();
    }

    #[test]
    fn test_ends_transaction() {
        assert!(ends_transaction("COMMIT;"));
        assert!(ends_transaction("  end"));
        assert!(ends_transaction("ROLLBACK TRANSACTION"));
        assert!(!ends_transaction("ROLLBACK TRANSACTION TO SAVEPOINT s1"));
        assert!(!ends_transaction("CREATE TRIGGER t AFTER INSERT ON x BEGIN SELECT 1; END"));
        assert!(!ends_transaction("-- COMMIT\nSELECT 1"));
        assert!(!ends_transaction("/* unterminated"));
    }

    #[test]
    fn test_trigger_body_runs_as_one_statement() {
        let mut session = SqliteSession::open(&SqliteConfig::memory()).unwrap();

        session.begin().unwrap();
        session
            .execute("CREATE TABLE hits (n INTEGER); CREATE TABLE log (msg TEXT)")
            .unwrap();
        session
            .execute(
                "CREATE TRIGGER hits_log AFTER INSERT ON hits\nBEGIN\n  INSERT INTO log VALUES ('hit');\nEND",
            )
            .unwrap();
        session.execute("INSERT INTO hits VALUES (1)").unwrap();
        session.commit().unwrap();

        assert_eq!(count(&session, "log"), 1);
    }
}
