//! Transactional execution of one script file.
//!
//! Every file runs inside a single transaction. Statements are executed in
//! order and the first failure stops the file: the error is recorded, the
//! transaction is rolled back and the file counts as failed. Statements
//! that succeeded before the failure still count towards
//! `statements_executed` even though their effects are discarded.

use tracing::{debug, warn};

use crate::error::MigrateResult;
use crate::report::{preview, ErrorRecord, FileOutcome, FileStatus, ScriptReport, PREVIEW_MAX_CHARS};

/// A database session able to run script statements inside a transaction.
///
/// Implemented by database backends; the executor never talks to a driver
/// directly.
pub trait ScriptSession {
    /// Start a transaction.
    fn begin(&mut self) -> MigrateResult<()>;

    /// Execute one statement inside the active transaction.
    fn execute(&mut self, sql: &str) -> MigrateResult<()>;

    /// Commit the active transaction.
    fn commit(&mut self) -> MigrateResult<()>;

    /// Roll back the active transaction.
    fn rollback(&mut self) -> MigrateResult<()>;
}

/// An open transaction that is always finished exactly once.
///
/// [`commit`](Self::commit) and [`rollback`](Self::rollback) consume the
/// guard. A guard dropped without either (early return, panic while
/// unwinding) rolls the transaction back.
pub struct TransactionGuard<'a, S: ScriptSession + ?Sized> {
    session: &'a mut S,
    finished: bool,
}

impl<'a, S: ScriptSession + ?Sized> TransactionGuard<'a, S> {
    /// Begin a transaction on the session.
    pub fn begin(session: &'a mut S) -> MigrateResult<Self> {
        session.begin()?;
        Ok(Self {
            session,
            finished: false,
        })
    }

    /// Execute a statement inside the transaction.
    pub fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        self.session.execute(sql)
    }

    /// Commit the transaction.
    pub fn commit(mut self) -> MigrateResult<()> {
        self.finished = true;
        self.session.commit()
    }

    /// Roll back the transaction.
    pub fn rollback(mut self) -> MigrateResult<()> {
        self.finished = true;
        self.session.rollback()
    }
}

impl<S: ScriptSession + ?Sized> Drop for TransactionGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(err) = self.session.rollback() {
                warn!(error = %err, "Rollback of abandoned transaction failed");
            }
        }
    }
}

/// Execute the statements of one script file in a single transaction.
///
/// The outcome is recorded in `report`. An `Err` is returned only when the
/// transaction itself cannot be started or finished; statement failures are
/// never returned.
pub fn execute_file<S: ScriptSession + ?Sized>(
    session: &mut S,
    file_name: &str,
    statements: &[String],
    report: &mut ScriptReport,
) -> MigrateResult<FileStatus> {
    execute_file_with_checksum(session, file_name, statements, None, report)
}

pub(crate) fn execute_file_with_checksum<S: ScriptSession + ?Sized>(
    session: &mut S,
    file_name: &str,
    statements: &[String],
    checksum: Option<String>,
    report: &mut ScriptReport,
) -> MigrateResult<FileStatus> {
    let mut tx = TransactionGuard::begin(session)?;
    let mut executed = 0;
    let mut failed = false;

    for statement in statements {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }

        match tx.execute(sql) {
            Ok(()) => {
                executed += 1;
                report.statements_executed += 1;
                debug!(file = file_name, statement = executed, "Statement executed");
            }
            Err(err) => {
                warn!(file = file_name, error = %err, "Statement failed, rolling back file");
                report.push_error(ErrorRecord::new(
                    file_name,
                    preview(sql, PREVIEW_MAX_CHARS),
                    err.message(),
                ));
                failed = true;
                break;
            }
        }
    }

    let status = if failed {
        tx.rollback()?;
        FileStatus::RolledBack
    } else {
        tx.commit()?;
        FileStatus::Committed
    };

    if status.is_success() {
        report.files_succeeded += 1;
    } else {
        report.files_failed += 1;
    }

    report.files.push(FileOutcome {
        file_name: file_name.to_string(),
        status,
        statements_executed: executed,
        checksum,
    });

    Ok(status)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording session used by the engine tests.

    use crate::error::{MigrateResult, MigrationError};

    use super::ScriptSession;

    /// Event observed by a [`RecordingSession`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Begin,
        Execute(String),
        Commit,
        Rollback,
    }

    /// Session that records calls and fails statements containing a marker.
    #[derive(Debug, Default)]
    pub struct RecordingSession {
        pub events: Vec<Event>,
        pub fail_marker: Option<String>,
        pub fail_begin: bool,
        pub committed: Vec<String>,
        pub pending: Vec<String>,
    }

    impl RecordingSession {
        pub fn failing_on(marker: &str) -> Self {
            Self {
                fail_marker: Some(marker.to_string()),
                ..Self::default()
            }
        }

        pub fn executed(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Execute(sql) => Some(sql.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl ScriptSession for RecordingSession {
        fn begin(&mut self) -> MigrateResult<()> {
            if self.fail_begin {
                return Err(MigrationError::transaction("cannot start transaction"));
            }
            self.events.push(Event::Begin);
            Ok(())
        }

        fn execute(&mut self, sql: &str) -> MigrateResult<()> {
            self.events.push(Event::Execute(sql.to_string()));
            match &self.fail_marker {
                Some(marker) if sql.contains(marker.as_str()) => Err(MigrationError::database(
                    format!("Table unknown: {marker}"),
                )),
                _ => {
                    self.pending.push(sql.to_string());
                    Ok(())
                }
            }
        }

        fn commit(&mut self) -> MigrateResult<()> {
            self.events.push(Event::Commit);
            self.committed.append(&mut self.pending);
            Ok(())
        }

        fn rollback(&mut self) -> MigrateResult<()> {
            self.events.push(Event::Rollback);
            self.pending.clear();
            Ok(())
        }
    }
}
