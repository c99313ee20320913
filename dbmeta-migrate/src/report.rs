//! Run reports for build and update operations.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in a statement preview.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Run-level identifier used for build failures outside any script file.
pub const BUILD_RUN_ID: &str = "<build-db>";
/// Run-level identifier used for update failures outside any script file.
pub const UPDATE_RUN_ID: &str = "<update-db>";

/// Statement marker for a script file that could not be read.
pub const READ_FILE_MARKER: &str = "<read file>";
/// Statement marker for a failed database creation.
pub const CREATE_DATABASE_MARKER: &str = "<create database>";
/// Statement marker for build failures after the database was created.
pub const CREATE_OPEN_MARKER: &str = "<create/open db>";
/// Statement marker for a connection that could not be opened.
pub const OPEN_CONNECTION_MARKER: &str = "<open connection>";
/// Statement marker for update failures outside the statement loop.
pub const CONNECT_EXECUTE_MARKER: &str = "<connect/execute>";

/// A recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Script file name, or a run-level placeholder.
    pub file_name: String,
    /// Shortened offending statement, or a placeholder marker.
    pub statement_preview: String,
    /// Message reported by the engine.
    pub message: String,
}

impl ErrorRecord {
    /// Create a new error record.
    pub fn new(
        file_name: impl Into<String>,
        statement_preview: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            statement_preview: statement_preview.into(),
            message: message.into(),
        }
    }
}

/// Final state of one script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// All statements ran and the transaction was committed.
    Committed,
    /// A statement failed and the transaction was rolled back.
    RolledBack,
    /// The file could not be read; nothing was executed.
    Unreadable,
}

impl FileStatus {
    /// Whether the file counts as succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled back"),
            Self::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Per-file detail kept alongside the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Script file name.
    pub file_name: String,
    /// What happened to the file.
    pub status: FileStatus,
    /// Statements that ran successfully (including ones later rolled back).
    pub statements_executed: usize,
    /// SHA-256 of the script text, when it could be read.
    pub checksum: Option<String>,
}

/// Counters and errors shared by build and update runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    /// Script files discovered.
    pub files_total: usize,
    /// Files committed.
    pub files_succeeded: usize,
    /// Files rolled back or unreadable.
    pub files_failed: usize,
    /// Statements executed successfully.
    pub statements_executed: usize,
    /// Recorded failures, in order.
    pub errors: Vec<ErrorRecord>,
    /// Per-file outcomes, in processing order.
    pub files: Vec<FileOutcome>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Run duration in milliseconds.
    pub duration_ms: i64,
}

impl Default for ScriptReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptReport {
    /// Create an empty report stamped with the current time.
    pub fn new() -> Self {
        Self {
            files_total: 0,
            files_succeeded: 0,
            files_failed: 0,
            statements_executed: 0,
            errors: Vec::new(),
            files: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: 0,
        }
    }

    /// Record an error.
    pub fn push_error(&mut self, error: ErrorRecord) {
        self.errors.push(error);
    }

    /// Record a file that could not be read.
    pub fn record_unreadable(&mut self, file_name: &str, message: impl Into<String>) {
        self.push_error(ErrorRecord::new(file_name, READ_FILE_MARKER, message));
        self.files_failed += 1;
        self.files.push(FileOutcome {
            file_name: file_name.to_string(),
            status: FileStatus::Unreadable,
            statements_executed: 0,
            checksum: None,
        });
    }

    /// Whether the run finished without any error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.files_failed == 0
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self) {
        let now = Utc::now();
        self.duration_ms = (now - self.started_at).num_milliseconds();
        self.finished_at = Some(now);
    }

    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Files: total={}, ok={}, failed={}",
            self.files_total, self.files_succeeded, self.files_failed
        )?;
        writeln!(f, "Statements executed: {}", self.statements_executed)?;

        if self.errors.is_empty() {
            return writeln!(f, "Errors: none");
        }

        writeln!(f)?;
        writeln!(f, "Errors: {}", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "- File: {}", error.file_name)?;
            writeln!(f, "  Statement: {}", error.statement_preview)?;
            writeln!(f, "  Message: {}", error.message)?;
        }
        Ok(())
    }
}

/// Outcome of building a fresh database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Path of the database file.
    pub database_path: PathBuf,
    /// Whether the database file was created.
    pub database_created: bool,
    /// Script counters and errors.
    #[serde(flatten)]
    pub run: ScriptReport,
}

impl BuildReport {
    /// Create a report for a database at `database_path`.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            database_created: false,
            run: ScriptReport::new(),
        }
    }

    /// Whether the database was created and every script committed.
    pub fn succeeded(&self) -> bool {
        self.database_created && self.run.is_clean()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== BUILD-DB REPORT ===")?;
        writeln!(f, "DB Path: {}", self.database_path.display())?;
        writeln!(f, "DB Created: {}", self.database_created)?;
        self.run.fmt_body(f)
    }
}

/// Outcome of updating an existing database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Whether the connection to the database was opened.
    pub connection_opened: bool,
    /// Script counters and errors.
    #[serde(flatten)]
    pub run: ScriptReport,
}

impl Default for UpdateReport {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateReport {
    /// Create an empty update report.
    pub fn new() -> Self {
        Self {
            connection_opened: false,
            run: ScriptReport::new(),
        }
    }

    /// Whether the run recorded no error.
    ///
    /// An empty scripts directory never opens a connection and still
    /// succeeds.
    pub fn succeeded(&self) -> bool {
        self.run.is_clean()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== UPDATE-DB REPORT ===")?;
        writeln!(
            f,
            "Status: {}",
            if self.succeeded() { "SUCCESS" } else { "FAILED" }
        )?;
        writeln!(f, "Connection opened: {}", self.connection_opened)?;
        self.run.fmt_body(f)
    }
}

/// Shorten a statement for display in an error record.
///
/// Line breaks become spaces, surrounding whitespace is trimmed, and text
/// longer than `max_chars` characters is cut with `...` appended.
pub fn preview(statement: &str, max_chars: usize) -> String {
    let flat = statement.replace(['\r', '\n'], " ");
    let flat = flat.trim();

    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat.to_string(),
    }
}
