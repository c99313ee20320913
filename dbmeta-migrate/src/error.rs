//! Error types for the script engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for script engine operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while building, updating or exporting a database.
///
/// Only configuration-class errors are meant to reach the caller of a build or
/// update run; everything else is downgraded into the run report.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller supplied an unusable argument (empty path, missing setting).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scripts directory does not exist.
    #[error("Scripts directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Database engine or driver error.
    #[error("Database error: {0}")]
    Database(String),

    /// Database file could not be created.
    #[error("Cannot create database: {0}")]
    CreateDatabase(String),

    /// Connection could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transaction could not be started, committed or rolled back.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Metadata could not be read from the database.
    #[error("Introspection error: {0}")]
    Introspection(String),

    /// General error.
    #[error("{0}")]
    Other(String),
}

impl MigrationError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a database creation error.
    pub fn create_database(msg: impl Into<String>) -> Self {
        Self::CreateDatabase(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transaction error.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create an introspection error.
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this error signals caller misuse rather than a runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// The underlying message without the category prefix.
    ///
    /// Report entries carry this so that the engine's own wording is shown.
    pub fn message(&self) -> String {
        match self {
            Self::Io(err) => err.to_string(),
            Self::DirectoryNotFound(_) => self.to_string(),
            Self::Config(msg)
            | Self::Database(msg)
            | Self::CreateDatabase(msg)
            | Self::Connection(msg)
            | Self::Transaction(msg)
            | Self::Introspection(msg)
            | Self::Other(msg) => msg.clone(),
        }
    }
}
