//! CLI error types and result alias.

use dbmeta_migrate::MigrationError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(dbmeta::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(dbmeta::config),
        help("check the command-line flags and dbmeta.toml")
    )]
    Config(String),

    /// Scripts directory missing
    #[error("{0}")]
    #[diagnostic(code(dbmeta::scripts))]
    Scripts(String),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(dbmeta::database))]
    Database(String),

    /// Export error
    #[error("Export error: {0}")]
    #[diagnostic(code(dbmeta::export))]
    Export(String),

    /// Report serialization error
    #[error("Output error: {0}")]
    #[diagnostic(code(dbmeta::output))]
    Output(String),
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Config(msg) => CliError::Config(msg),
            MigrationError::Io(e) => CliError::Io(e),
            err @ MigrationError::DirectoryNotFound(_) => CliError::Scripts(err.to_string()),
            MigrationError::Introspection(msg) => CliError::Export(msg),
            other => CliError::Database(other.message()),
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(format!("Failed to serialize report: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_error_conversion() {
        let err: CliError = MigrationError::config("Scripts directory is empty.").into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: Scripts directory is empty.");

        let err: CliError = MigrationError::connection("unable to open database file").into();
        assert_eq!(err.to_string(), "Database error: unable to open database file");

        let err: CliError = MigrationError::introspection("no metadata").into();
        assert!(matches!(err, CliError::Export(_)));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = CliError::Config("missing".into());
        assert_eq!(err.code().unwrap().to_string(), "dbmeta::config");
    }
}
