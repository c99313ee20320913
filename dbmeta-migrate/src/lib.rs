//! # dbmeta-migrate
//!
//! Script engine for dbmeta.
//!
//! This crate provides functionality for:
//! - Splitting SQL script text into statements, honoring `SET TERM`
//! - Discovering script files in a directory in a stable order
//! - Executing each file inside its own transaction, fail-fast
//! - Building a fresh database or updating an existing one from scripts
//! - Accumulating run reports with counters and error records
//! - Exporting database metadata back into script files
//!
//! ## Architecture
//!
//! Database specifics live behind the [`Backend`] trait. The engine only
//! knows how to create a database, open a [`ScriptSession`] and drive
//! transactions through it.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Scripts Dir  │────▶│ Splitter       │────▶│ Executor    │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                                                    │
//!                                                    ▼
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Script Files │◀────│ Script Writer  │     │ Run Report  │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                              ▲
//!                              │
//!                      ┌────────────────┐
//!                      │ Introspector   │
//!                      └────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use dbmeta_migrate::{DatabaseBuilder, DatabaseUpdater};
//! use dbmeta_sqlite::SqliteBackend;
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create ./db/database.db and run every script
//!     let report = DatabaseBuilder::new(SqliteBackend::new()).build("./db", "./scripts")?;
//!     println!("{report}");
//!
//!     // Apply a second batch to the same database
//!     let report = DatabaseUpdater::new(SqliteBackend::new())
//!         .update("sqlite://./db/database.db", "./scripts/v2")?;
//!     println!("{report}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Script Files
//!
//! Scripts are plain `.sql` files run in name order. Each file is one
//! transaction: a failing statement discards the whole file.
//!
//! ```text
//! scripts/
//! ├── 01_tables.sql
//! ├── 02_views.sql
//! └── 03_triggers.sql     # may switch terminators with SET TERM ^ ;
//! ```

pub mod backend;
pub mod engine;
pub mod error;
pub mod executor;
pub mod export;
pub mod file;
pub mod introspect;
pub mod report;
pub mod script;
pub mod sql;

// Re-exports
pub use backend::{Backend, CreateOptions};
pub use engine::{BuildOptions, DatabaseBuilder, DatabaseUpdater, DEFAULT_DATABASE_FILE_NAME};
pub use error::{MigrateResult, MigrationError};
pub use executor::{execute_file, ScriptSession, TransactionGuard};
pub use export::{ExportResult, ScriptExporter};
pub use file::{checksum, compare_file_names, read_script, ScriptDirectory, SCRIPT_EXTENSION};
pub use introspect::{
    ColumnInfo, DbMetadata, DomainInfo, Introspector, ParameterInfo, PrimaryKeyInfo,
    ProcedureInfo, TableInfo,
};
pub use report::{
    preview, BuildReport, ErrorRecord, FileOutcome, FileStatus, ScriptReport, UpdateReport,
    PREVIEW_MAX_CHARS,
};
pub use script::{
    is_set_term, parse_set_term, split_statements, split_statements_with, SplitState,
    DEFAULT_TERMINATOR,
};
pub use sql::{ScriptWriter, DOMAINS_FILE, PROCEDURES_FILE, TABLES_FILE};
