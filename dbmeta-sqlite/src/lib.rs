//! SQLite backend for dbmeta.
//!
//! This crate lets the dbmeta script engine create, update and export SQLite
//! databases through `rusqlite`.
//!
//! # Features
//!
//! - Database creation with page size and durability options
//! - Script sessions with explicit `BEGIN`/`COMMIT`/`ROLLBACK`; SQLite DDL is
//!   transactional, so a failing script leaves no trace
//! - Table, column and primary key introspection for export
//! - In-memory and file-based databases
//!
//! # Example
//!
//! ```rust,ignore
//! use dbmeta_migrate::DatabaseUpdater;
//! use dbmeta_sqlite::SqliteBackend;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = DatabaseUpdater::new(SqliteBackend::new())
//!         .update("sqlite://./app.db", "./scripts")?;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod connection;
pub mod error;
pub mod introspect;

pub use backend::{SqliteBackend, APPLICATION_ID};
pub use config::{DatabasePath, JournalMode, SqliteConfig, SynchronousMode};
pub use connection::SqliteSession;
pub use error::{SqliteError, SqliteResult};
pub use introspect::primary_key_name;
