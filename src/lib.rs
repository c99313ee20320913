//! # dbmeta
//!
//! Build, update and export relational databases from ordered SQL script
//! directories.
//!
//! dbmeta provides:
//! - Database creation followed by execution of every script in a directory
//! - Updates of an existing database from a further script directory
//! - One transaction per script file, with `SET TERM` terminator switching
//! - Plain-text and JSON run reports listing every failed statement
//! - Export of database metadata into `01_domains.sql`, `02_tables.sql`
//!   and `03_procedures.sql`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dbmeta::prelude::*;
//!
//! fn main() -> Result<(), dbmeta::Error> {
//!     let report = DatabaseBuilder::new(SqliteBackend::new()).build("./db", "./scripts")?;
//!     println!("{report}");
//!
//!     if !report.succeeded() {
//!         std::process::exit(1);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Script engine: splitting, execution, reports and export.
pub mod migrate {
    pub use dbmeta_migrate::*;
}

/// SQLite backend.
pub mod sqlite {
    pub use dbmeta_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        BuildReport, DatabaseBuilder, DatabaseUpdater, ScriptExporter, UpdateReport,
    };
    pub use crate::sqlite::SqliteBackend;
}

// Re-export key types at the crate root
pub use migrate::{MigrateResult as Result, MigrationError as Error};
