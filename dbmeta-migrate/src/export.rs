//! Export of a live database into ordered scripts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::Backend;
use crate::error::{MigrateResult, MigrationError};
use crate::introspect::Introspector;
use crate::sql::ScriptWriter;

/// Summary of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    /// Scripts written, in execution order.
    pub files: Vec<PathBuf>,
    /// Number of domains exported.
    pub domains: usize,
    /// Number of tables exported.
    pub tables: usize,
    /// Number of procedures exported.
    pub procedures: usize,
}

impl ExportResult {
    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} domain(s), {} table(s), {} procedure(s) in {} file(s)",
            self.domains,
            self.tables,
            self.procedures,
            self.files.len()
        )
    }
}

/// Reads a database through its backend and writes it out as scripts.
pub struct ScriptExporter<B: Backend> {
    backend: B,
    writer: ScriptWriter,
}

impl<B> ScriptExporter<B>
where
    B: Backend,
    B::Session: Introspector,
{
    /// Create an exporter.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            writer: ScriptWriter::new(),
        }
    }

    /// Export the database at `target` into `output_dir`.
    ///
    /// Any failure is returned; nothing is collected into a report.
    pub fn export(&self, target: &str, output_dir: impl AsRef<Path>) -> MigrateResult<ExportResult> {
        let output_dir = output_dir.as_ref();

        if target.trim().is_empty() {
            return Err(MigrationError::config("Connection string is empty."));
        }
        if output_dir.as_os_str().is_empty() {
            return Err(MigrationError::config("Output directory is empty."));
        }

        let mut session = self.backend.connect(target)?;
        let metadata = session.read_all()?;
        let files = self.writer.write_all(&metadata, output_dir)?;

        let result = ExportResult {
            files,
            domains: metadata.domains.len(),
            tables: metadata.tables.len(),
            procedures: metadata.procedures.len(),
        };
        info!(output = %output_dir.display(), "Exported {}", result.summary());
        Ok(result)
    }
}
