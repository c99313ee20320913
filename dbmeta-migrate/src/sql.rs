//! Script generation from exported metadata.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::MigrateResult;
use crate::introspect::{DbMetadata, DomainInfo, ParameterInfo, ProcedureInfo, TableInfo};

/// File name of the domains script.
pub const DOMAINS_FILE: &str = "01_domains.sql";
/// File name of the tables script.
pub const TABLES_FILE: &str = "02_tables.sql";
/// File name of the procedures script.
pub const PROCEDURES_FILE: &str = "03_procedures.sql";

/// Terminator used around procedure bodies.
const BODY_TERMINATOR: &str = "^";

/// Writes metadata as SQL scripts that the build and update runs can replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptWriter;

impl ScriptWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self
    }

    /// Render the domains script.
    pub fn domains_script(&self, domains: &[DomainInfo]) -> String {
        let mut sql = String::from("-- Export: DOMAINS\n\n");

        for domain in domains {
            let _ = write!(sql, "CREATE DOMAIN {} {}", domain.name, domain.type_sql);
            if domain.not_null {
                sql.push_str(" NOT NULL");
            }
            sql.push_str(";\n\n");
        }

        sql
    }

    /// Render the tables script.
    pub fn tables_script(&self, tables: &[TableInfo]) -> String {
        let mut sql = String::from("-- Export: TABLES\n\n");

        for table in tables {
            let _ = writeln!(sql, "CREATE TABLE {} (", table.name);

            let mut lines: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    let mut line = format!("    {}", c.name);
                    // Untyped SQLite columns have no declared type.
                    if !c.type_or_domain.is_empty() {
                        line.push(' ');
                        line.push_str(&c.type_or_domain);
                    }
                    if c.not_null {
                        line.push_str(" NOT NULL");
                    }
                    line
                })
                .collect();

            if let Some(pk) = &table.primary_key {
                lines.push(format!(
                    "    CONSTRAINT {} PRIMARY KEY ({})",
                    pk.constraint_name,
                    pk.columns.join(", ")
                ));
            }

            sql.push_str(&lines.join(",\n"));
            sql.push_str("\n);\n\n");
        }

        sql
    }

    /// Render the procedures script.
    ///
    /// Bodies are wrapped in `SET TERM ^ ;` so their inner `;` survive
    /// statement splitting.
    pub fn procedures_script(&self, procedures: &[ProcedureInfo]) -> String {
        let mut sql = String::from("-- Export: PROCEDURES\n");
        let _ = writeln!(sql, "SET TERM {BODY_TERMINATOR} ;\n");

        for procedure in procedures {
            let _ = writeln!(sql, "CREATE PROCEDURE {}", procedure.name);

            if !procedure.inputs.is_empty() {
                sql.push_str("(\n");
                sql.push_str(&parameter_list(&procedure.inputs));
                sql.push_str("\n)\n");
            }

            if !procedure.outputs.is_empty() {
                sql.push_str("RETURNS (\n");
                sql.push_str(&parameter_list(&procedure.outputs));
                sql.push_str("\n)\n");
            }

            sql.push_str("AS\n");
            sql.push_str(procedure.body.trim_end());
            let _ = writeln!(sql, "\n{BODY_TERMINATOR}\n");
        }

        let _ = writeln!(sql, "SET TERM ; {BODY_TERMINATOR}\n");
        sql
    }

    /// Write the three scripts into `dir`, creating it if needed.
    pub fn write_all(&self, metadata: &DbMetadata, dir: &Path) -> MigrateResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let scripts = [
            (DOMAINS_FILE, self.domains_script(&metadata.domains)),
            (TABLES_FILE, self.tables_script(&metadata.tables)),
            (PROCEDURES_FILE, self.procedures_script(&metadata.procedures)),
        ];

        let mut written = Vec::with_capacity(scripts.len());
        for (name, content) in scripts {
            let path = dir.join(name);
            std::fs::write(&path, content)?;
            debug!(path = %path.display(), "Wrote script");
            written.push(path);
        }

        Ok(written)
    }
}

fn parameter_list(params: &[ParameterInfo]) -> String {
    params
        .iter()
        .map(|p| format!("    {} {}", p.name, p.type_sql))
        .collect::<Vec<_>>()
        .join(",\n")
}
