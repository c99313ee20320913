//! `dbmeta export-scripts` command - Write database metadata as scripts.

use dbmeta_migrate::ScriptExporter;
use dbmeta_sqlite::SqliteBackend;

use crate::cli::ExportScriptsArgs;
use crate::config::{get_database_url, resolve_dir, Config};
use crate::error::CliResult;
use crate::output;

/// Run the export-scripts command.
pub fn run(args: ExportScriptsArgs, config: &Config) -> CliResult<bool> {
    let url = get_database_url(args.database.as_deref(), config)?;
    let output_dir = resolve_dir(
        args.output_dir,
        config.export.directory.as_ref(),
        "Output directory",
    )?;

    output::header("Exporting database metadata");
    output::kv("Output", &output_dir.display().to_string());
    output::newline();

    let result = ScriptExporter::new(SqliteBackend::new()).export(&url, &output_dir)?;

    for file in &result.files {
        output::list_item(&file.display().to_string());
    }
    output::newline();
    output::success(&format!("Exported {}", result.summary()));

    if result.domains == 0 && result.procedures == 0 {
        output::warn("SQLite has no domains or stored procedures; those scripts are empty");
    }

    Ok(true)
}
