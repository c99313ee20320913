//! `dbmeta update-db` command - Run the scripts against an existing database.

use dbmeta_migrate::DatabaseUpdater;
use dbmeta_sqlite::SqliteBackend;

use crate::cli::UpdateDbArgs;
use crate::commands::print_report;
use crate::config::{get_database_url, resolve_dir, Config};
use crate::error::CliResult;

/// Run the update-db command. Returns whether the run was clean.
pub fn run(args: UpdateDbArgs, config: &Config) -> CliResult<bool> {
    let url = get_database_url(args.database.as_deref(), config)?;
    let scripts_dir = resolve_dir(
        args.scripts_dir,
        config.scripts.directory.as_ref(),
        "Scripts directory",
    )?;

    let report = DatabaseUpdater::new(SqliteBackend::new())
        .script_extension(config.scripts.extension.as_str())
        .update(&url, &scripts_dir)?;

    print_report(args.format, &report)?;
    Ok(report.succeeded())
}
