//! `dbmeta build-db` command - Create a database and run the scripts.

use dbmeta_migrate::{BuildOptions, DatabaseBuilder};
use dbmeta_sqlite::SqliteBackend;
use tracing::debug;

use crate::cli::BuildDbArgs;
use crate::commands::print_report;
use crate::config::{resolve_dir, Config};
use crate::error::CliResult;

/// Run the build-db command. Returns whether the run was clean.
pub fn run(args: BuildDbArgs, config: &Config) -> CliResult<bool> {
    let scripts_dir = resolve_dir(
        args.scripts_dir,
        config.scripts.directory.as_ref(),
        "Scripts directory",
    )?;

    let mut create = config.database.create_options();
    if args.overwrite {
        create = create.overwrite(true);
    }

    let options = BuildOptions::new()
        .database_file_name(
            args.db_name
                .unwrap_or_else(|| config.database.file_name.clone()),
        )
        .create_options(create)
        .script_extension(config.scripts.extension.as_str());
    debug!(?options, "Build options");

    let report = DatabaseBuilder::with_options(SqliteBackend::new(), options)
        .build(&args.db_dir, &scripts_dir)?;

    print_report(args.format, &report)?;
    Ok(report.succeeded())
}
