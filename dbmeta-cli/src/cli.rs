//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// dbmeta - Build, update and export databases from SQL scripts
#[derive(Parser, Debug)]
#[command(name = "dbmeta")]
#[command(version)]
#[command(
    about = "dbmeta - Build, update and export databases from SQL scripts",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new database and run every script of a directory against it
    BuildDb(BuildDbArgs),

    /// Run every script of a directory against an existing database
    UpdateDb(UpdateDbArgs),

    /// Export domains, tables and procedures of a database as SQL scripts
    ExportScripts(ExportScriptsArgs),
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON document
    Json,
}

// =============================================================================
// Build Command
// =============================================================================

/// Arguments for the `build-db` command
#[derive(Args, Debug)]
pub struct BuildDbArgs {
    /// Directory the database file is created in
    #[arg(long)]
    pub db_dir: PathBuf,

    /// Directory containing the SQL scripts
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,

    /// Database file name
    #[arg(long)]
    pub db_name: Option<String>,

    /// Replace an existing database file
    #[arg(long)]
    pub overwrite: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

// =============================================================================
// Update Command
// =============================================================================

/// Arguments for the `update-db` command
#[derive(Args, Debug)]
pub struct UpdateDbArgs {
    /// Database connection URL or path
    #[arg(long)]
    pub database: Option<String>,

    /// Directory containing the SQL scripts
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

// =============================================================================
// Export Command
// =============================================================================

/// Arguments for the `export-scripts` command
#[derive(Args, Debug)]
pub struct ExportScriptsArgs {
    /// Database connection URL or path
    #[arg(long)]
    pub database: Option<String>,

    /// Directory the scripts are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_db() {
        let cli = Cli::try_parse_from([
            "dbmeta",
            "-vv",
            "build-db",
            "--db-dir",
            "out",
            "--scripts-dir",
            "scripts",
            "--overwrite",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
        match cli.command {
            Command::BuildDb(args) => {
                assert_eq!(args.db_dir, PathBuf::from("out"));
                assert_eq!(args.scripts_dir, Some(PathBuf::from("scripts")));
                assert!(args.overwrite);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_db_requires_db_dir() {
        assert!(Cli::try_parse_from(["dbmeta", "build-db", "--scripts-dir", "s"]).is_err());
    }
}
