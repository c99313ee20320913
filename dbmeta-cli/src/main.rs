//! dbmeta CLI - Build, update and export databases from SQL scripts.

use std::process::ExitCode;

use clap::Parser;

use dbmeta_cli::cli::{Cli, Command};
use dbmeta_cli::commands;
use dbmeta_cli::config::Config;
use dbmeta_cli::error::CliResult;
use dbmeta_cli::{logging, output};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::newline();
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<bool> {
    let config = Config::load_or_default(&cli.config)?;

    // Run the appropriate command
    match cli.command {
        Command::BuildDb(args) => commands::build::run(args, &config),
        Command::UpdateDb(args) => commands::update::run(args, &config),
        Command::ExportScripts(args) => commands::export::run(args, &config),
    }
}
