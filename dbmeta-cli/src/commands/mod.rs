//! CLI command implementations.

use std::fmt::Display;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::output;

pub mod build;
pub mod export;
pub mod update;

/// Print a run report in the requested format.
pub(crate) fn print_report<R: Serialize + Display>(format: OutputFormat, report: &R) -> CliResult<()> {
    match format {
        OutputFormat::Text => output::report(&report.to_string()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
