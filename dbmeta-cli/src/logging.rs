//! Log output for the CLI.
//!
//! Events go to stderr so reports on stdout stay machine-readable.
//!
//! - `RUST_LOG` - Filter directives; overrides `-v`
//! - `DBMETA_LOG_FORMAT=compact|pretty|json` - Output format (default: compact)

use std::env;

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "DBMETA_LOG_FORMAT";

/// Level implied by the number of `-v` flags.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for_verbosity(verbose);
        EnvFilter::try_new(format!(
            "warn,dbmeta={level},dbmeta_cli={level},dbmeta_migrate={level},dbmeta_sqlite={level}"
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: u8) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(true);

    // try_init fails only if a subscriber is already installed.
    let _ = match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().try_init(),
        Ok("pretty") => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };
}
