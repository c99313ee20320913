//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dbmeta_migrate::{CreateOptions, DEFAULT_DATABASE_FILE_NAME, SCRIPT_EXTENSION};

use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "dbmeta.toml";

/// Environment variable consulted when no database URL is configured
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// dbmeta CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Script directory configuration
    pub scripts: ScriptsConfig,

    /// Export configuration
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it
    /// does not exist
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL (supports `${VAR}` and `$VAR`)
    pub url: Option<String>,

    /// File name used by `build-db`
    pub file_name: String,

    /// Page size for new databases
    pub page_size: u32,

    /// Flush writes to disk while creating the database
    pub forced_writes: bool,

    /// Replace an existing database file on `build-db`
    pub overwrite: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let create = CreateOptions::default();
        Self {
            url: None,
            file_name: DEFAULT_DATABASE_FILE_NAME.to_string(),
            page_size: create.page_size,
            forced_writes: create.forced_writes,
            overwrite: create.overwrite,
        }
    }
}

impl DatabaseConfig {
    /// Database creation options
    pub fn create_options(&self) -> CreateOptions {
        CreateOptions::new()
            .page_size(self.page_size)
            .forced_writes(self.forced_writes)
            .overwrite(self.overwrite)
    }
}

/// Script directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Default scripts directory
    pub directory: Option<PathBuf>,

    /// Script file extension
    pub extension: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extension: SCRIPT_EXTENSION.to_string(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output directory
    pub directory: Option<PathBuf>,
}

/// Resolve the database URL.
///
/// The command-line flag wins, then `database.url` from the config file
/// (after environment expansion), then `DATABASE_URL`.
pub fn get_database_url(flag: Option<&str>, config: &Config) -> CliResult<String> {
    if let Some(url) = flag.map(str::trim).filter(|url| !url.is_empty()) {
        return Ok(url.to_string());
    }

    // Try config
    if let Some(ref url) = config.database.url {
        let expanded = expand_env_var(url);
        if !expanded.trim().is_empty() && !expanded.contains("${") {
            return Ok(expanded);
        }
    }

    // Try environment variable
    std::env::var(DATABASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            CliError::Config(format!(
                "Database URL not found. Pass --database, set {} or configure database.url in {}",
                DATABASE_URL_ENV, CONFIG_FILE_NAME
            ))
        })
}

/// Pick a directory from a flag or the config file
pub fn resolve_dir(
    flag: Option<PathBuf>,
    configured: Option<&PathBuf>,
    what: &str,
) -> CliResult<PathBuf> {
    flag.or_else(|| configured.cloned()).ok_or_else(|| {
        CliError::Config(format!(
            "{what} not set. Pass it on the command line or configure it in {CONFIG_FILE_NAME}"
        ))
    })
}

/// Expand environment variables in a string
pub fn expand_env_var(s: &str) -> String {
    let mut result = s.to_string();

    // Match ${VAR} pattern
    if let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        for cap in re.captures_iter(s) {
            if let Ok(value) = std::env::var(&cap[1]) {
                result = result.replace(&cap[0], &value);
            }
        }
    }

    // Also match $VAR pattern (no braces)
    if let Ok(re) = regex_lite::Regex::new(r"\$([A-Z_][A-Z0-9_]*)") {
        for cap in re.captures_iter(&result.clone()) {
            if let Ok(value) = std::env::var(&cap[1]) {
                result = result.replace(&cap[0], &value);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "sqlite://./app.db"
            page_size = 8192

            [scripts]
            directory = "sql"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("sqlite://./app.db"));
        assert_eq!(config.database.page_size, 8192);
        assert!(config.database.forced_writes);
        assert_eq!(config.database.file_name, DEFAULT_DATABASE_FILE_NAME);
        assert_eq!(config.scripts.directory, Some(PathBuf::from("sql")));
        assert_eq!(config.scripts.extension, "sql");
        assert_eq!(config.export.directory, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database]\noverwrite = true\n\n[export]\ndirectory = \"export\"\n")
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.database.overwrite);
        assert_eq!(config.export.directory, Some(PathBuf::from("export")));
        assert_eq!(config.scripts, ScriptsConfig::default());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database\nurl = 1").unwrap();

        assert!(matches!(Config::load(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_create_options() {
        let database = DatabaseConfig {
            page_size: 16384,
            forced_writes: false,
            ..DatabaseConfig::default()
        };

        let options = database.create_options();
        assert_eq!(options.page_size, 16384);
        assert!(!options.forced_writes);
        assert!(!options.overwrite);
    }

    #[test]
    fn test_flag_wins() {
        let mut config = Config::default();
        config.database.url = Some("from-config.db".into());

        let url = get_database_url(Some("from-flag.db"), &config).unwrap();
        assert_eq!(url, "from-flag.db");

        let url = get_database_url(None, &config).unwrap();
        assert_eq!(url, "from-config.db");
    }

    #[test]
    fn test_expand_env_var() {
        // PATH is set in any test environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_var("${PATH}/x"), format!("{path}/x"));
        assert_eq!(expand_env_var("$PATH"), path);
        assert_eq!(
            expand_env_var("${DBMETA_TEST_SURELY_UNSET_VAR}"),
            "${DBMETA_TEST_SURELY_UNSET_VAR}"
        );
    }

    #[test]
    fn test_resolve_dir() {
        let configured = PathBuf::from("from-config");
        assert_eq!(
            resolve_dir(Some("flag".into()), Some(&configured), "Scripts directory").unwrap(),
            PathBuf::from("flag")
        );
        assert_eq!(
            resolve_dir(None, Some(&configured), "Scripts directory").unwrap(),
            configured
        );
        assert!(resolve_dir(None, None, "Scripts directory").is_err());
    }
}
