//! Script file discovery and loading.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};

/// Default script file extension.
pub const SCRIPT_EXTENSION: &str = "sql";

/// A directory of SQL scripts executed in file-name order.
///
/// Numeric prefixes such as `01_`, `02_`, `03_` encode dependency order
/// (domains before tables before procedures), so the ordering must not depend
/// on the platform or the current locale.
#[derive(Debug, Clone)]
pub struct ScriptDirectory {
    dir: PathBuf,
    extension: String,
}

impl ScriptDirectory {
    /// Create a script directory with the default `sql` extension.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: SCRIPT_EXTENSION.to_string(),
        }
    }

    /// Set the script extension (without the leading dot).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Get the directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List script files in execution order.
    pub fn list(&self) -> MigrateResult<Vec<PathBuf>> {
        if self.dir.as_os_str().is_empty() {
            return Err(MigrationError::config("Scripts directory is empty."));
        }

        if !self.dir.is_dir() {
            return Err(MigrationError::DirectoryNotFound(self.dir.clone()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && self.matches_extension(&path) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| compare_file_names(&file_name(a), &file_name(b)));

        debug!(dir = %self.dir.display(), count = files.len(), "Discovered scripts");
        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

/// File name of a path as displayed in reports.
///
/// Names that are not valid UTF-8 are converted lossily.
pub fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
}

/// Ordinal, case-insensitive comparison of file names.
///
/// Characters are compared after simple one-to-one uppercase mapping; a
/// character whose uppercase form has several characters (such as `ß`) is
/// compared as itself. Names that are equal ignoring case fall back to a
/// plain ordinal comparison so the order is total and stable.
pub fn compare_file_names(a: &str, b: &str) -> Ordering {
    let folded = a.chars().map(simple_uppercase).cmp(b.chars().map(simple_uppercase));

    folded.then_with(|| a.cmp(b))
}

fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Read a script file as UTF-8, dropping a leading byte order mark.
pub fn read_script(path: &Path) -> MigrateResult<String> {
    let text = std::fs::read_to_string(path)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Compute a hex SHA-256 checksum of script content.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
