//! Database backend abstraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MigrateResult;
use crate::executor::ScriptSession;

/// Options used when creating a fresh database file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOptions {
    /// Page size in bytes.
    pub page_size: u32,
    /// Flush every write to disk before returning.
    pub forced_writes: bool,
    /// Replace an existing database file.
    pub overwrite: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            page_size: 4096,
            forced_writes: true,
            overwrite: false,
        }
    }
}

impl CreateOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Enable or disable forced writes.
    pub fn forced_writes(mut self, forced_writes: bool) -> Self {
        self.forced_writes = forced_writes;
        self
    }

    /// Allow replacing an existing database file.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A database engine the build, update and export runs can drive.
pub trait Backend {
    /// Session type opened by [`Backend::open`] and [`Backend::connect`].
    type Session: ScriptSession;

    /// Create an empty database file at `path`.
    fn create_database(&self, path: &Path, options: &CreateOptions) -> MigrateResult<()>;

    /// Open a session to the database file at `path`.
    ///
    /// The path is used as is, never parsed as a connection string.
    fn open(&self, path: &Path) -> MigrateResult<Self::Session>;

    /// Open a session to an existing database.
    ///
    /// `target` is a backend-specific connection string or path.
    fn connect(&self, target: &str) -> MigrateResult<Self::Session>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_options_builder() {
        let options = CreateOptions::new()
            .page_size(8192)
            .forced_writes(false)
            .overwrite(true);

        assert_eq!(options.page_size, 8192);
        assert!(!options.forced_writes);
        assert!(options.overwrite);
    }

    #[test]
    fn test_create_options_default() {
        let options = CreateOptions::default();
        assert_eq!(options.page_size, 4096);
        assert!(options.forced_writes);
        assert!(!options.overwrite);
    }
}
