//! Tool configuration.

use std::path::{Path, PathBuf};

/// dbmint configuration.
#[derive(Debug, Clone)]
pub struct MintConfig {
    /// Directory every user supplied file and directory name is relative to
    pub mount_dir: PathBuf,
    /// C preprocessor used to expand the DBML schema
    pub preprocessor: String,
    /// DBML to SQL generator
    pub schema_generator: String,
    /// SQL engine CLI operating on database files
    pub sql_engine: String,
}

impl MintConfig {
    /// Resolves a mount-relative name to a full path.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.mount_dir.join(name)
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            mount_dir: PathBuf::from("/mnt"),
            preprocessor: "cpp".to_string(),
            schema_generator: "dbml_sqlite".to_string(),
            sql_engine: "sqlite3".to_string(),
        }
    }
}
