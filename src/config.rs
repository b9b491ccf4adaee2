//! Configuration for where the ledger database lives on disk.
//!
//! The config is an explicitly constructed value that the caller passes into
//! [LedgerStore::open](crate::LedgerStore::open). How it is produced (CLI
//! flags, a config file, hard-coded defaults) is up to the surrounding
//! application.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The location of the SQLite file backing a
/// [LedgerStore](crate::LedgerStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// The directory holding the database file. Created on open if absent.
    pub db_dir: PathBuf,
    /// The name of the database file within `db_dir`.
    pub db_name: String,
}

impl StoreConfig {
    /// Create a config for a database file `db_name` inside `db_dir`.
    pub fn new(db_dir: impl Into<PathBuf>, db_name: impl Into<String>) -> Self {
        Self {
            db_dir: db_dir.into(),
            db_name: db_name.into(),
        }
    }

    /// The full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.db_dir.join(&self.db_name)
    }

    /// The directory that must exist before the database file can be opened.
    pub fn database_dir(&self) -> &Path {
        &self.db_dir
    }
}

impl Default for StoreConfig {
    /// A ledger stored under `.pocket_ledger/DB` in the working directory.
    fn default() -> Self {
        Self::new(Path::new(".pocket_ledger").join("DB"), "pocket_ledger.db")
    }
}

#[cfg(test)]
mod store_config_tests {
    use std::path::Path;

    use super::StoreConfig;

    #[test]
    fn database_path_joins_dir_and_name() {
        let config = StoreConfig::new("/tmp/ledger", "test.db");

        assert_eq!(config.database_path(), Path::new("/tmp/ledger/test.db"));
    }

    #[test]
    fn default_points_at_hidden_app_dir() {
        let config = StoreConfig::default();

        assert_eq!(
            config.database_path(),
            Path::new(".pocket_ledger").join("DB").join("pocket_ledger.db")
        );
    }
}
