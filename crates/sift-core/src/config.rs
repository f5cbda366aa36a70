//! Runtime configuration
//!
//! File locations are explicit configuration passed down from the entry
//! point rather than process-wide constants, so tests and the server can
//! point at their own databases and taxonomy files.

use std::path::{Path, PathBuf};

/// Paths and knobs shared by the CLI and server entry points
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Optional taxonomy file extending the built-in categorization rules
    pub taxonomy_path: Option<PathBuf>,
}

impl Config {
    pub fn new(db_path: impl Into<PathBuf>, taxonomy_path: Option<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            taxonomy_path,
        }
    }

    /// Default database location under the platform data directory
    /// (e.g. ~/.local/share/sift/sift.db on Linux), falling back to the
    /// working directory when no data dir is available.
    pub fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("sift").join("sift.db"))
            .unwrap_or_else(|| PathBuf::from("sift.db"))
    }

    pub fn taxonomy_path(&self) -> Option<&Path> {
        self.taxonomy_path.as_deref()
    }
}
