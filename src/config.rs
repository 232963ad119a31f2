//! Runtime configuration: where documents live and how the REPL behaves.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Settings read from an optional JSON file. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one `<table>.json` document per table.
    pub data_dir: PathBuf,
    /// Document holding every table schema.
    pub metadata_file: PathBuf,
    /// Ask before `drop_table` and `delete`.
    pub confirm_destructive: bool,
    /// Memoize `select` results until the table changes. Only safe when no
    /// other process writes the documents.
    pub cache_selects: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            metadata_file: PathBuf::from("db_meta.json"),
            confirm_destructive: true,
            cache_selects: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns [DbError::Config] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| DbError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.metadata_file.clone()
    }
}
