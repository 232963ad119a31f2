//! Persistence of the schema store and of each table's rows.
//!
//! Loading never fails: a missing document and a document that cannot be
//! parsed both read as empty. Saving rewrites the whole document.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;

use crate::config::Config;
use crate::error::Result;
use crate::schema::SchemaStore;
use crate::table::RowSet;

/// Where schemas and rows live between commands.
pub trait Storage {
    /// Reads every table schema; empty if nothing usable is stored.
    fn load_schemas(&self) -> SchemaStore;

    fn save_schemas(&mut self, schemas: &SchemaStore) -> Result<()>;

    /// Reads the rows of `table`; empty if nothing usable is stored.
    fn load_rows(&self, table: &str) -> RowSet;

    fn save_rows(&mut self, table: &str, rows: &RowSet) -> Result<()>;

    /// Forgets the rows of `table`. Removing rows that do not exist succeeds.
    fn remove_rows(&mut self, table: &str) -> Result<()>;
}

/// JSON documents on disk: one metadata document for all schemas and one
/// document per table under the data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    metadata_path: PathBuf,
    data_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(metadata_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata_path: metadata_path.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.metadata_path(), &config.data_dir)
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Path of the document holding the rows of `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.json"))
    }
}

impl Storage for JsonStorage {
    fn load_schemas(&self) -> SchemaStore {
        read_document(&self.metadata_path)
    }

    fn save_schemas(&mut self, schemas: &SchemaStore) -> Result<()> {
        write_document(&self.metadata_path, schemas)
    }

    fn load_rows(&self, table: &str) -> RowSet {
        read_document(&self.table_path(table))
    }

    fn save_rows(&mut self, table: &str, rows: &RowSet) -> Result<()> {
        write_document(&self.table_path(table), rows)
    }

    fn remove_rows(&mut self, table: &str) -> Result<()> {
        let path = self.table_path(table);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed table document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no document yet, starting empty");
            return T::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable document, starting empty");
            return T::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "corrupt document, starting empty");
        T::default()
    })
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer)?;
    buffer.push(b'\n');

    fs::write(path, buffer)?;
    tracing::debug!(path = %path.display(), "document written");
    Ok(())
}

/// Keeps everything in process memory. Used by tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    schemas: SchemaStore,
    tables: HashMap<String, RowSet>,
    /// Number of successful save calls, schemas and rows alike.
    pub writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_schemas(&self) -> SchemaStore {
        self.schemas.clone()
    }

    fn save_schemas(&mut self, schemas: &SchemaStore) -> Result<()> {
        self.schemas = schemas.clone();
        self.writes += 1;
        Ok(())
    }

    fn load_rows(&self, table: &str) -> RowSet {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    fn save_rows(&mut self, table: &str, rows: &RowSet) -> Result<()> {
        self.tables.insert(table.to_string(), rows.clone());
        self.writes += 1;
        Ok(())
    }

    fn remove_rows(&mut self, table: &str) -> Result<()> {
        self.tables.remove(table);
        Ok(())
    }
}

/// Fails every save; loads behave like an empty [MemoryStorage].
///
/// Lets tests check that a failed write is reported.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl Storage for FailingStorage {
    fn load_schemas(&self) -> SchemaStore {
        SchemaStore::new()
    }

    fn save_schemas(&mut self, _: &SchemaStore) -> Result<()> {
        Err(std::io::Error::other("read-only storage").into())
    }

    fn load_rows(&self, _: &str) -> RowSet {
        RowSet::new()
    }

    fn save_rows(&mut self, _: &str, _: &RowSet) -> Result<()> {
        Err(std::io::Error::other("read-only storage").into())
    }

    fn remove_rows(&mut self, _: &str) -> Result<()> {
        Ok(())
    }
}
