//! Lookup table retrieval.
//!
//! The enrichment core never knows where lookups live. It asks a
//! [`LookupStore`] for a table by name, and any failure is reported as a
//! dependency error without retrying. Two stores are provided: an in-memory
//! map and a directory of JSON, CSV or Parquet files.

use crate::constants::LOOKUP_EXTENSIONS;
use crate::error::{EnrichmentError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of lookup tables, keyed by logical name
pub trait LookupStore {
    /// Fetch the lookup table registered under `name`
    fn fetch_lookup(&self, name: &str) -> Result<DataFrame>;
}

impl<T: LookupStore + ?Sized> LookupStore for &T {
    fn fetch_lookup(&self, name: &str) -> Result<DataFrame> {
        (**self).fetch_lookup(name)
    }
}

/// Lookup tables held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryLookupStore {
    tables: HashMap<String, DataFrame>,
}

impl InMemoryLookupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under `name`, replacing any previous one
    pub fn with_table(mut self, name: impl Into<String>, table: DataFrame) -> Self {
        self.insert(name, table);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, table: DataFrame) {
        self.tables.insert(name.into(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl LookupStore for InMemoryLookupStore {
    fn fetch_lookup(&self, name: &str) -> Result<DataFrame> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| EnrichmentError::dependency(name, "no such lookup table"))
    }
}

/// Lookup tables stored as files under a root directory
#[derive(Debug, Clone)]
pub struct FileLookupStore {
    root: PathBuf,
}

impl FileLookupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a lookup name to an existing file
    ///
    /// A name carrying an extension is used as-is; a bare name is tried with
    /// each supported extension in turn.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = self.root.join(name);
        if direct.extension().is_some() {
            return direct.is_file().then_some(direct);
        }

        LOOKUP_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", name, ext)))
            .find(|candidate| candidate.is_file())
    }
}

impl LookupStore for FileLookupStore {
    fn fetch_lookup(&self, name: &str) -> Result<DataFrame> {
        let path = self.resolve(name).ok_or_else(|| {
            EnrichmentError::dependency(
                name,
                format!("no lookup file found under {}", self.root.display()),
            )
        })?;

        let table = read_table(&path)
            .map_err(|e| EnrichmentError::dependency(name, format!("{}: {}", path.display(), e)))?;

        debug!(
            "Fetched lookup '{}' from {} ({} rows, {} columns)",
            name,
            path.display(),
            table.height(),
            table.width()
        );
        Ok(table)
    }
}

/// Tabular file formats understood by [`read_table`] and [`write_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Array of JSON objects, one per record
    Json,
    /// CSV with a header row; every column is read as a string
    Csv,
    Parquet,
}

impl TableFormat {
    /// Detect the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => TableFormat::Csv,
            Some("parquet") => TableFormat::Parquet,
            _ => TableFormat::Json,
        }
    }
}

/// Read a dataset from disk
///
/// Any failure to open or decode the file is a dependency error naming it.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = match TableFormat::from_path(path) {
        TableFormat::Json => {
            let file = File::open(path).map_err(|e| EnrichmentError::io(path, e))?;
            JsonReader::new(file).finish()
        }
        TableFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            // Keep codes such as "076" intact
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish()),
        TableFormat::Parquet => {
            let file = File::open(path).map_err(|e| EnrichmentError::io(path, e))?;
            ParquetReader::new(file).finish()
        }
    };
    df.map_err(|e| EnrichmentError::read(path, e))
}

/// Write a dataset to disk in the format implied by its extension
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| EnrichmentError::io(parent, e))?;
        }
    }

    let mut file = File::create(path).map_err(|e| EnrichmentError::io(path, e))?;
    match TableFormat::from_path(path) {
        TableFormat::Json => JsonWriter::new(&mut file)
            .with_json_format(JsonFormat::Json)
            .finish(df)?,
        TableFormat::Csv => CsvWriter::new(&mut file).finish(df)?,
        TableFormat::Parquet => {
            ParquetWriter::new(file).finish(df)?;
        }
    }

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
