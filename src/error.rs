//! Error handling for survey enrichment.
//!
//! Every fatal condition surfaces as a single [`EnrichmentError`] carrying its
//! kind, a message and the offending field, so the calling pipeline can decide
//! on retries and alerting itself. Detected data anomalies are never errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Configuration error in '{field}': {message}")]
    Configuration { field: String, message: String },

    #[error("Failed to fetch lookup '{lookup}': {message}")]
    Dependency { lookup: String, message: String },

    #[error("Column '{column}' not found in {location}")]
    SchemaMismatch { location: String, column: String },

    #[error(
        "Join column '{column}' has type {found} in lookup '{lookup}' but {expected} in the dataset"
    )]
    TypeMismatch {
        lookup: String,
        column: String,
        expected: String,
        found: String,
    },

    #[error("IO error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read table '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Broad classification used by callers to pick a retry/alert policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller configuration is malformed; never worth retrying
    Configuration,
    /// The lookup collaborator failed; may be transient
    Dependency,
    /// Columns or types do not line up at merge time
    Schema,
}

impl EnrichmentError {
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn dependency(lookup: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dependency {
            lookup: lookup.into(),
            message: message.into(),
        }
    }

    pub fn schema_mismatch(location: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            location: location.into(),
            column: column.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: polars::error::PolarsError) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Kind of failure, independent of the message text
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::Json(_) => ErrorKind::Configuration,
            Self::Dependency { .. } | Self::Io { .. } | Self::Read { .. } => {
                ErrorKind::Dependency
            }
            Self::SchemaMismatch { .. } | Self::TypeMismatch { .. } | Self::Polars(_) => {
                ErrorKind::Schema
            }
        }
    }

    /// The configuration field, lookup or column the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Configuration { field, .. } => Some(field.as_str()),
            Self::Dependency { lookup, .. } => Some(lookup.as_str()),
            Self::SchemaMismatch { column, .. } | Self::TypeMismatch { column, .. } => {
                Some(column.as_str())
            }
            Self::Io { .. } | Self::Read { .. } | Self::Json(_) | Self::Polars(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;
