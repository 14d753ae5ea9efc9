//! Survey Enrichment Library
//!
//! Enriches survey response datasets with reference data held in lookup
//! tables and reports the data-quality anomalies found along the way.
//!
//! This library provides tools for:
//! - Successive left joins of a dataset against configured lookup tables
//! - Completeness checks on the columns each lookup must supply
//! - The marine mismatch consistency check for survey 076
//! - Loading lookup tables from JSON, CSV or Parquet files
//! - JSON configuration compatible with the survey pipeline payload

pub mod cli;
pub mod config;
pub mod constants;
pub mod enrichment;
pub mod error;
pub mod lookup;
pub mod models;

// Re-export commonly used types
pub use config::{EnrichmentConfig, LookupSpec};
pub use enrichment::{EnrichmentProcessor, data_enrichment};
pub use error::{EnrichmentError, ErrorKind, Result};
pub use lookup::{FileLookupStore, InMemoryLookupStore, LookupStore, read_table, write_table};
pub use models::{EnrichmentOutput, EnrichmentStats};
