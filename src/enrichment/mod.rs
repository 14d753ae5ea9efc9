//! Enrichment pipeline for survey responses
//!
//! Joins a dataset against its configured lookup tables and reports the
//! data-quality issues found in the result.
//!
//! # Architecture
//!
//! - [`merge`] - successive left joins against lookup tables
//! - [`anomaly`] - missing-value and marine-mismatch detectors
//!
//! # Processing Pipeline
//!
//! 1. **Validation**: configuration and identifier column are checked up front
//! 2. **Merge**: every lookup is applied in configuration order
//! 3. **Completeness**: each lookup's required columns are checked for nulls
//!    against the fully enriched dataset
//! 4. **Consistency**: optional marine mismatch check
//!
//! Any error aborts the whole invocation; no partially enriched dataset is
//! ever returned.
//!
//! # Example Usage
//!
//! ```rust
//! use polars::prelude::*;
//! use survey_enrichment::{EnrichmentConfig, InMemoryLookupStore, LookupSpec, data_enrichment};
//!
//! # fn example() -> survey_enrichment::Result<()> {
//! let responses = df!("responder_id" => [1i64], "survey" => ["076"], "period" => ["202001"])?;
//! let store = InMemoryLookupStore::new().with_table(
//!     "responder_county_lookup",
//!     df!("responder_id" => [1i64], "county" => ["X"])?,
//! );
//!
//! let config = EnrichmentConfig::new("responder_id", "survey", "period").with_lookup(
//!     LookupSpec::new("responder_county_lookup", "responder_id", &["county"])
//!         .with_required(&["county"]),
//! );
//!
//! let output = data_enrichment(&responses, &config, &store)?;
//! assert_eq!(output.enriched.height(), 1);
//! assert_eq!(output.anomalies.height(), 0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod anomaly;
pub mod merge;

#[cfg(test)]
mod tests;

pub use anomaly::{combine_anomalies, detect_marine_mismatch, detect_missing, empty_anomalies};
pub use merge::{apply_lookup, enrich};

use crate::config::EnrichmentConfig;
use crate::error::{EnrichmentError, Result};
use crate::lookup::LookupStore;
use crate::models::{EnrichmentOutput, EnrichmentStats};
use polars::prelude::DataFrame;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Enrich `dataset` and detect anomalies as described by `config`
pub fn data_enrichment<S>(
    dataset: &DataFrame,
    config: &EnrichmentConfig,
    store: &S,
) -> Result<EnrichmentOutput>
where
    S: LookupStore + ?Sized,
{
    let start_time = Instant::now();
    config.validate()?;

    if dataset.column(&config.identifier_column).is_err() {
        return Err(EnrichmentError::schema_mismatch(
            "input dataset",
            &config.identifier_column,
        ));
    }

    info!(
        "Starting enrichment of {} records with {} lookups",
        dataset.height(),
        config.lookups.len()
    );

    // Step 1: Apply every lookup
    let (enriched, required_columns) = enrich(dataset, config.lookup_specs(), store)?;

    let mut stats = EnrichmentStats {
        input_rows: dataset.height(),
        enriched_rows: enriched.height(),
        lookups_applied: required_columns.len(),
        ..Default::default()
    };

    // Step 2: Completeness, once per lookup against the final dataset.
    // A column required by several lookups is only reported for the first.
    let mut anomaly_frames = Vec::with_capacity(required_columns.len() + 1);
    let mut reported: HashSet<String> = HashSet::new();
    for required in required_columns {
        let unreported: Vec<String> = required
            .into_iter()
            .filter(|column| reported.insert(column.clone()))
            .collect();
        if unreported.is_empty() {
            continue;
        }

        let missing = detect_missing(&enriched, &unreported, &config.identifier_column)?;
        stats.missing_value_anomalies += missing.height();
        anomaly_frames.push(missing);
    }

    // Step 3: Cross-field consistency
    if config.marine_mismatch_check {
        let marine = detect_marine_mismatch(
            &enriched,
            &config.survey_column,
            &config.marine_flag_column,
            &config.period_column,
            &config.identifier_column,
        )?;
        stats.marine_mismatch_anomalies = marine.height();
        anomaly_frames.push(marine);
    } else {
        debug!("Marine mismatch check disabled");
    }

    let anomalies = combine_anomalies(anomaly_frames, &enriched, &config.identifier_column)?;

    stats.processing_time_ms = start_time.elapsed().as_millis();
    info!("Enrichment complete: {}", stats.summary());

    Ok(EnrichmentOutput {
        enriched,
        anomalies,
        stats,
    })
}

/// Enrichment step bound to a lookup store and configuration
///
/// Convenient when the same configuration is applied to many datasets. Each
/// call to [`EnrichmentProcessor::process`] is independent.
#[derive(Debug, Clone)]
pub struct EnrichmentProcessor<S> {
    store: S,
    config: EnrichmentConfig,
}

impl<S: LookupStore> EnrichmentProcessor<S> {
    pub fn new(store: S, config: EnrichmentConfig) -> Self {
        Self { store, config }
    }

    /// Configure the processor
    pub fn with_config(mut self, config: EnrichmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Enrich one dataset
    pub fn process(&self, dataset: &DataFrame) -> Result<EnrichmentOutput> {
        data_enrichment(dataset, &self.config, &self.store)
    }
}
