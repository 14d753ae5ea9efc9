//! Core data structures returned by the enrichment step.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Result of one enrichment invocation
#[derive(Debug, Clone)]
pub struct EnrichmentOutput {
    /// Input dataset with every lookup's columns joined on
    pub enriched: DataFrame,
    /// One row per detected data-quality issue; empty but never absent
    pub anomalies: DataFrame,
    pub stats: EnrichmentStats,
}

/// Processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub input_rows: usize,
    pub enriched_rows: usize,
    pub lookups_applied: usize,
    pub missing_value_anomalies: usize,
    pub marine_mismatch_anomalies: usize,
    pub processing_time_ms: u128,
}

impl EnrichmentStats {
    pub fn total_anomalies(&self) -> usize {
        self.missing_value_anomalies + self.marine_mismatch_anomalies
    }

    /// Whether the left joins kept the row count intact
    pub fn row_count_preserved(&self) -> bool {
        self.input_rows == self.enriched_rows
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} rows enriched with {} lookups; {} anomalies ({} missing values, {} marine mismatches) in {}ms",
            self.enriched_rows,
            self.lookups_applied,
            self.total_anomalies(),
            self.missing_value_anomalies,
            self.marine_mismatch_anomalies,
            self.processing_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let stats = EnrichmentStats {
            input_rows: 3,
            enriched_rows: 3,
            lookups_applied: 2,
            missing_value_anomalies: 1,
            marine_mismatch_anomalies: 2,
            processing_time_ms: 5,
        };

        assert_eq!(stats.total_anomalies(), 3);
        assert!(stats.row_count_preserved());
        assert_eq!(
            stats.summary(),
            "3 rows enriched with 2 lookups; 3 anomalies (1 missing values, 2 marine mismatches) in 5ms"
        );
    }
}
