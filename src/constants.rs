//! Application constants for survey enrichment
//!
//! Survey codes, capability flag values, issue texts and default column
//! names used across the merge engine and the anomaly detectors.

// =============================================================================
// Anomaly Output
// =============================================================================

/// Column holding the human-readable description of each anomaly
pub const ISSUE_COLUMN: &str = "issue";

/// Suffix appended to a column name to describe a missing lookup value
pub const MISSING_IN_LOOKUP_SUFFIX: &str = "missing in lookup.";

/// Issue text for a reference reporting marine data from a non-marine county
pub const MARINE_MISMATCH_ISSUE: &str = "Reference should not produce marine data.";

// =============================================================================
// Marine Mismatch Rule
// =============================================================================

/// Survey that only legitimately collects data from marine-producing counties
pub const MARINE_SURVEY_CODE: &str = "076";

/// Capability flag value meaning the county does not produce marine
pub const NON_MARINE_FLAG: &str = "n";

/// Default name of the looked-up capability flag column
pub const DEFAULT_MARINE_FLAG_COLUMN: &str = "marine";

// =============================================================================
// Internal Columns and File Formats
// =============================================================================

/// Temporary row index used to restore input order after joins
pub const ROW_INDEX_COLUMN: &str = "__enrichment_row_nr";

/// Extensions tried, in order, when a lookup name has none
pub const LOOKUP_EXTENSIONS: &[&str] = &["json", "csv", "parquet"];

/// Formats `<column> missing in lookup.`
pub fn missing_in_lookup_issue(column: &str) -> String {
    format!("{} {}", column, MISSING_IN_LOOKUP_SUFFIX)
}
