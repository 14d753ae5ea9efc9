//! Configuration management and validation.
//!
//! The enrichment step is driven entirely by an explicit [`EnrichmentConfig`]
//! handed in at the call boundary. It mirrors the JSON payload the surrounding
//! pipeline passes (`lookups` keyed by `"0"`, `"1"`, ...) and is checked by
//! [`EnrichmentConfig::validate`] before any data is touched.

use crate::constants::DEFAULT_MARINE_FLAG_COLUMN;
use crate::error::{EnrichmentError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One lookup table to join onto the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSpec {
    /// Logical name or location of the lookup, resolved by the lookup store
    pub file_name: String,

    /// Columns of the lookup to carry onto the dataset
    pub columns_to_keep: Vec<String>,

    /// Column shared by the dataset and the lookup
    pub join_column: String,

    /// Columns that must be non-null after enrichment
    #[serde(default)]
    pub required: Vec<String>,

    /// Lookup columns to rename before projection (source -> target)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rename: BTreeMap<String, String>,
}

impl LookupSpec {
    pub fn new(
        file_name: impl Into<String>,
        join_column: impl Into<String>,
        columns_to_keep: &[&str],
    ) -> Self {
        Self {
            file_name: file_name.into(),
            columns_to_keep: columns_to_keep.iter().map(|c| c.to_string()).collect(),
            join_column: join_column.into(),
            required: Vec::new(),
            rename: BTreeMap::new(),
        }
    }

    /// Set the columns that must be populated after the merge
    pub fn with_required(mut self, required: &[&str]) -> Self {
        self.required = required.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Rename a lookup column before it is projected
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Lookup columns to project, join column first, without duplicates
    /// First referenced column that only exists under its pre-rename name
    pub fn renamed_away_column(&self) -> Option<&str> {
        let targets: Vec<&String> = self.rename.values().collect();
        std::iter::once(&self.join_column)
            .chain(&self.columns_to_keep)
            .chain(&self.required)
            .find(|column| self.rename.contains_key(*column) && !targets.contains(column))
            .map(|column| column.as_str())
    }

    pub fn projection(&self) -> Vec<String> {
        let mut columns = vec![self.join_column.clone()];
        for column in &self.columns_to_keep {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }
}

/// Explicit configuration for one enrichment invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Column that uniquely identifies a record
    #[serde(default)]
    pub identifier_column: String,

    /// Column holding the survey code
    #[serde(default)]
    pub survey_column: String,

    /// Column holding the survey period
    #[serde(default)]
    pub period_column: String,

    /// Run the marine mismatch detector
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub marine_mismatch_check: bool,

    /// Looked-up column saying whether a county produces marine
    #[serde(default = "default_marine_flag_column")]
    pub marine_flag_column: String,

    /// Lookups to apply, in ascending key order
    #[serde(default)]
    pub lookups: BTreeMap<u32, LookupSpec>,
}

fn default_marine_flag_column() -> String {
    DEFAULT_MARINE_FLAG_COLUMN.to_string()
}

/// Accept a JSON bool or the strings "true"/"false"
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"true\" or \"false\", found \"{}\"",
                other
            ))),
        },
    }
}

impl EnrichmentConfig {
    pub fn new(
        identifier_column: impl Into<String>,
        survey_column: impl Into<String>,
        period_column: impl Into<String>,
    ) -> Self {
        Self {
            identifier_column: identifier_column.into(),
            survey_column: survey_column.into(),
            period_column: period_column.into(),
            marine_mismatch_check: false,
            marine_flag_column: default_marine_flag_column(),
            lookups: BTreeMap::new(),
        }
    }

    /// Append a lookup after the existing ones
    pub fn with_lookup(mut self, spec: LookupSpec) -> Self {
        let next = self.lookups.keys().next_back().map_or(0, |last| last + 1);
        self.lookups.insert(next, spec);
        self
    }

    /// Enable or disable the marine mismatch detector
    pub fn with_marine_mismatch_check(mut self, enabled: bool) -> Self {
        self.marine_mismatch_check = enabled;
        self
    }

    /// Override the capability flag column
    pub fn with_marine_flag_column(mut self, column: impl Into<String>) -> Self {
        self.marine_flag_column = column.into();
        self
    }

    /// Lookup specifications in application order
    pub fn lookup_specs(&self) -> impl Iterator<Item = &LookupSpec> {
        self.lookups.values()
    }

    /// Parse configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EnrichmentError::io(path, e))?;
        debug!("Loaded enrichment configuration from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Check that every field the enrichment relies on is present
    pub fn validate(&self) -> Result<()> {
        require_non_empty("identifier_column", &self.identifier_column)?;

        if self.marine_mismatch_check {
            require_non_empty("survey_column", &self.survey_column)?;
            require_non_empty("period_column", &self.period_column)?;
            require_non_empty("marine_flag_column", &self.marine_flag_column)?;
        }

        for (index, spec) in &self.lookups {
            let prefix = format!("lookups.{}", index);
            require_non_empty(&format!("{}.file_name", prefix), &spec.file_name)?;
            require_non_empty(&format!("{}.join_column", prefix), &spec.join_column)?;

            if spec.columns_to_keep.is_empty() {
                return Err(EnrichmentError::configuration(
                    format!("{}.columns_to_keep", prefix),
                    "at least one column must be kept",
                ));
            }

            for column in spec.columns_to_keep.iter().chain(&spec.required) {
                if column.trim().is_empty() {
                    return Err(EnrichmentError::configuration(
                        prefix.clone(),
                        "column names must not be empty",
                    ));
                }
            }

            if let Some(column) = spec.renamed_away_column() {
                return Err(EnrichmentError::configuration(
                    format!("{}.rename", prefix),
                    format!(
                        "'{}' is renamed to '{}' and cannot be referenced by its old name",
                        column, spec.rename[column]
                    ),
                ));
            }
        }

        debug!(
            "Validated enrichment configuration with {} lookups",
            self.lookups.len()
        );
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EnrichmentError::configuration(field, "must not be empty"));
    }
    Ok(())
}
