//! Tests for the enrichment pipeline
//!
//! Fixtures model the survey pipeline's two standard lookups: responder to
//! county, then county to marine capability and region.

pub mod anomaly_tests;

use crate::config::{EnrichmentConfig, LookupSpec};
use crate::lookup::InMemoryLookupStore;
use polars::prelude::*;

pub const RESPONDER_LOOKUP: &str = "responder_county_lookup";
pub const COUNTY_LOOKUP: &str = "county_marine_lookup";

/// Survey responses for the given responder ids, all on survey 076
pub fn create_responses(ids: &[i64]) -> DataFrame {
    let surveys: Vec<&str> = ids.iter().map(|_| "076").collect();
    let periods: Vec<&str> = ids.iter().map(|_| "202001").collect();
    df!(
        "responder_id" => ids,
        "survey" => surveys,
        "period" => periods
    )
    .unwrap()
}

/// Responder 1 lives in county X, responder 3 in county Y
pub fn create_responder_lookup() -> DataFrame {
    df!(
        "responder_id" => [1i64, 3],
        "county" => ["X", "Y"]
    )
    .unwrap()
}

/// County X does not produce marine, county Y does
pub fn create_county_lookup() -> DataFrame {
    df!(
        "county" => ["X", "Y"],
        "marine" => ["n", "y"],
        "region" => ["R1", "R2"],
        "county_name" => ["Xshire", "Yshire"]
    )
    .unwrap()
}

pub fn create_lookup_store() -> InMemoryLookupStore {
    InMemoryLookupStore::new()
        .with_table(RESPONDER_LOOKUP, create_responder_lookup())
        .with_table(COUNTY_LOOKUP, create_county_lookup())
}

pub fn responder_spec() -> LookupSpec {
    LookupSpec::new(RESPONDER_LOOKUP, "responder_id", &["responder_id", "county"])
        .with_required(&["county"])
}

pub fn county_spec() -> LookupSpec {
    LookupSpec::new(
        COUNTY_LOOKUP,
        "county",
        &["county", "county_name", "region", "marine"],
    )
}

/// Both lookups with the marine check enabled
pub fn create_test_config() -> EnrichmentConfig {
    EnrichmentConfig::new("responder_id", "survey", "period")
        .with_marine_mismatch_check(true)
        .with_lookup(responder_spec())
        .with_lookup(county_spec())
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn str_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(|v| v.to_string()))
        .collect()
}

pub fn i64_values(df: &DataFrame, column: &str) -> Vec<Option<i64>> {
    df.column(column).unwrap().i64().unwrap().into_iter().collect()
}

pub fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}
