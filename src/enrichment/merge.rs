//! Merge engine: successive left joins against lookup tables
//!
//! Each lookup is fetched, validated against the running dataset, projected to
//! its declared columns and left-joined on its join column. Projected columns
//! replace same-named columns already present, and unmatched rows get nulls.
//! Input row order is restored after the last join.

use crate::config::LookupSpec;
use crate::constants::ROW_INDEX_COLUMN;
use crate::error::{EnrichmentError, Result};
use crate::lookup::LookupStore;
use polars::prelude::*;
use tracing::{debug, warn};

/// Left-join `dataset` with every lookup in order
///
/// # Returns
///
/// The enriched dataset, plus each lookup's required-column list in order
/// for the completeness check that runs after all merges.
pub fn enrich<'a, S, I>(
    dataset: &DataFrame,
    lookup_specs: I,
    store: &S,
) -> Result<(DataFrame, Vec<Vec<String>>)>
where
    S: LookupStore + ?Sized,
    I: IntoIterator<Item = &'a LookupSpec>,
{
    let mut running = dataset.with_row_index(ROW_INDEX_COLUMN.into(), None)?;
    let mut required_columns = Vec::new();

    for spec in lookup_specs {
        let lookup = store.fetch_lookup(&spec.file_name)?;
        running = apply_lookup(running, &lookup, spec)?;
        required_columns.push(spec.required.clone());
    }

    let enriched = running
        .sort([ROW_INDEX_COLUMN], SortMultipleOptions::default())?
        .drop(ROW_INDEX_COLUMN)?;

    if enriched.height() != dataset.height() {
        warn!(
            "Enrichment changed row count from {} to {}; check lookups for duplicate join keys",
            dataset.height(),
            enriched.height()
        );
    }

    Ok((enriched, required_columns))
}

/// Join a single lookup onto the running dataset
pub fn apply_lookup(running: DataFrame, lookup: &DataFrame, spec: &LookupSpec) -> Result<DataFrame> {
    let location = format!("lookup '{}'", spec.file_name);
    let projection = spec.projection();

    for column in projection.iter().chain(&spec.required) {
        if lookup.column(source_column(spec, column)).is_err() {
            return Err(EnrichmentError::schema_mismatch(&location, column));
        }
    }

    let left_key = running
        .column(&spec.join_column)
        .map_err(|_| EnrichmentError::schema_mismatch("enriched dataset", &spec.join_column))?;
    let right_key = lookup.column(source_column(spec, &spec.join_column))?;

    if left_key.dtype() != right_key.dtype() {
        return Err(EnrichmentError::TypeMismatch {
            lookup: spec.file_name.clone(),
            column: spec.join_column.clone(),
            expected: left_key.dtype().to_string(),
            found: right_key.dtype().to_string(),
        });
    }

    let distinct_keys = right_key.as_materialized_series().n_unique()?;
    if distinct_keys < lookup.height() {
        warn!(
            "Lookup '{}' has {} duplicate values in join column '{}'; matching rows will repeat",
            spec.file_name,
            lookup.height() - distinct_keys,
            spec.join_column
        );
    }

    let added: Vec<&String> = projection
        .iter()
        .filter(|column| **column != spec.join_column)
        .collect();

    let existing: Vec<String> = running
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let replaced = existing.iter().filter(|name| added.contains(name)).count();
    let left_columns: Vec<Expr> = existing
        .iter()
        .filter(|name| !added.contains(name))
        .map(|name| col(name.as_str()))
        .collect();

    let right_columns: Vec<Expr> = projection
        .iter()
        .map(|target| col(source_column(spec, target)).alias(target.as_str()))
        .collect();

    let key = [col(spec.join_column.as_str())];
    let joined = running
        .lazy()
        .select(left_columns)
        .join(
            lookup.clone().lazy().select(right_columns),
            key.clone(),
            key,
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    debug!(
        "Joined lookup '{}' on '{}': {} columns added, {} replaced",
        spec.file_name,
        spec.join_column,
        added.len() - replaced,
        replaced
    );

    Ok(joined)
}

/// Name of the lookup column that becomes `target` after renaming
fn source_column<'a>(spec: &'a LookupSpec, target: &'a str) -> &'a str {
    spec.rename
        .iter()
        .find(|(_, to)| to.as_str() == target)
        .map(|(from, _)| from.as_str())
        .unwrap_or(target)
}
