//! Anomaly detection over the enriched dataset
//!
//! Detectors never fail on bad data: every violation becomes a row in an
//! anomaly frame keyed by the identifier column with an `issue` description.
//! They only fail when a column they were told to inspect does not exist.

use crate::constants::{
    ISSUE_COLUMN, MARINE_MISMATCH_ISSUE, MARINE_SURVEY_CODE, NON_MARINE_FLAG,
    missing_in_lookup_issue,
};
use crate::error::{EnrichmentError, Result};
use polars::prelude::*;
use tracing::debug;

/// Flag every null in the required columns
///
/// Emits one row per (column, record) pair, ordered by column then by record,
/// with issue text `"<column> missing in lookup."`.
pub fn detect_missing(
    enriched: &DataFrame,
    required_columns: &[String],
    identifier_column: &str,
) -> Result<DataFrame> {
    ensure_columns(enriched, [identifier_column])?;
    ensure_columns(enriched, required_columns.iter().map(|c| c.as_str()))?;

    if required_columns.is_empty() {
        return empty_anomalies(enriched, identifier_column);
    }

    let frames: Vec<LazyFrame> = required_columns
        .iter()
        .map(|column| {
            enriched
                .clone()
                .lazy()
                .filter(col(column.as_str()).is_null())
                .select([
                    col(identifier_column),
                    lit(missing_in_lookup_issue(column)).alias(ISSUE_COLUMN),
                ])
        })
        .collect();

    let anomalies = concat(frames, UnionArgs::default())?.collect()?;
    debug!(
        "Missing-value check over {:?}: {} anomalies",
        required_columns,
        anomalies.height()
    );
    Ok(anomalies)
}

/// Flag marine-survey records from counties that do not produce marine
///
/// A record matches when its survey code is exactly `"076"` and its looked-up
/// capability flag is exactly `"n"`. Comparison is on the string form of the
/// values with no trimming or case folding, and nulls never match. The survey,
/// flag and period values are carried along for audit.
pub fn detect_marine_mismatch(
    enriched: &DataFrame,
    survey_column: &str,
    flag_column: &str,
    period_column: &str,
    identifier_column: &str,
) -> Result<DataFrame> {
    ensure_columns(
        enriched,
        [identifier_column, survey_column, flag_column, period_column],
    )?;

    let mut outputs = vec![
        col(identifier_column),
        lit(MARINE_MISMATCH_ISSUE).alias(ISSUE_COLUMN),
    ];
    let mut seen = vec![identifier_column, ISSUE_COLUMN];
    for column in [survey_column, flag_column, period_column] {
        if !seen.contains(&column) {
            outputs.push(col(column));
            seen.push(column);
        }
    }

    let is_marine_survey = col(survey_column)
        .cast(DataType::String)
        .eq(lit(MARINE_SURVEY_CODE));
    let is_non_marine_county = col(flag_column)
        .cast(DataType::String)
        .eq(lit(NON_MARINE_FLAG));

    let anomalies = enriched
        .clone()
        .lazy()
        .filter(is_marine_survey.and(is_non_marine_county))
        .select(outputs)
        .collect()?;

    debug!("Marine mismatch check: {} anomalies", anomalies.height());
    Ok(anomalies)
}

/// Concatenate detector outputs into a single anomaly frame
///
/// Frames are stacked in the order given; columns missing from one detector
/// are null in its rows. With nothing to stack the result is an empty frame
/// with the identifier and issue columns.
pub fn combine_anomalies(
    frames: Vec<DataFrame>,
    enriched: &DataFrame,
    identifier_column: &str,
) -> Result<DataFrame> {
    if frames.is_empty() {
        return empty_anomalies(enriched, identifier_column);
    }

    let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(|frame| frame.lazy()).collect();
    Ok(concat_lf_diagonal(lazy_frames, UnionArgs::default())?.collect()?)
}

/// Zero-row anomaly frame typed after the dataset's identifier column
pub fn empty_anomalies(enriched: &DataFrame, identifier_column: &str) -> Result<DataFrame> {
    let identifier_dtype = enriched
        .column(identifier_column)
        .map_err(|_| EnrichmentError::schema_mismatch("enriched dataset", identifier_column))?
        .dtype()
        .clone();

    let schema = Schema::from_iter([
        (PlSmallStr::from(identifier_column), identifier_dtype),
        (PlSmallStr::from(ISSUE_COLUMN), DataType::String),
    ]);
    Ok(DataFrame::empty_with_schema(&schema))
}

fn ensure_columns<'a>(
    enriched: &DataFrame,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for column in columns {
        if enriched.column(column).is_err() {
            return Err(EnrichmentError::schema_mismatch("enriched dataset", column));
        }
    }
    Ok(())
}
