//! Tests for the missing-value and marine-mismatch detectors

use super::*;
use crate::constants::{ISSUE_COLUMN, MARINE_MISMATCH_ISSUE};
use crate::enrichment::anomaly::{
    combine_anomalies, detect_marine_mismatch, detect_missing, empty_anomalies,
};
use crate::error::ErrorKind;

fn create_enriched(surveys: &[&str], flags: &[Option<&str>]) -> DataFrame {
    let ids: Vec<i64> = (1..=surveys.len() as i64).collect();
    let periods: Vec<&str> = surveys.iter().map(|_| "202001").collect();
    df!(
        "responder_id" => ids,
        "survey" => surveys,
        "period" => periods,
        "marine" => flags
    )
    .unwrap()
}

fn marine_anomalies(enriched: &DataFrame) -> DataFrame {
    detect_marine_mismatch(enriched, "survey", "marine", "period", "responder_id").unwrap()
}

#[test]
fn test_detect_missing_one_row_per_null() {
    let enriched = df!(
        "responder_id" => [1i64, 2, 3],
        "county" => [Some("X"), None, None],
        "region" => [None, Some("R1"), None]
    )
    .unwrap();
    let required = vec!["county".to_string(), "region".to_string()];

    let anomalies = detect_missing(&enriched, &required, "responder_id").unwrap();

    // Ordered by column, then by record
    assert_eq!(
        i64_values(&anomalies, "responder_id"),
        vec![Some(2), Some(3), Some(1), Some(3)]
    );
    assert_eq!(
        str_values(&anomalies, ISSUE_COLUMN),
        some(&[
            "county missing in lookup.",
            "county missing in lookup.",
            "region missing in lookup.",
            "region missing in lookup.",
        ])
    );
    assert_eq!(column_names(&anomalies), vec!["responder_id", "issue"]);
}

#[test]
fn test_detect_missing_complete_data() {
    let enriched = df!("responder_id" => [1i64, 2], "county" => ["X", "Y"]).unwrap();

    let anomalies = detect_missing(&enriched, &["county".to_string()], "responder_id").unwrap();

    assert_eq!(anomalies.height(), 0);
    assert_eq!(column_names(&anomalies), vec!["responder_id", "issue"]);
}

#[test]
fn test_detect_missing_unknown_column() {
    let enriched = df!("responder_id" => [1i64]).unwrap();

    let err = detect_missing(&enriched, &["county".to_string()], "responder_id").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.field(), Some("county"));
}

#[test]
fn test_marine_mismatch_flags_non_marine_county() {
    let enriched = create_enriched(&["076"], &[Some("n")]);

    let anomalies = marine_anomalies(&enriched);

    assert_eq!(anomalies.height(), 1);
    assert_eq!(i64_values(&anomalies, "responder_id"), vec![Some(1)]);
    assert_eq!(str_values(&anomalies, ISSUE_COLUMN), some(&[MARINE_MISMATCH_ISSUE]));
    assert_eq!(
        column_names(&anomalies),
        vec!["responder_id", "issue", "survey", "marine", "period"]
    );
    assert_eq!(str_values(&anomalies, "period"), some(&["202001"]));
}

#[test]
fn test_marine_mismatch_ignores_marine_counties_and_other_surveys() {
    let enriched = create_enriched(
        &["076", "077", "076", "023"],
        &[Some("y"), Some("n"), None, Some("n")],
    );

    assert_eq!(marine_anomalies(&enriched).height(), 0);
}

#[test]
fn test_marine_mismatch_is_exact_string_match() {
    let enriched = create_enriched(
        &[" 076", "076 ", "076", "076"],
        &[Some("n"), Some("n"), Some("N"), Some(" n")],
    );

    assert_eq!(marine_anomalies(&enriched).height(), 0);
}

#[test]
fn test_marine_mismatch_numeric_survey_code_does_not_match() {
    // 76 stringifies as "76", not "076"
    let enriched = df!(
        "responder_id" => [1i64],
        "survey" => [76i64],
        "period" => ["202001"],
        "marine" => ["n"]
    )
    .unwrap();

    assert_eq!(marine_anomalies(&enriched).height(), 0);
}

#[test]
fn test_marine_mismatch_requires_flag_column() {
    let enriched = create_responses(&[1]);

    let err = detect_marine_mismatch(&enriched, "survey", "marine", "period", "responder_id")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.field(), Some("marine"));
}

#[test]
fn test_combine_anomalies_fills_missing_columns() {
    let enriched = create_enriched(&["076", "076"], &[Some("n"), None]);
    let missing = detect_missing(&enriched, &["marine".to_string()], "responder_id").unwrap();
    let marine = marine_anomalies(&enriched);

    let combined = combine_anomalies(vec![missing, marine], &enriched, "responder_id").unwrap();

    assert_eq!(i64_values(&combined, "responder_id"), vec![Some(2), Some(1)]);
    assert_eq!(
        str_values(&combined, ISSUE_COLUMN),
        some(&["marine missing in lookup.", MARINE_MISMATCH_ISSUE])
    );
    assert_eq!(
        str_values(&combined, "survey"),
        vec![None, Some("076".to_string())]
    );
}

#[test]
fn test_empty_anomalies_schema() {
    let enriched = create_responses(&[1, 2]);

    let anomalies = empty_anomalies(&enriched, "responder_id").unwrap();
    assert_eq!(anomalies.height(), 0);
    assert_eq!(column_names(&anomalies), vec!["responder_id", "issue"]);
    assert_eq!(
        anomalies.column("responder_id").unwrap().dtype(),
        &DataType::Int64
    );

    let combined = combine_anomalies(Vec::new(), &enriched, "responder_id").unwrap();
    assert!(combined.equals_missing(&anomalies));
}
