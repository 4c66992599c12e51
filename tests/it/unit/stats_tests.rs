//! Unit tests for column statistics.

use crate::helpers::{TestDatasetBuilder, people, scores};
use csvscope::data::stats::compute;
use csvscope::data::{ColumnSummary, InferenceMode, ParseOptions};
use csvscope::types::{Cell, Column, ColumnKind, Dataset, Row};

#[test]
fn test_scores_profile() {
    let profile = compute(&scores());
    assert_eq!(profile.total_rows, 3);

    let score = profile.get("score").unwrap().numeric().unwrap();
    assert_eq!((score.min, score.max), (70.0, 90.0));
    assert_eq!(format!("{:.2}", score.mean), "81.67");

    let names = profile.get("name").unwrap().categorical().unwrap();
    assert_eq!(names.distinct(), vec!["Ada", "Lin", "Ko"]);
}

#[test]
fn test_missing_values_counted() {
    let profile = compute(&people());

    let score = profile.get("score").unwrap().numeric().unwrap();
    assert_eq!(score.count, 5);
    assert_eq!(score.missing, 1);

    // Missing team counts under the empty value
    let teams = profile.get("team").unwrap().categorical().unwrap();
    assert_eq!(teams.count_of(""), 1);
    assert_eq!(teams.count_of("red"), 2);
}

#[test]
fn test_numeric_column_without_numbers_is_no_data() {
    let ds = Dataset::new(
        "t",
        vec![Column::new("v", ColumnKind::Numeric)],
        vec![Row::new(0, vec![Cell::Missing]), Row::new(1, vec![Cell::Text("x".into())])],
    );
    let profile = compute(&ds);

    assert_eq!(profile.get("v").unwrap().summary, ColumnSummary::NoData);
    assert_eq!(profile.get("v").unwrap().describe(2), vec!["No data"]);
}

#[test]
fn test_all_missing_column_under_majority() {
    let ds = TestDatasetBuilder::new(&["v", "w"])
        .options(ParseOptions::default().with_inference(InferenceMode::Majority))
        .row(&["1", ""])
        .row(&["2", ""])
        .build();
    let profile = compute(&ds);

    assert!(profile.get("v").unwrap().numeric().is_some());
    // An all-missing column is categorical with one empty value
    assert_eq!(profile.get("w").unwrap().categorical().unwrap().count_of(""), 2);
}

#[test]
fn test_mixed_first_row_numeric_with_text_later() {
    let ds = TestDatasetBuilder::new(&["v"]).row(&["5"]).row(&["x"]).build();
    let profile = compute(&ds);
    let v = profile.get("v").unwrap().numeric().unwrap();

    assert_eq!(v.count, 1);
    assert_eq!(v.mean, 5.0);
}

#[test]
fn test_percentages() {
    let profile = compute(&people());
    let teams = profile.get("team").unwrap();

    assert_eq!(
        teams.describe(profile.total_rows),
        vec!["red: 2 (33.3%)", "blue: 2 (33.3%)", ": 1 (16.7%)", "green: 1 (16.7%)"]
    );
}

#[test]
fn test_empty_dataset() {
    let ds = TestDatasetBuilder::new(&["a", "b"]).build();
    let profile = compute(&ds);

    assert!(
        profile
            .columns
            .iter()
            .all(|c| c.summary == ColumnSummary::NoData)
    );
}
