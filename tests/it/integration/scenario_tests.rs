//! End-to-end scenarios over the canonical scores dataset.

use crate::helpers::{SCORES_CSV, column_values, loaded_session};
use csvscope::session::Event;
use csvscope::types::Annotation;

#[test]
fn test_range_filter_leaves_statistics_alone() {
    let mut session = loaded_session(SCORES_CSV);
    let snap = session
        .dispatch(Event::SetRange {
            column: "score".to_string(),
            min: 80.0,
            max: 100.0,
        })
        .unwrap();

    assert_eq!(column_values(&snap.dataset, &snap.filtered, "name"), vec!["Ada", "Ko"]);
    assert_eq!(column_values(&snap.dataset, &snap.filtered, "score"), vec!["90", "85"]);

    // Statistics describe all rows, not the filtered view
    assert_eq!(
        snap.profile.get("score").unwrap().describe(snap.profile.total_rows),
        vec!["Min: 70.00", "Max: 90.00", "Average: 81.67"]
    );
    assert_eq!(snap.record_summary(), "Showing 2 of 3 records");
}

#[test]
fn test_empty_category_selection_shows_nothing() {
    let mut session = loaded_session(SCORES_CSV);
    let snap = session
        .dispatch(Event::ClearCategories {
            column: "name".to_string(),
        })
        .unwrap();

    assert!(snap.filtered.is_empty());
    assert_eq!(snap.view_output().total_pages, 1);
    assert!(snap.chart().unwrap().labels.is_empty());
    assert_eq!(snap.export_table(','), "name,score");
}

#[test]
fn test_group_by_name_two_rows_per_page() {
    let mut session = loaded_session(SCORES_CSV);
    session.dispatch(Event::SetRowsPerPage(2)).unwrap();
    let snap = session
        .dispatch(Event::SetGroupBy(Some("name".to_string())))
        .unwrap();

    let page = snap.view_output();
    assert_eq!(page.data_rows(), vec![0, 1]);
    assert_eq!(page.total_pages, 2);
    // Two header pseudo-rows on top of the two data rows
    assert_eq!(page.page_rows.len(), 4);
}

#[test]
fn test_label_annotation_persists_until_filtered_out() {
    let mut session = loaded_session(SCORES_CSV);
    session
        .dispatch(Event::AddAnnotation(Annotation::at_label("Ko", 85.0, "note")))
        .unwrap();

    // Resorting the table does not touch the chart
    let snap = session.dispatch(Event::ToggleSort("score".to_string())).unwrap();
    let chart = snap.chart().unwrap();
    assert_eq!(chart.annotations.len(), 1);
    assert_eq!(chart.annotations[0].label, "Ko");

    let snap = session
        .dispatch(Event::SetRange {
            column: "score".to_string(),
            min: 86.0,
            max: 100.0,
        })
        .unwrap();
    assert!(snap.chart().unwrap().annotations.is_empty());

    // The annotation comes back with its label
    let snap = session.dispatch(Event::ResetFilters).unwrap();
    assert_eq!(snap.chart().unwrap().annotations.len(), 1);
}
