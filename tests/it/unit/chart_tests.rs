//! Unit tests for the chart description builder.

use crate::helpers::{all_rows, people, scores};
use csvscope::data::chart_engine::{annotation_from_point, build};
use csvscope::data::{DataError, Rgb, Theme};
use csvscope::types::{Annotation, ChartKind, ChartSelection};

fn select(kind: ChartKind, x: &str, y: &str) -> ChartSelection {
    ChartSelection::new(kind, x, y)
}

#[test]
fn test_every_kind_builds() {
    let ds = scores();
    for kind in ChartKind::all() {
        let desc = build(
            &ds,
            &all_rows(&ds),
            Some(&select(*kind, "name", "score")),
            &Theme::default(),
            &[],
        )
        .unwrap();
        assert_eq!(desc.kind, *kind);
        assert_eq!(desc.labels, vec!["Ada", "Lin", "Ko"]);
        assert_eq!(desc.series[0].values, vec![90.0, 70.0, 85.0]);
        assert_eq!(desc.series[0].label, "score");
        assert_eq!(desc.axis.is_none(), kind.is_proportion());
    }
}

#[test]
fn test_labels_and_values_stay_aligned_after_filtering() {
    let ds = people();
    let rows = vec![1, 4, 5];
    let desc = build(
        &ds,
        &rows,
        Some(&select(ChartKind::Line, "name", "score")),
        &Theme::default(),
        &[],
    )
    .unwrap();

    assert_eq!(desc.labels, vec!["Lin", "Jo", "Bo"]);
    assert_eq!(desc.series[0].values.len(), 3);
    assert!(desc.series[0].values[1].is_nan());
    assert_eq!(desc.series[0].style.fill_colors.len(), 3);
}

#[test]
fn test_classic_theme_colors() {
    let ds = scores();
    let desc = build(
        &ds,
        &all_rows(&ds),
        Some(&select(ChartKind::Bar, "name", "score")),
        &Theme::classic(),
        &[],
    )
    .unwrap();
    let style = &desc.series[0].style;

    assert_eq!(style.fill_colors[0], "rgba(75, 192, 192, 0.2)");
    assert_eq!(style.border_colors[1], "rgba(255, 99, 132, 1)");
    assert_eq!(style.border_width, 1.0);
}

#[test]
fn test_theme_lookup() {
    assert_eq!(Theme::by_name("Vivid").unwrap().palette.len(), 8);
    assert!(Theme::by_name("neon").is_none());
    assert_eq!(Theme::default().color(5), Rgb(75, 192, 192));
    assert_eq!(Rgb(255, 0, 0).to_rgba8(0.2), [255, 0, 0, 51]);
}

#[test]
fn test_x_and_y_may_be_the_same_column() {
    let ds = scores();
    let desc = build(
        &ds,
        &all_rows(&ds),
        Some(&select(ChartKind::Scatter, "score", "score")),
        &Theme::default(),
        &[],
    )
    .unwrap();
    assert_eq!(desc.labels, vec!["90", "70", "85"]);
}

#[test]
fn test_unknown_column_is_validation_error() {
    let ds = scores();
    let err = build(
        &ds,
        &[],
        Some(&select(ChartKind::Bar, "team", "score")),
        &Theme::default(),
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, DataError::UnknownColumn(ref c) if c == "team"));
    assert!(err.is_validation());
}

#[test]
fn test_label_annotation_follows_label_not_row() {
    let ds = scores();
    let notes = vec![Annotation::at_label("Ko", 85.0, "best improver")];

    let desc = build(
        &ds,
        &[2, 0],
        Some(&select(ChartKind::Bar, "name", "score")),
        &Theme::default(),
        &notes,
    )
    .unwrap();
    assert_eq!(desc.annotations[0].label_index, 0);
    assert_eq!(desc.annotations[0].note, "best improver");

    let desc = build(
        &ds,
        &[0, 1],
        Some(&select(ChartKind::Bar, "name", "score")),
        &Theme::default(),
        &notes,
    )
    .unwrap();
    assert!(desc.annotations.is_empty());
}

#[test]
fn test_annotation_from_point_round_trip() {
    let ds = scores();
    let rows = all_rows(&ds);
    let selection = select(ChartKind::Bar, "name", "score");
    let desc = build(&ds, &rows, Some(&selection), &Theme::default(), &[]).unwrap();

    let note = annotation_from_point(&desc, &ds, &rows, 1, "check", true).unwrap();
    assert_eq!(note.row, Some(1));
    assert_eq!(note.x_value, "Lin");
    assert_eq!(note.y_value, 70.0);

    let desc = build(&ds, &rows, Some(&selection), &Theme::default(), &[note]).unwrap();
    assert_eq!(desc.annotations[0].label, "Lin");
}

#[test]
fn test_tooltip_rules() {
    let ds = scores();
    let desc = build(
        &ds,
        &all_rows(&ds),
        Some(&select(ChartKind::Doughnut, "name", "score")),
        &Theme::default(),
        &[],
    )
    .unwrap();
    let total: f64 = desc.series[0].values.iter().sum();

    assert_eq!(desc.tooltip.format("Ada", 90.0, total), "Ada: 90.00 (36.7%)");
    assert_eq!(desc.title, "score by name");
}
