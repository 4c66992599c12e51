//! Snapshot tests using the insta crate.
//!
//! Snapshots pin the serialized shape of the structures handed to
//! collaborators (renderers, stores, front ends), so a change in field names
//! or tagging shows up as a reviewable diff.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::{all_rows, parse, scores};
use csvscope::data::chart_engine::build;
use csvscope::data::stats::compute;
use csvscope::data::view::view;
use csvscope::data::{FilterSet, Theme, ViewState};
use csvscope::types::{ChartKind, ChartSelection, ColumnKind};

#[test]
fn snapshot_grouped_view_output() {
    let ds = scores();
    let mut state = ViewState::for_dataset(&ds, 2);
    state.group_by = Some("name".to_string());

    insta::assert_json_snapshot!(view(&ds, &all_rows(&ds), &state), @r#"
    {
      "page_rows": [
        {
          "type": "group_header",
          "key": "Ada",
          "count": 1
        },
        {
          "type": "data",
          "row": 0
        },
        {
          "type": "group_header",
          "key": "Lin",
          "count": 1
        },
        {
          "type": "data",
          "row": 1
        }
      ],
      "total_rows": 3,
      "total_pages": 2,
      "page": 1,
      "groups": [
        {
          "key": "Ada",
          "count": 1,
          "first_row": 0
        },
        {
          "key": "Lin",
          "count": 1,
          "first_row": 1
        },
        {
          "key": "Ko",
          "count": 1,
          "first_row": 2
        }
      ]
    }
    "#);
}

#[test]
fn snapshot_category_filters() {
    let ds = parse("team\nred\nblue\nred");
    let mut filters = FilterSet::from_profile(&compute(&ds));
    filters.toggle_category("team", "blue");

    insta::assert_json_snapshot!(filters, @r#"
    {
      "ranges": [],
      "categories": [
        {
          "column": "team",
          "values": [
            "red",
            "blue"
          ],
          "selection": {
            "mode": "only",
            "values": [
              "red"
            ]
          }
        }
      ]
    }
    "#);
}

#[test]
fn snapshot_chart_selection() {
    let selection = ChartSelection::new(ChartKind::Doughnut, "team", "wins");
    insta::assert_json_snapshot!(selection, @r#"
    {
      "kind": "doughnut",
      "x_column": "team",
      "y_column": "wins"
    }
    "#);
    insta::assert_json_snapshot!(ColumnKind::Numeric, @r#""Numeric""#);
}

#[test]
fn snapshot_pie_chart_description() {
    let ds = scores();
    let desc = build(
        &ds,
        &all_rows(&ds),
        Some(&ChartSelection::new(ChartKind::Pie, "name", "score")),
        &Theme::classic(),
        &[],
    )
    .unwrap();

    insta::assert_snapshot!(serde_json::to_string_pretty(&desc).unwrap(), @r#"
    {
      "kind": "pie",
      "title": "score by name",
      "labels": [
        "Ada",
        "Lin",
        "Ko"
      ],
      "series": [
        {
          "label": "score",
          "values": [
            90.0,
            70.0,
            85.0
          ],
          "style": {
            "fill_colors": [
              "rgba(75, 192, 192, 0.2)",
              "rgba(255, 99, 132, 0.2)",
              "rgba(255, 206, 86, 0.2)"
            ],
            "border_colors": [
              "rgba(75, 192, 192, 1)",
              "rgba(255, 99, 132, 1)",
              "rgba(255, 206, 86, 1)"
            ],
            "border_width": 1.0
          }
        }
      ],
      "axis": null,
      "tooltip": {
        "label_column": "name",
        "value_column": "score",
        "decimals": 2,
        "show_share": true
      },
      "annotations": []
    }
    "#);
}
