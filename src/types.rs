//! Core types shared by the ingestion, filter, view and chart stages.
//!
//! A [`Dataset`] is immutable once built: every later stage works on row
//! indices into it rather than on copies of the rows.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Dataset Types
// ============================================================================

/// The typed table produced by ingestion.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Human-readable name (from the file or archive entry name)
    pub name: String,
    /// Column definitions, in header order
    pub columns: Vec<Column>,
    /// Data rows, in source order
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Cell of `row` in the named column, `Missing` for unknown columns
    pub fn cell<'a>(&self, row: &'a Row, column: &str) -> &'a Cell {
        match self.column_index(column) {
            Some(idx) => row.cell(idx),
            None => &MISSING,
        }
    }

    /// Rows at the given positions, in the order given
    pub fn rows_at<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a Row> + 'a {
        indices.iter().filter_map(move |&i| self.rows.get(i))
    }
}

/// Column metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name/header
    pub name: String,
    /// Inferred kind, used by statistics and filters
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Inferred column kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    #[default]
    Categorical,
}

/// A row of data cells, positionally aligned with [`Dataset::columns`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Position of this row in the source (stable across sorting and filtering)
    pub index: usize,
    pub cells: Vec<Cell>,
}

static MISSING: Cell = Cell::Missing;

impl Row {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// Cell at a column position, `Missing` when out of range
    pub fn cell(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&MISSING)
    }
}

/// A single cell value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Parse a raw field: empty is `Missing`, a finite number is `Number`,
    /// anything else is kept as `Text`.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            return Cell::Missing;
        }
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(value.to_string()),
        }
    }

    /// Numeric value of the cell, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Value for charting: numbers as-is, numeric text parsed, NaN otherwise
    pub fn to_f64_lossy(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(f64::NAN),
            Cell::Missing => f64::NAN,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => {
                // Whole numbers print without a trailing ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Missing => Ok(()),
        }
    }
}

// ============================================================================
// Chart Types
// ============================================================================

/// Types of charts available
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Pie,
    Radar,
    Doughnut,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Radar => "Radar Chart",
            ChartKind::Doughnut => "Doughnut Chart",
        }
    }

    /// Identifier used on the command line and in saved records
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Radar => "radar",
            ChartKind::Doughnut => "doughnut",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn all() -> &'static [ChartKind] {
        &[
            ChartKind::Bar,
            ChartKind::Line,
            ChartKind::Scatter,
            ChartKind::Pie,
            ChartKind::Radar,
            ChartKind::Doughnut,
        ]
    }

    /// Part-of-whole charts have no value axis
    pub fn is_proportion(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

/// The chart the user wants rendered
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartSelection {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
}

impl ChartSelection {
    pub fn new(kind: ChartKind, x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            kind,
            x_column: x_column.into(),
            y_column: y_column.into(),
        }
    }

    /// Default selection for a fresh dataset: the first two columns
    pub fn for_dataset(dataset: &Dataset, kind: ChartKind) -> Option<Self> {
        match dataset.columns.as_slice() {
            [x, y, ..] => Some(Self::new(kind, x.name.clone(), y.name.clone())),
            _ => None,
        }
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    /// Both columns exist in the dataset
    pub fn is_valid_for(&self, dataset: &Dataset) -> bool {
        dataset.has_column(&self.x_column) && dataset.has_column(&self.y_column)
    }
}

/// A user note attached to a rendered data point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Label of the x-axis category the note was placed on
    pub x_value: String,
    pub y_value: f64,
    pub note: String,
    /// Source row the note is pinned to; `None` anchors by label only
    #[serde(default)]
    pub row: Option<usize>,
}

impl Annotation {
    /// Anchor by rendered label
    pub fn at_label(x_value: impl Into<String>, y_value: f64, note: impl Into<String>) -> Self {
        Self {
            x_value: x_value.into(),
            y_value,
            note: note.into(),
            row: None,
        }
    }

    /// Anchor to a source row so the note survives resorting
    pub fn at_row(
        row: usize,
        x_value: impl Into<String>,
        y_value: f64,
        note: impl Into<String>,
    ) -> Self {
        Self {
            row: Some(row),
            ..Self::at_label(x_value, y_value, note)
        }
    }

    pub fn is_row_anchored(&self) -> bool {
        self.row.is_some()
    }
}
