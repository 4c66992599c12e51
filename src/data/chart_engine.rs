//! Chart description builder
//!
//! Maps the filtered rows and the user's column selection to a declarative
//! [`ChartDescription`]. Nothing here draws: a [`crate::render::ChartRenderer`]
//! turns the description into pixels.

use crate::constants::{SLOW_STAGE_MS, VALUE_DECIMALS};
use crate::data::error::{DataError, DataResult};
use crate::perf::ScopedTimer;
use crate::types::{Annotation, ChartKind, ChartSelection, Dataset};
use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS `rgba()` string with the given alpha
    pub fn to_css(self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {})", self.0, self.1, self.2, alpha)
    }

    pub fn to_rgba8(self, alpha: f32) -> [u8; 4] {
        [self.0, self.1, self.2, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]
    }
}

/// Palette and stroke settings for chart series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub palette: Vec<Rgb>,
    pub fill_alpha: f32,
    pub border_alpha: f32,
    pub border_width: f32,
}

/// The classic five-color palette
pub const CLASSIC_PALETTE: [Rgb; 5] = [
    Rgb(75, 192, 192),  // Teal
    Rgb(255, 99, 132),  // Pink
    Rgb(255, 206, 86),  // Yellow
    Rgb(54, 162, 235),  // Blue
    Rgb(153, 102, 255), // Purple
];

/// Highly distinct colors for dense categorical charts
pub const VIVID_PALETTE: [Rgb; 8] = [
    Rgb(36, 99, 235),  // Bright Blue
    Rgb(29, 160, 80),  // Green
    Rgb(245, 140, 30), // Orange
    Rgb(140, 60, 220), // Violet
    Rgb(225, 45, 45),  // Red
    Rgb(29, 180, 170), // Teal
    Rgb(235, 200, 20), // Yellow
    Rgb(220, 50, 160), // Magenta
];

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            palette: CLASSIC_PALETTE.to_vec(),
            fill_alpha: 0.2,
            border_alpha: 1.0,
            border_width: 1.0,
        }
    }

    pub fn vivid() -> Self {
        Self {
            name: "vivid".to_string(),
            palette: VIVID_PALETTE.to_vec(),
            fill_alpha: 0.6,
            border_alpha: 1.0,
            border_width: 2.0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "vivid" => Some(Self::vivid()),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["classic", "vivid"]
    }

    /// Palette color for a point index, cycling; gray for an empty palette
    pub fn color(&self, index: usize) -> Rgb {
        if self.palette.is_empty() {
            return Rgb(128, 128, 128);
        }
        self.palette[index % self.palette.len()]
    }
}

/// Everything a renderer needs to draw one chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub kind: ChartKind,
    pub title: String,
    /// X display values in filtered order, not deduplicated
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    /// Absent for part-of-whole charts
    pub axis: Option<AxisHints>,
    pub tooltip: TooltipRules,
    pub annotations: Vec<ResolvedAnnotation>,
}

impl ChartDescription {
    pub fn point_count(&self) -> usize {
        self.labels.len()
    }

    /// Value of the first series at a point
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.series.first().and_then(|s| s.values.get(index).copied())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    /// Index-aligned with the labels; NaN (serialized as null) for non-numbers
    #[serde(with = "nan_as_null")]
    pub values: Vec<f64>,
    pub style: SeriesStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub fill_colors: Vec<String>,
    pub border_colors: Vec<String>,
    pub border_width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisHints {
    pub begin_at_zero: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipRules {
    pub label_column: String,
    pub value_column: String,
    pub decimals: usize,
    /// Show each point's share of the total
    pub show_share: bool,
}

impl TooltipRules {
    /// Tooltip line for a point, e.g. `Ada: 90.00` or `red: 3.00 (42.9%)`
    pub fn format(&self, label: &str, value: f64, total: f64) -> String {
        if !value.is_finite() {
            return format!("{}: -", label);
        }
        let base = format!("{}: {:.*}", label, self.decimals, value);
        if self.show_share && total != 0.0 {
            format!("{} ({:.1}%)", base, value / total * 100.0)
        } else {
            base
        }
    }
}

/// An annotation placed on a rendered point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnnotation {
    pub label_index: usize,
    pub label: String,
    pub y_value: f64,
    pub note: String,
}

/// Build the chart description for the filtered rows
///
/// Fails with [`DataError::NoSelection`] when there is no selection and with
/// [`DataError::UnknownColumn`] when it names a column the dataset lacks.
pub fn build(
    dataset: &Dataset,
    rows: &[usize],
    selection: Option<&ChartSelection>,
    theme: &Theme,
    annotations: &[Annotation],
) -> DataResult<ChartDescription> {
    let _timer = ScopedTimer::new("chart_build", SLOW_STAGE_MS);

    let selection = selection.ok_or(DataError::NoSelection)?;
    let x_col = dataset
        .column_index(&selection.x_column)
        .ok_or_else(|| DataError::UnknownColumn(selection.x_column.clone()))?;
    let y_col = dataset
        .column_index(&selection.y_column)
        .ok_or_else(|| DataError::UnknownColumn(selection.y_column.clone()))?;

    let mut labels = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());
    for row in dataset.rows_at(rows) {
        labels.push(row.cell(x_col).to_string());
        values.push(row.cell(y_col).to_f64_lossy());
    }

    let style = SeriesStyle {
        fill_colors: (0..labels.len())
            .map(|i| theme.color(i).to_css(theme.fill_alpha))
            .collect(),
        border_colors: (0..labels.len())
            .map(|i| theme.color(i).to_css(theme.border_alpha))
            .collect(),
        border_width: theme.border_width,
    };

    let axis = if selection.kind.is_proportion() {
        None
    } else {
        Some(AxisHints {
            begin_at_zero: true,
        })
    };

    let resolved = resolve_annotations(dataset, rows, &labels, annotations);

    tracing::debug!(
        kind = selection.kind.name(),
        points = labels.len(),
        annotations = resolved.len(),
        "Built chart description"
    );

    Ok(ChartDescription {
        kind: selection.kind,
        title: format!("{} by {}", selection.y_column, selection.x_column),
        labels,
        series: vec![Series {
            label: selection.y_column.clone(),
            values,
            style,
        }],
        axis,
        tooltip: TooltipRules {
            label_column: selection.x_column.clone(),
            value_column: selection.y_column.clone(),
            decimals: VALUE_DECIMALS,
            show_share: selection.kind.is_proportion(),
        },
        annotations: resolved,
    })
}

fn resolve_annotations(
    dataset: &Dataset,
    rows: &[usize],
    labels: &[String],
    annotations: &[Annotation],
) -> Vec<ResolvedAnnotation> {
    annotations
        .iter()
        .filter_map(|a| {
            let label_index = match a.row {
                Some(key) => dataset.rows_at(rows).position(|r| r.index == key)?,
                None => labels.iter().position(|l| *l == a.x_value)?,
            };
            Some(ResolvedAnnotation {
                label_index,
                label: labels[label_index].clone(),
                y_value: a.y_value,
                note: a.note.clone(),
            })
        })
        .collect()
}

/// Turn a point reported by the renderer into an annotation
///
/// Returns `None` when the point index is out of range.
pub fn annotation_from_point(
    description: &ChartDescription,
    dataset: &Dataset,
    rows: &[usize],
    point_index: usize,
    note: &str,
    anchor_to_row: bool,
) -> Option<Annotation> {
    let label = description.labels.get(point_index)?;
    let y_value = description.value_at(point_index).unwrap_or(f64::NAN);

    if anchor_to_row {
        let row = rows.get(point_index).and_then(|&pos| dataset.rows.get(pos))?;
        Some(Annotation::at_row(row.index, label.clone(), y_value, note))
    } else {
        Some(Annotation::at_label(label.clone(), y_value, note))
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
