//! Descriptive statistics per column.
//!
//! Profiles are always computed over the whole dataset, never the filtered
//! view: the statistics panel describes the data, the table describes the view.

use crate::constants::{PERCENT_DECIMALS, VALUE_DECIMALS};
use crate::types::{ColumnKind, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Profiles of every column, in column order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub total_rows: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn get(&self, column: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|p| p.column == column)
    }
}

/// Summary of one column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: String,
    pub summary: ColumnSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
    /// No usable cells: shown as "no data" instead of NaN
    NoData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Number cells seen
    pub count: usize,
    /// Cells that are missing or not numbers
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    /// Distinct values in first-seen order
    pub values: Vec<CategoryCount>,
}

impl CategoricalSummary {
    pub fn count_of(&self, value: &str) -> usize {
        self.values
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn distinct(&self) -> Vec<String> {
        self.values.iter().map(|c| c.value.clone()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

impl CategoryCount {
    /// Share of all rows, in percent
    pub fn percentage(&self, total_rows: usize) -> f64 {
        if total_rows == 0 {
            0.0
        } else {
            self.count as f64 / total_rows as f64 * 100.0
        }
    }
}

impl ColumnProfile {
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.summary {
            ColumnSummary::Numeric(n) => Some(n),
            _ => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.summary {
            ColumnSummary::Categorical(c) => Some(c),
            _ => None,
        }
    }

    /// Human-readable lines for the statistics panel
    pub fn describe(&self, total_rows: usize) -> Vec<String> {
        match &self.summary {
            ColumnSummary::Numeric(n) => vec![
                format!("Min: {:.*}", VALUE_DECIMALS, n.min),
                format!("Max: {:.*}", VALUE_DECIMALS, n.max),
                format!("Average: {:.*}", VALUE_DECIMALS, n.mean),
            ],
            ColumnSummary::Categorical(c) => c
                .values
                .iter()
                .map(|v| {
                    format!(
                        "{}: {} ({:.*}%)",
                        v.value,
                        v.count,
                        PERCENT_DECIMALS,
                        v.percentage(total_rows)
                    )
                })
                .collect(),
            ColumnSummary::NoData => vec!["No data".to_string()],
        }
    }
}

/// Profile every column of the dataset
pub fn compute(dataset: &Dataset) -> DatasetProfile {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| ColumnProfile {
            column: column.name.clone(),
            summary: match column.kind {
                ColumnKind::Numeric => numeric_summary(dataset, idx),
                ColumnKind::Categorical => categorical_summary(dataset, idx),
            },
        })
        .collect();

    DatasetProfile {
        total_rows: dataset.row_count(),
        columns,
    }
}

fn numeric_summary(dataset: &Dataset, idx: usize) -> ColumnSummary {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in dataset.rows.iter().filter_map(|r| r.cell(idx).as_f64()) {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return ColumnSummary::NoData;
    }

    ColumnSummary::Numeric(NumericSummary {
        count,
        missing: dataset.row_count() - count,
        min,
        max,
        // Clamp guards against rounding pushing the mean outside [min, max]
        mean: (sum / count as f64).clamp(min, max),
    })
}

fn categorical_summary(dataset: &Dataset, idx: usize) -> ColumnSummary {
    if dataset.is_empty() {
        return ColumnSummary::NoData;
    }

    let mut summary = CategoricalSummary::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in &dataset.rows {
        let value = row.cell(idx).to_string();
        match positions.get(&value) {
            Some(&pos) => summary.values[pos].count += 1,
            None => {
                positions.insert(value.clone(), summary.values.len());
                summary.values.push(CategoryCount { value, count: 1 });
            }
        }
    }

    ColumnSummary::Categorical(summary)
}
