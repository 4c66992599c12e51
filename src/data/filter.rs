//! Filter engine: range, category and text predicates over a dataset.
//!
//! Stages always run in the same order (ranges, then categories, then
//! search) and are ANDed. The result is a list of row positions in dataset
//! order; nothing is copied.

use crate::data::stats::{ColumnSummary, DatasetProfile};
use crate::types::{Cell, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numeric bounds for one column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub column: String,
    /// Dataset minimum, fixed at initialization
    pub min: f64,
    /// Dataset maximum, fixed at initialization
    pub max: f64,
    pub current_min: f64,
    pub current_max: f64,
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            column: column.into(),
            min,
            max,
            current_min: min,
            current_max: max,
        }
    }

    /// Whether a cell passes; anything but a number fails
    pub fn contains(&self, cell: &Cell) -> bool {
        match cell {
            Cell::Number(n) => *n >= self.current_min && *n <= self.current_max,
            _ => false,
        }
    }

    /// Current bounds lie inside the dataset bounds and are ordered
    pub fn is_within_bounds(&self) -> bool {
        self.current_min >= self.min
            && self.current_max <= self.max
            && self.current_min <= self.current_max
    }

    /// Current bounds differ from the dataset bounds
    pub fn is_active(&self) -> bool {
        self.current_min != self.min || self.current_max != self.max
    }
}

/// Which category values pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "values", rename_all = "snake_case")]
pub enum CategorySelection {
    /// Unset: every row passes
    #[default]
    All,
    /// Only rows with one of these values pass; empty passes nothing
    Only(Vec<String>),
}

impl CategorySelection {
    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Only(values) => values.iter().any(|v| v == value),
        }
    }
}

/// Allowed values for one categorical column
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub column: String,
    /// Every distinct value in the dataset, first-seen order
    pub values: Vec<String>,
    pub selection: CategorySelection,
}

impl CategoryFilter {
    pub fn new(column: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            column: column.into(),
            values,
            selection: CategorySelection::All,
        }
    }

    /// Flip one value in or out of the selection
    pub fn toggle(&mut self, value: &str) {
        let mut selected: Vec<String> = match &self.selection {
            CategorySelection::All => self.values.clone(),
            CategorySelection::Only(values) => values.clone(),
        };
        match selected.iter().position(|v| v == value) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(value.to_string()),
        }
        // Keep the dataset's value order so snapshots compare equal
        selected.sort_by_key(|v| self.values.iter().position(|d| d == v).unwrap_or(usize::MAX));
        self.selection = if selected.len() == self.values.len()
            && self.values.iter().all(|v| selected.contains(v))
        {
            CategorySelection::All
        } else {
            CategorySelection::Only(selected)
        };
    }

    pub fn is_active(&self) -> bool {
        self.selection != CategorySelection::All
    }
}

/// All filters of a session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub ranges: Vec<RangeFilter>,
    pub categories: Vec<CategoryFilter>,
}

impl FilterSet {
    /// Initialize from a dataset profile: full ranges and every category selected
    pub fn from_profile(profile: &DatasetProfile) -> Self {
        let mut filters = FilterSet::default();
        for column in &profile.columns {
            match &column.summary {
                ColumnSummary::Numeric(n) => {
                    filters.ranges.push(RangeFilter::new(&column.column, n.min, n.max));
                }
                ColumnSummary::Categorical(c) => {
                    filters
                        .categories
                        .push(CategoryFilter::new(&column.column, c.distinct()));
                }
                ColumnSummary::NoData => {}
            }
        }
        filters
    }

    /// First range bound that is NaN or infinite, as `(column, value)`
    pub fn non_finite_bound(&self) -> Option<(&str, f64)> {
        self.ranges.iter().find_map(|r| {
            [r.min, r.max, r.current_min, r.current_max]
                .into_iter()
                .find(|v| !v.is_finite())
                .map(|v| (r.column.as_str(), v))
        })
    }

    /// Put every filter back to its initial state
    pub fn reset(&mut self) {
        for range in &mut self.ranges {
            range.current_min = range.min;
            range.current_max = range.max;
        }
        for category in &mut self.categories {
            category.selection = CategorySelection::All;
        }
    }

    pub fn range(&self, column: &str) -> Option<&RangeFilter> {
        self.ranges.iter().find(|r| r.column == column)
    }

    pub fn category(&self, column: &str) -> Option<&CategoryFilter> {
        self.categories.iter().find(|c| c.column == column)
    }

    fn range_mut(&mut self, column: &str) -> Option<&mut RangeFilter> {
        self.ranges.iter_mut().find(|r| r.column == column)
    }

    fn category_mut(&mut self, column: &str) -> Option<&mut CategoryFilter> {
        self.categories.iter_mut().find(|c| c.column == column)
    }

    /// Set both current bounds; returns false for an unknown column
    pub fn set_range(&mut self, column: &str, min: f64, max: f64) -> bool {
        match self.range_mut(column) {
            Some(range) => {
                range.current_min = min;
                range.current_max = max;
                true
            }
            None => false,
        }
    }

    pub fn set_current_min(&mut self, column: &str, min: f64) -> bool {
        match self.range_mut(column) {
            Some(range) => {
                range.current_min = min;
                true
            }
            None => false,
        }
    }

    pub fn set_current_max(&mut self, column: &str, max: f64) -> bool {
        match self.range_mut(column) {
            Some(range) => {
                range.current_max = max;
                true
            }
            None => false,
        }
    }

    pub fn toggle_category(&mut self, column: &str, value: &str) -> bool {
        match self.category_mut(column) {
            Some(category) => {
                category.toggle(value);
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self, column: &str) -> bool {
        match self.category_mut(column) {
            Some(category) => {
                category.selection = CategorySelection::All;
                true
            }
            None => false,
        }
    }

    /// Deselect every value: the column then passes no rows
    pub fn select_none(&mut self, column: &str) -> bool {
        self.select_only(column, Vec::new())
    }

    pub fn select_only(&mut self, column: &str, values: Vec<String>) -> bool {
        match self.category_mut(column) {
            Some(category) => {
                category.selection = CategorySelection::Only(values);
                true
            }
            None => false,
        }
    }

    /// Number of filters narrowing the data
    pub fn active_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_active()).count()
            + self.categories.iter().filter(|c| c.is_active()).count()
    }

    /// Restore a saved snapshot onto filters built for the current dataset.
    ///
    /// Bounds stay those of the current dataset; columns the dataset no
    /// longer has are ignored.
    pub fn apply_snapshot(&mut self, snapshot: &FilterSet) {
        for saved in &snapshot.ranges {
            self.set_range(&saved.column, saved.current_min, saved.current_max);
        }
        for saved in &snapshot.categories {
            if let Some(category) = self.category_mut(&saved.column) {
                category.selection = saved.selection.clone();
            }
        }
    }
}

/// Row positions passing every filter and the search text, in dataset order
pub fn apply(
    dataset: &Dataset,
    filters: &FilterSet,
    search: &str,
    visible_columns: &[String],
) -> Vec<usize> {
    crate::profile_scope!("filter");
    let ranges: Vec<(usize, &RangeFilter)> = filters
        .ranges
        .iter()
        .filter_map(|r| dataset.column_index(&r.column).map(|i| (i, r)))
        .collect();
    let categories: Vec<(usize, &CategoryFilter)> = filters
        .categories
        .iter()
        .filter(|c| c.is_active())
        .filter_map(|c| dataset.column_index(&c.column).map(|i| (i, c)))
        .collect();

    // Whitespace-only search is no search; otherwise match the text as given
    let needle = if search.trim().is_empty() {
        String::new()
    } else {
        search.to_lowercase()
    };
    let search_columns: Vec<usize> = if needle.is_empty() {
        Vec::new()
    } else {
        visible_columns
            .iter()
            .filter_map(|name| dataset.column_index(name))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect()
    };

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| ranges.iter().all(|(i, r)| r.contains(row.cell(*i))))
        .filter(|(_, row)| {
            categories
                .iter()
                .all(|(i, c)| c.selection.is_selected(&row.cell(*i).to_string()))
        })
        .filter(|(_, row)| {
            needle.is_empty()
                || search_columns
                    .iter()
                    .any(|i| row.cell(*i).to_string().to_lowercase().contains(&needle))
        })
        .map(|(pos, _)| pos)
        .collect()
}
