//! View engine: sort, group and paginate a filtered row set.
//!
//! Sorting works on row positions, never on the rows themselves, so the
//! dataset stays shared and untouched.

use crate::constants::{DEFAULT_ROWS_PER_PAGE, OTHER_GROUP_KEY};
use crate::types::{Cell, Dataset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Table presentation state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub sort: Option<SortSpec>,
    pub group_by: Option<String>,
    pub visible_columns: Vec<String>,
    /// Pinned columns in pin order; always shown first
    pub pinned_columns: Vec<String>,
    /// 1-based
    pub page: usize,
    pub rows_per_page: usize,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort: None,
            group_by: None,
            visible_columns: Vec::new(),
            pinned_columns: Vec::new(),
            page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            search: String::new(),
        }
    }
}

impl ViewState {
    /// Fresh state: every column visible, nothing pinned, first page
    pub fn for_dataset(dataset: &Dataset, rows_per_page: usize) -> Self {
        Self {
            visible_columns: dataset.column_names(),
            rows_per_page,
            ..Self::default()
        }
    }

    /// Same column flips direction; a new column starts ascending
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.column == column => Some(SortSpec {
                direction: spec.direction.reversed(),
                ..spec
            }),
            _ => Some(SortSpec {
                column: column.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }

    pub fn pin(&mut self, column: &str) {
        if !self.pinned_columns.iter().any(|c| c == column) {
            self.pinned_columns.push(column.to_string());
        }
    }

    pub fn unpin(&mut self, column: &str) {
        self.pinned_columns.retain(|c| c != column);
    }

    pub fn hide(&mut self, column: &str) {
        self.visible_columns.retain(|c| c != column);
    }

    /// Show a column again at its dataset position
    pub fn show(&mut self, dataset: &Dataset, column: &str) {
        if !dataset.has_column(column) || self.visible_columns.iter().any(|c| c == column) {
            return;
        }
        self.visible_columns.push(column.to_string());
        self.visible_columns
            .sort_by_key(|c| dataset.column_index(c).unwrap_or(usize::MAX));
    }

    pub fn set_visible(&mut self, columns: Vec<String>) {
        self.visible_columns = columns;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page;
        // Reset to first page when changing page size
        self.page = 1;
    }

    /// Display order: pinned columns first, then the other visible ones
    pub fn column_order(&self) -> Vec<String> {
        let mut order = self.pinned_columns.clone();
        order.extend(
            self.visible_columns
                .iter()
                .filter(|c| !self.pinned_columns.contains(c))
                .cloned(),
        );
        order
    }

    fn effective_rows_per_page(&self) -> usize {
        self.rows_per_page.max(1)
    }
}

/// One line of a rendered page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewRow {
    /// Group header pseudo-row; does not count toward the page size
    GroupHeader { key: String, count: usize },
    /// Position of a dataset row
    Data { row: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    /// Offset of the group's first row in the flattened, sorted order
    pub first_row: usize,
}

/// The page to display plus pagination totals
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub page_rows: Vec<ViewRow>,
    /// Rows after filtering, across all pages
    pub total_rows: usize,
    pub total_pages: usize,
    /// Page actually shown, after clamping
    pub page: usize,
    pub groups: Vec<GroupSummary>,
}

impl ViewOutput {
    /// Dataset positions on this page, headers skipped
    pub fn data_rows(&self) -> Vec<usize> {
        self.page_rows
            .iter()
            .filter_map(|r| match r {
                ViewRow::Data { row } => Some(*row),
                ViewRow::GroupHeader { .. } => None,
            })
            .collect()
    }

    /// Half-open range of flattened rows on this page
    pub fn visible_range(&self, rows_per_page: usize) -> std::ops::Range<usize> {
        let rows_per_page = rows_per_page.max(1);
        let start = (self.page.saturating_sub(1) * rows_per_page).min(self.total_rows);
        let end = (start + rows_per_page).min(self.total_rows);
        start..end
    }
}

/// Compare two cells: numbers by value, everything else by display string
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Number(x), Cell::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Sort filtered row positions by the view's sort key (stable)
pub fn sort_rows(dataset: &Dataset, filtered: &[usize], sort: Option<&SortSpec>) -> Vec<usize> {
    let mut sorted = filtered.to_vec();
    let Some(spec) = sort else {
        return sorted;
    };
    let Some(col) = dataset.column_index(&spec.column) else {
        return sorted;
    };

    sorted.sort_by(|&a, &b| {
        let ord = compare_cells(dataset.rows[a].cell(col), dataset.rows[b].cell(col));
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    sorted
}

/// Bucket key of a cell for grouping
pub fn group_key(cell: &Cell) -> String {
    let value = cell.to_string();
    if value.trim().is_empty() {
        OTHER_GROUP_KEY.to_string()
    } else {
        value
    }
}

/// Sort, group and cut out the requested page
pub fn view(dataset: &Dataset, filtered: &[usize], state: &ViewState) -> ViewOutput {
    crate::profile_scope!("view");
    let sorted = sort_rows(dataset, filtered, state.sort.as_ref());

    // Flatten buckets in first-seen order over the sorted rows
    let (ordered, keys, groups) = match state
        .group_by
        .as_deref()
        .and_then(|g| dataset.column_index(g))
    {
        Some(col) => group_rows(dataset, &sorted, col),
        None => (sorted, Vec::new(), Vec::new()),
    };

    let rows_per_page = state.effective_rows_per_page();
    let total_rows = ordered.len();
    let total_pages = total_rows.div_ceil(rows_per_page).max(1);
    let page = state.page.clamp(1, total_pages);

    let start = ((page - 1) * rows_per_page).min(total_rows);
    let end = (start + rows_per_page).min(total_rows);

    let mut page_rows = Vec::with_capacity(end - start);
    for offset in start..end {
        if !keys.is_empty() {
            let key = &keys[offset];
            if offset == start || keys[offset - 1] != *key {
                let count = groups
                    .iter()
                    .find(|g| g.key == *key)
                    .map(|g| g.count)
                    .unwrap_or(0);
                page_rows.push(ViewRow::GroupHeader {
                    key: key.clone(),
                    count,
                });
            }
        }
        page_rows.push(ViewRow::Data {
            row: ordered[offset],
        });
    }

    ViewOutput {
        page_rows,
        total_rows,
        total_pages,
        page,
        groups,
    }
}

fn group_rows(
    dataset: &Dataset,
    sorted: &[usize],
    col: usize,
) -> (Vec<usize>, Vec<String>, Vec<GroupSummary>) {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

    for &pos in sorted {
        let key = group_key(dataset.rows[pos].cell(col));
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(pos);
    }

    let mut ordered = Vec::with_capacity(sorted.len());
    let mut keys = Vec::with_capacity(sorted.len());
    let mut groups = Vec::with_capacity(order.len());
    for key in order {
        let rows = buckets.remove(&key).unwrap_or_default();
        groups.push(GroupSummary {
            key: key.clone(),
            count: rows.len(),
            first_row: ordered.len(),
        });
        keys.extend(std::iter::repeat_n(key, rows.len()));
        ordered.extend(rows);
    }
    (ordered, keys, groups)
}
