//! The single exploration session.
//!
//! All state lives in an immutable [`Snapshot`]. Changes arrive as [`Event`]s;
//! [`reduce`] derives the next snapshot from the previous one and re-runs the
//! filter stage from scratch. A failed event leaves the current snapshot in
//! place. Subscribers get every new snapshot.

use crate::data::chart_engine::{self, ChartDescription, Theme};
use crate::data::csv_parser;
use crate::data::error::{DataError, DataResult};
use crate::data::export;
use crate::data::filter::{self, FilterSet};
use crate::data::stats::{self, DatasetProfile};
use crate::data::view::{self, ViewOutput, ViewState};
use crate::perf::measure_and_log;
use crate::render::ChartRenderer;
use crate::settings::EngineSettings;
use crate::storage::{SavedVisualization, VisualizationStore};
use crate::types::{Annotation, ChartKind, ChartSelection, Dataset};
use std::path::Path;
use std::sync::Arc;

/// Everything that can change session state
#[derive(Clone, Debug)]
pub enum Event {
    /// Replace the dataset; filters, view and selection start over
    DatasetLoaded(Dataset),
    SetRange { column: String, min: f64, max: f64 },
    SetRangeMin { column: String, value: f64 },
    SetRangeMax { column: String, value: f64 },
    ToggleCategory { column: String, value: String },
    SelectAllCategories { column: String },
    ClearCategories { column: String },
    SelectOnly { column: String, values: Vec<String> },
    ResetFilters,
    SetSearch(String),
    ToggleSort(String),
    SetGroupBy(Option<String>),
    SetPage(usize),
    NextPage,
    PrevPage,
    SetRowsPerPage(usize),
    SetVisibleColumns(Vec<String>),
    HideColumn(String),
    ShowColumn(String),
    PinColumn(String),
    UnpinColumn(String),
    SetChartKind(ChartKind),
    SetXColumn(String),
    SetYColumn(String),
    AddAnnotation(Annotation),
    /// Annotate the chart point at an index reported by the renderer
    AnnotatePoint {
        point_index: usize,
        note: String,
        anchor_to_row: bool,
    },
    ClearAnnotations,
    SetTheme(Theme),
    LoadVisualization(SavedVisualization),
}

/// Immutable session state after an event
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub dataset: Arc<Dataset>,
    /// Statistics over the whole dataset
    pub profile: Arc<DatasetProfile>,
    pub filters: FilterSet,
    pub view: ViewState,
    pub chart_kind: ChartKind,
    /// `None` while the dataset has fewer than two columns
    pub selection: Option<ChartSelection>,
    pub theme: Theme,
    pub annotations: Vec<Annotation>,
    /// Dataset positions passing filters and search, in dataset order
    pub filtered: Vec<usize>,
    /// Bumped on every applied event
    pub version: u64,
}

impl Snapshot {
    /// State before any data is loaded
    pub fn empty(settings: &EngineSettings) -> Self {
        Self {
            dataset: Arc::new(Dataset::default()),
            profile: Arc::new(DatasetProfile::default()),
            filters: FilterSet::default(),
            view: ViewState {
                rows_per_page: settings.rows_per_page,
                ..ViewState::default()
            },
            chart_kind: ChartKind::default(),
            selection: None,
            theme: settings.theme(),
            annotations: Vec::new(),
            filtered: Vec::new(),
            version: 0,
        }
    }

    /// The current table page
    pub fn view_output(&self) -> ViewOutput {
        view::view(&self.dataset, &self.filtered, &self.view)
    }

    /// Filtered rows in the table's sort order, unpaginated
    pub fn sorted_rows(&self) -> Vec<usize> {
        view::sort_rows(&self.dataset, &self.filtered, self.view.sort.as_ref())
    }

    /// Chart description for the filtered rows
    pub fn chart(&self) -> DataResult<ChartDescription> {
        chart_engine::build(
            &self.dataset,
            &self.filtered,
            self.selection.as_ref(),
            &self.theme,
            &self.annotations,
        )
    }

    /// Filtered, sorted rows with columns in display order
    pub fn export_table(&self, delimiter: char) -> String {
        export::export_table(
            &self.dataset,
            &self.sorted_rows(),
            &self.view.column_order(),
            delimiter,
        )
    }

    /// The chart's x and y columns over the filtered rows
    pub fn export_chart_data(&self, delimiter: char) -> DataResult<String> {
        export::export_chart_data(
            &self.dataset,
            &self.filtered,
            self.selection.as_ref(),
            delimiter,
        )
    }

    /// e.g. `Showing 2 of 3 records`
    pub fn record_summary(&self) -> String {
        format!(
            "Showing {} of {} records",
            self.filtered.len(),
            self.dataset.row_count()
        )
    }

    /// A saveable record of the current chart and filters
    pub fn to_saved(&self, name: &str) -> DataResult<SavedVisualization> {
        SavedVisualization::new(
            name,
            self.chart_kind,
            self.selection.clone(),
            self.filters.clone(),
        )
    }
}

/// Derive the next snapshot; the previous one is never modified
pub fn reduce(prev: &Snapshot, event: Event, settings: &EngineSettings) -> DataResult<Snapshot> {
    let mut next = prev.clone();

    match event {
        Event::DatasetLoaded(dataset) => {
            let profile = measure_and_log("statistics", settings.slow_stage_ms, || {
                stats::compute(&dataset)
            });
            next.filters = FilterSet::from_profile(&profile);
            next.view = ViewState::for_dataset(&dataset, prev.view.rows_per_page);
            next.selection = ChartSelection::for_dataset(&dataset, prev.chart_kind);
            // Row keys mean nothing in a different dataset
            next.annotations.retain(|a| !a.is_row_anchored());
            next.profile = Arc::new(profile);
            next.dataset = Arc::new(dataset);
        }
        Event::SetRange { column, min, max } => {
            finite_bound(&column, min)?;
            finite_bound(&column, max)?;
            require(next.filters.set_range(&column, min, max), column)?;
        }
        Event::SetRangeMin { column, value } => {
            finite_bound(&column, value)?;
            require(next.filters.set_current_min(&column, value), column)?;
        }
        Event::SetRangeMax { column, value } => {
            finite_bound(&column, value)?;
            require(next.filters.set_current_max(&column, value), column)?;
        }
        Event::ToggleCategory { column, value } => {
            require(next.filters.toggle_category(&column, &value), column)?;
        }
        Event::SelectAllCategories { column } => {
            require(next.filters.select_all(&column), column)?;
        }
        Event::ClearCategories { column } => {
            require(next.filters.select_none(&column), column)?;
        }
        Event::SelectOnly { column, values } => {
            require(next.filters.select_only(&column, values), column)?;
        }
        Event::ResetFilters => next.filters.reset(),
        Event::SetSearch(text) => next.view.search = text,
        Event::ToggleSort(column) => {
            known_column(&next.dataset, &column)?;
            next.view.toggle_sort(&column);
        }
        Event::SetGroupBy(column) => {
            if let Some(column) = &column {
                known_column(&next.dataset, column)?;
            }
            next.view.group_by = column;
        }
        Event::SetPage(page) => next.view.set_page(page),
        Event::NextPage => {
            let total_pages = prev.view_output().total_pages;
            next.view.next_page(total_pages);
        }
        Event::PrevPage => next.view.prev_page(),
        Event::SetRowsPerPage(rows) => next.view.set_rows_per_page(rows),
        Event::SetVisibleColumns(columns) => next.view.set_visible(columns),
        Event::HideColumn(column) => next.view.hide(&column),
        Event::ShowColumn(column) => {
            known_column(&next.dataset, &column)?;
            next.view.show(&next.dataset, &column);
        }
        Event::PinColumn(column) => {
            known_column(&next.dataset, &column)?;
            next.view.pin(&column);
        }
        Event::UnpinColumn(column) => next.view.unpin(&column),
        Event::SetChartKind(kind) => {
            next.chart_kind = kind;
            next.selection = next.selection.take().map(|s| s.with_kind(kind));
        }
        Event::SetXColumn(column) => {
            known_column(&next.dataset, &column)?;
            let y = next
                .selection
                .as_ref()
                .map(|s| s.y_column.clone())
                .unwrap_or_else(|| column.clone());
            next.selection = Some(ChartSelection::new(next.chart_kind, column, y));
        }
        Event::SetYColumn(column) => {
            known_column(&next.dataset, &column)?;
            let x = next
                .selection
                .as_ref()
                .map(|s| s.x_column.clone())
                .unwrap_or_else(|| column.clone());
            next.selection = Some(ChartSelection::new(next.chart_kind, x, column));
        }
        Event::AddAnnotation(annotation) => next.annotations.push(annotation),
        Event::AnnotatePoint {
            point_index,
            note,
            anchor_to_row,
        } => {
            let description = prev.chart()?;
            let annotation = chart_engine::annotation_from_point(
                &description,
                &prev.dataset,
                &prev.filtered,
                point_index,
                &note,
                anchor_to_row,
            )
            .ok_or_else(|| DataError::Other(format!("No data point at index {}", point_index)))?;
            next.annotations.push(annotation);
        }
        Event::ClearAnnotations => next.annotations.clear(),
        Event::SetTheme(theme) => next.theme = theme,
        Event::LoadVisualization(record) => {
            if let Some(selection) = &record.selection {
                for column in [&selection.x_column, &selection.y_column] {
                    known_column(&next.dataset, column)?;
                }
            }
            next.chart_kind = record.chart_kind;
            if let Some(selection) = record.selection {
                next.selection = Some(selection.with_kind(record.chart_kind));
            }
            next.filters.reset();
            next.filters.apply_snapshot(&record.filters);
        }
    }

    next.filtered = measure_and_log("filter", settings.slow_stage_ms, || {
        filter::apply(
            &next.dataset,
            &next.filters,
            &next.view.search,
            &next.view.visible_columns,
        )
    });
    // Keep the stored page inside the new page range
    let total_pages = next
        .filtered
        .len()
        .div_ceil(next.view.rows_per_page.max(1))
        .max(1);
    next.view.page = next.view.page.clamp(1, total_pages);
    next.version = prev.version + 1;
    Ok(next)
}

fn require(found: bool, column: String) -> DataResult<()> {
    if found {
        Ok(())
    } else {
        Err(DataError::UnknownColumn(column))
    }
}

fn finite_bound(column: &str, value: f64) -> DataResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DataError::InvalidBound {
            column: column.to_string(),
            value,
        })
    }
}

fn known_column(dataset: &Dataset, column: &str) -> DataResult<()> {
    require(dataset.has_column(column), column.to_string())
}

type Subscriber = Box<dyn Fn(&Arc<Snapshot>)>;

/// Owns the current snapshot and applies events to it
pub struct Session {
    settings: EngineSettings,
    state: Arc<Snapshot>,
    subscribers: Vec<Subscriber>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Session {
    pub fn new(settings: EngineSettings) -> Self {
        let state = Arc::new(Snapshot::empty(&settings));
        Self {
            settings,
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state)
    }

    /// Call `f` with every snapshot produced from now on
    pub fn subscribe(&mut self, f: impl Fn(&Arc<Snapshot>) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Apply an event; on error the current snapshot stays
    pub fn dispatch(&mut self, event: Event) -> DataResult<Arc<Snapshot>> {
        match reduce(&self.state, event, &self.settings) {
            Ok(next) => {
                self.state = Arc::new(next);
                for subscriber in &self.subscribers {
                    subscriber(&self.state);
                }
                Ok(self.snapshot())
            }
            Err(e) => {
                tracing::warn!(error = %e, version = self.state.version, "Event rejected");
                Err(e)
            }
        }
    }

    /// Ingest a file and make it the current dataset
    pub fn load_path(&mut self, path: &Path) -> DataResult<Arc<Snapshot>> {
        let dataset = csv_parser::load_path(path, &self.settings.parse_options())?;
        tracing::info!(
            dataset = %dataset.name,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded dataset"
        );
        self.dispatch(Event::DatasetLoaded(dataset))
    }

    /// Save the current chart and filters under a name
    pub fn save(
        &self,
        name: &str,
        store: &dyn VisualizationStore,
    ) -> DataResult<SavedVisualization> {
        let record = self.state.to_saved(name)?;
        store.append(record.clone())?;
        tracing::info!(id = %record.id, name = %record.name, "Saved visualization");
        Ok(record)
    }

    /// Restore a saved record by id or name
    pub fn load_saved(
        &mut self,
        id_or_name: &str,
        store: &dyn VisualizationStore,
    ) -> DataResult<Arc<Snapshot>> {
        let record = store
            .find(id_or_name)?
            .ok_or_else(|| DataError::Storage(format!("No saved visualization '{}'", id_or_name)))?;
        self.dispatch(Event::LoadVisualization(record))
    }

    /// Annotate whatever point the renderer reports under a position
    pub fn annotate_at(
        &mut self,
        renderer: &dyn ChartRenderer,
        x: f32,
        y: f32,
        note: &str,
        anchor_to_row: bool,
    ) -> DataResult<Option<Arc<Snapshot>>> {
        let description = self.state.chart()?;
        let Some(point_index) = renderer.point_at(&description, x, y) else {
            return Ok(None);
        };
        self.dispatch(Event::AnnotatePoint {
            point_index,
            note: note.to_string(),
            anchor_to_row,
        })
        .map(Some)
    }
}
