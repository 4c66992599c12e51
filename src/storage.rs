//! Saved visualizations and the storage collaborator.
//!
//! Records are write-once and the store is append-only: there is no update
//! or delete. A record restores onto whatever dataset is loaded when it is
//! opened, so nothing in it refers to row data.

use crate::data::error::{DataError, DataResult};
use crate::data::filter::FilterSet;
use crate::types::{ChartKind, ChartSelection};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A named chart configuration plus the filters it was saved with
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedVisualization {
    pub id: String,
    pub name: String,
    pub chart_kind: ChartKind,
    pub selection: Option<ChartSelection>,
    pub filters: FilterSet,
    /// Unix seconds
    pub created_at: u64,
}

impl SavedVisualization {
    /// Create a record; the name must not be blank
    pub fn new(
        name: &str,
        chart_kind: ChartKind,
        selection: Option<ChartSelection>,
        filters: FilterSet,
    ) -> DataResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DataError::MissingName);
        }
        require_finite_bounds(&filters)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            chart_kind,
            selection,
            filters,
            created_at: unix_now(),
        })
    }
}

/// JSON has no representation for NaN or infinity, so such bounds never reach a store
fn require_finite_bounds(filters: &FilterSet) -> DataResult<()> {
    match filters.non_finite_bound() {
        Some((column, value)) => Err(DataError::InvalidBound {
            column: column.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

/// Saved-visualization file under the user's data directory
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("csvscope").join("visualizations.json"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Where saved visualizations live
pub trait VisualizationStore {
    /// Every record, oldest first
    fn list(&self) -> DataResult<Vec<SavedVisualization>>;

    fn append(&self, record: SavedVisualization) -> DataResult<()>;

    fn find(&self, id_or_name: &str) -> DataResult<Option<SavedVisualization>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|r| r.id == id_or_name || r.name == id_or_name))
    }
}

/// In-process store, lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SavedVisualization>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisualizationStore for MemoryStore {
    fn list(&self) -> DataResult<Vec<SavedVisualization>> {
        Ok(self.records.lock().clone())
    }

    fn append(&self, record: SavedVisualization) -> DataResult<()> {
        self.records.lock().push(record);
        Ok(())
    }
}

/// Store backed by one JSON array file
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> DataResult<Vec<SavedVisualization>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            DataError::Storage(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl VisualizationStore for JsonFileStore {
    fn list(&self) -> DataResult<Vec<SavedVisualization>> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn append(&self, record: SavedVisualization) -> DataResult<()> {
        require_finite_bounds(&record.filters)?;
        let _guard = self.lock.lock();
        let mut records = self.read()?;
        tracing::debug!(id = %record.id, name = %record.name, "Saving visualization");
        records.push(record);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }
}
