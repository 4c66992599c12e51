//! Unit tests for saved visualizations and stores.

use csvscope::data::{DataError, FilterSet, RangeFilter};
use csvscope::storage::{JsonFileStore, MemoryStore, SavedVisualization, VisualizationStore};
use csvscope::types::{ChartKind, ChartSelection};
use std::fs;
use tempfile::tempdir;

fn record(name: &str) -> SavedVisualization {
    let filters = FilterSet {
        ranges: vec![RangeFilter::new("score", 70.0, 90.0)],
        categories: Vec::new(),
    };
    SavedVisualization::new(
        name,
        ChartKind::Radar,
        Some(ChartSelection::new(ChartKind::Radar, "name", "score")),
        filters,
    )
    .unwrap()
}

#[test]
fn test_record_has_uuid_and_timestamp() {
    let a = record("First");
    let b = record("First");
    assert_eq!(a.id.len(), 36);
    assert_ne!(a.id, b.id);
    assert!(a.created_at > 0);
}

#[test]
fn test_name_is_trimmed_and_required() {
    assert_eq!(record("  Weekly  ").name, "Weekly");
    let err = SavedVisualization::new("", ChartKind::Bar, None, FilterSet::default()).unwrap_err();
    assert!(matches!(err, DataError::MissingName));
    assert!(err.is_validation());
}

#[test]
fn test_json_store_appends_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("saved.json");

    let store = JsonFileStore::new(&path);
    assert!(store.list().unwrap().is_empty());
    store.append(record("one")).unwrap();
    store.append(record("two")).unwrap();

    let reopened = JsonFileStore::new(&path);
    let records = reopened.list().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].name, "two");
    assert_eq!(records[0].filters.ranges[0].column, "score");
    assert_eq!(reopened.find(&records[0].id).unwrap().unwrap().name, "one");
}

#[test]
fn test_json_store_rejects_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(matches!(store.list(), Err(DataError::Storage(_))));
    assert!(store.append(record("x")).is_err());
    // The corrupt file is left alone
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn test_memory_store_shared_by_reference() {
    let store = MemoryStore::new();
    let as_trait: &dyn VisualizationStore = &store;
    as_trait.append(record("a")).unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_non_finite_bounds_never_reach_the_file() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("saved.json"));
    store.append(record("kept")).unwrap();

    let mut filters = FilterSet {
        ranges: vec![RangeFilter::new("score", 70.0, 90.0)],
        categories: Vec::new(),
    };
    filters.set_range("score", f64::NEG_INFINITY, f64::INFINITY);
    let err = SavedVisualization::new("open", ChartKind::Bar, None, filters.clone()).unwrap_err();
    assert!(matches!(err, DataError::InvalidBound { ref column, .. } if column == "score"));
    assert!(err.is_validation());

    // A record built by hand is refused by the store itself
    let mut forged = record("forged");
    forged.filters = filters;
    assert!(matches!(store.append(forged), Err(DataError::InvalidBound { .. })));

    let records = store.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "kept");
}
