//! Data engine: ingestion, statistics, filtering, views, charts and export.
//!
//! Stages are plain functions over an immutable [`crate::types::Dataset`]
//! and row positions into it:
//!
//! ```text
//! csv_parser/archive -> stats -> filter -> view -> chart_engine / export
//! ```
//!
//! ## Error Handling
//!
//! All data operations return `DataResult<T>` which uses the `DataError` type.
//! Common errors include:
//! - `TooLarge`: File exceeds size limits
//! - `TooManyRows`: Dataset exceeds row limits
//! - `NoMatchingEntry`: Archive holds no delimited-text entry
//! - `NoSelection`/`UnknownColumn`: Chart requested with a bad selection

pub mod archive;
pub mod chart_engine;
pub mod csv_parser;
pub mod error;
pub mod export;
pub mod filter;
pub mod stats;
pub mod view;

pub use archive::{ArchiveEntry, compress_entry, extract_entry, extract_entry_with_limit};
pub use chart_engine::{
    AxisHints, ChartDescription, ResolvedAnnotation, Rgb, Series, SeriesStyle, Theme,
    TooltipRules,
};
pub use csv_parser::{InferenceMode, ParseOptions, load_path, parse_csv_bytes, parse_csv_content};
pub use error::*;
pub use export::{export_chart_data, export_table, quote_csv_field};
pub use filter::{CategoryFilter, CategorySelection, FilterSet, RangeFilter};
pub use stats::{
    CategoricalSummary, CategoryCount, ColumnProfile, ColumnSummary, DatasetProfile,
    NumericSummary,
};
pub use view::{SortDirection, SortSpec, ViewOutput, ViewRow, ViewState};
