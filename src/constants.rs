//! Engine-wide constants.
//!
//! Centralizes limits and defaults so ingestion, the view pipeline and the
//! chart builder agree on the same values.

// ============================================================================
// Data Loading
// ============================================================================

/// Maximum number of CSV rows to load
pub const MAX_CSV_ROWS: usize = 100_000;

/// Maximum CSV file size in MB
pub const MAX_CSV_SIZE_MB: usize = 100;

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Entry extension searched for inside an archive
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "csv";

// ============================================================================
// Table View
// ============================================================================

/// Default rows per page
pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

/// Bucket key used when grouping by a missing or empty value
pub const OTHER_GROUP_KEY: &str = "Other";

// ============================================================================
// Charts
// ============================================================================

/// Decimal places used by tooltips and the statistics panel
pub const VALUE_DECIMALS: usize = 2;

/// Decimal places used for percentages
pub const PERCENT_DECIMALS: usize = 1;

// ============================================================================
// Timing
// ============================================================================

/// A pipeline stage slower than this (in milliseconds) is logged
pub const SLOW_STAGE_MS: f64 = 50.0;
