//! CSV and TSV parsing with type inference
//!
//! Parses delimited text into a [`Dataset`]. Parsing is lenient: short rows
//! are padded with `Missing`, long rows are truncated, and values that do not
//! parse as numbers are kept as text.
//!
//! ## Memory Limits
//!
//! To prevent unbounded memory growth:
//! - Files larger than 100MB are rejected (see [`MAX_CSV_SIZE_MB`])
//! - Inputs with more than `max_rows` data rows are rejected (see [`MAX_CSV_ROWS`])

use crate::constants::{
    DEFAULT_ARCHIVE_EXTENSION, DEFAULT_DELIMITER, MAX_CSV_ROWS, MAX_CSV_SIZE_MB, SLOW_STAGE_MS,
};
use crate::data::archive;
use crate::data::error::{DataError, DataResult};
use crate::perf::ScopedTimer;
use crate::types::{Cell, Column, ColumnKind, Dataset, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a column's kind is decided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    /// The first data row decides
    #[default]
    FirstRow,
    /// Numeric when more than half of the non-missing cells are numbers
    Majority,
}

/// Options for turning text into a dataset
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    pub delimiter: char,
    pub inference: InferenceMode,
    pub max_rows: usize,
    /// Entry extension searched for inside archives (without the dot)
    pub archive_extension: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            inference: InferenceMode::default(),
            max_rows: MAX_CSV_ROWS,
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
        }
    }
}

impl ParseOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_inference(mut self, inference: InferenceMode) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Load a CSV/TSV file or a gzip archive holding one
///
/// # Memory Limits
/// - Files larger than [`MAX_CSV_SIZE_MB`]MB will return [`DataError::TooLarge`]
pub fn load_path(path: &Path, options: &ParseOptions) -> DataResult<Dataset> {
    let _timer = ScopedTimer::new("load_path", SLOW_STAGE_MS);

    let metadata = std::fs::metadata(path)?;
    let size_mb = metadata.len() / (1024 * 1024);
    if size_mb > MAX_CSV_SIZE_MB as u64 {
        return Err(DataError::TooLarge {
            size_mb,
            max_mb: MAX_CSV_SIZE_MB,
        });
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("data")
        .to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "gz" => {
            let bytes = std::fs::read(path)?;
            let fallback = file_name
                .strip_suffix(".gz")
                .or_else(|| file_name.strip_suffix(".GZ"))
                .unwrap_or(&file_name)
                .to_string();
            let entry = archive::extract_entry(&bytes, &fallback, &options.archive_extension)?;
            let options = ParseOptions {
                delimiter: delimiter_for_name(&entry.name, options.delimiter),
                ..options.clone()
            };
            parse_csv_content(&entry.text, &dataset_name(&entry.name), &options)
        }
        "csv" | "tsv" | "txt" => {
            let bytes = std::fs::read(path)?;
            let options = ParseOptions {
                delimiter: delimiter_for_name(&file_name, options.delimiter),
                ..options.clone()
            };
            parse_csv_bytes(&bytes, &dataset_name(&file_name), &options)
        }
        other => Err(DataError::UnsupportedExtension(if other.is_empty() {
            file_name
        } else {
            format!(".{}", other)
        })),
    }
}

/// Decode UTF-8 bytes (with or without a BOM) and parse them
pub fn parse_csv_bytes(bytes: &[u8], name: &str, options: &ParseOptions) -> DataResult<Dataset> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let content = std::str::from_utf8(bytes).map_err(|e| DataError::Encoding(e.to_string()))?;
    parse_csv_content(content, name, options)
}

/// Parse CSV/TSV content from a string
///
/// # Memory Limits
/// - Content resulting in more than `options.max_rows` rows will return [`DataError::TooManyRows`]
pub fn parse_csv_content(content: &str, name: &str, options: &ParseOptions) -> DataResult<Dataset> {
    let start = std::time::Instant::now();
    let mut records = parse_records(content, options.delimiter).into_iter();

    // Parse header row
    let header = records.next().ok_or(DataError::EmptyFile)?.fields;
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(DataError::NoColumns);
    }
    let names = unique_names(&header);
    let width = names.len();

    // Parse data rows with limit
    let mut rows: Vec<Row> = Vec::new();
    let mut padded = 0usize;
    let mut truncated = 0usize;
    for record in records {
        if is_blank(&record) {
            continue;
        }
        if rows.len() >= options.max_rows {
            return Err(DataError::TooManyRows {
                rows: rows.len() + 1, // +1 for the current row that exceeded limit
                max_rows: options.max_rows,
            });
        }
        let record = record.fields;
        if record.len() < width {
            padded += 1;
        } else if record.len() > width {
            truncated += 1;
        }
        let cells: Vec<Cell> = (0..width)
            .map(|i| record.get(i).map(|f| Cell::parse(f)).unwrap_or(Cell::Missing))
            .collect();
        rows.push(Row::new(rows.len(), cells));
    }

    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(i, name)| Column {
            name: name.clone(),
            kind: infer_column_kind(&rows, i, options.inference),
        })
        .collect();

    tracing::debug!(
        dataset = name,
        rows = rows.len(),
        columns = columns.len(),
        padded,
        truncated,
        elapsed = ?start.elapsed(),
        "Parsed delimited text"
    );

    Ok(Dataset::new(name, columns, rows))
}

/// Decide a column's kind from already-parsed cells
pub fn infer_column_kind(rows: &[Row], col_idx: usize, mode: InferenceMode) -> ColumnKind {
    match mode {
        InferenceMode::FirstRow => match rows.first().map(|r| r.cell(col_idx)) {
            Some(Cell::Number(_)) => ColumnKind::Numeric,
            _ => ColumnKind::Categorical,
        },
        InferenceMode::Majority => {
            let (numbers, present) = rows
                .iter()
                .map(|r| r.cell(col_idx))
                .filter(|c| !c.is_missing())
                .fold((0usize, 0usize), |(n, p), c| {
                    (n + usize::from(c.is_number()), p + 1)
                });
            if present > 0 && numbers * 2 > present {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            }
        }
    }
}

/// Check if a file path is a loadable data file
pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt" | "gz"))
        .unwrap_or(false)
}

/// Tab for `.tsv` names, the configured delimiter otherwise
fn delimiter_for_name(name: &str, default: char) -> char {
    if name.to_lowercase().ends_with(".tsv") {
        '\t'
    } else {
        default
    }
}

/// File name without its last extension
fn dataset_name(file_name: &str) -> String {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// One physical record and whether any of its fields was quoted
struct RawRecord {
    fields: Vec<String>,
    quoted: bool,
}

/// Split text into records and fields, honoring double quotes.
///
/// A delimiter or line break inside quotes belongs to the field, and a doubled
/// quote inside quotes is a literal quote.
fn parse_records(content: &str, delimiter: char) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.trim().is_empty() {
            field.clear();
            in_quotes = true;
            quoted = true;
        } else if c == delimiter {
            record.push(std::mem::take(&mut field));
        } else if c == '\n' || c == '\r' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            record.push(std::mem::take(&mut field));
            records.push(RawRecord {
                fields: std::mem::take(&mut record),
                quoted: std::mem::take(&mut quoted),
            });
        } else {
            field.push(c);
        }
    }

    // Add the last record when the input does not end with a newline
    if !field.is_empty() || !record.is_empty() || quoted {
        record.push(field);
        records.push(RawRecord {
            fields: record,
            quoted,
        });
    }

    records
}

/// An empty line; a quoted empty field (`""`) is a row with one empty cell
fn is_blank(record: &RawRecord) -> bool {
    !record.quoted && record.fields.len() <= 1 && record.fields.iter().all(|f| f.trim().is_empty())
}

/// Trim header names, name blank ones by position and suffix duplicates
/// (`name`, `name_2`, `name_3`, ...)
fn unique_names(header: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(header.len());

    for (i, raw) in header.iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("column_{}", i + 1),
            trimmed => trimmed.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while seen.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        if name != base {
            tracing::debug!(column = %base, renamed = %name, "Duplicate column name");
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}
