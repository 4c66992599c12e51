use crate::types::ChartKind;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for csvscope
#[derive(Parser, Debug)]
#[command(version, about = "Explore delimited data and build chart descriptions")]
pub struct Args {
    /// CSV/TSV file, or a .gz archive holding one
    #[arg(required_unless_present = "list_saved")]
    pub path: Option<PathBuf>,

    /// Column for the chart's x axis
    #[arg(long = "x")]
    pub x: Option<String>,

    /// Column for the chart's y axis
    #[arg(long = "y")]
    pub y: Option<String>,

    /// Chart kind: bar, line, scatter, pie, radar, doughnut
    #[arg(long = "kind", value_parser = parse_kind)]
    pub kind: Option<ChartKind>,

    /// Numeric range filter, e.g. `score=80:100` (repeatable)
    #[arg(long = "range", value_parser = parse_range)]
    pub ranges: Vec<RangeArg>,

    /// Category filter, e.g. `team=red,blue` (repeatable; `team=` keeps nothing)
    #[arg(long = "only", value_parser = parse_only)]
    pub only: Vec<OnlyArg>,

    /// Case-insensitive text search over visible columns
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Sort the table by this column
    #[arg(long = "sort")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long = "desc", action, requires = "sort")]
    pub desc: bool,

    /// Group table rows by this column
    #[arg(long = "group-by")]
    pub group_by: Option<String>,

    /// Page to print (1-based)
    #[arg(long = "page")]
    pub page: Option<usize>,

    /// Rows per table page
    #[arg(long = "rows-per-page")]
    pub rows_per_page: Option<usize>,

    /// Field delimiter for input and export
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Print column statistics
    #[arg(long = "stats", action)]
    pub stats: bool,

    /// Print the chart description as JSON
    #[arg(long = "chart-json", action)]
    pub chart_json: bool,

    /// Write filtered rows to this file (gzip when it ends in .gz)
    #[arg(long = "export-table")]
    pub export_table: Option<PathBuf>,

    /// Write the chart's x/y data to this file (gzip when it ends in .gz)
    #[arg(long = "export-chart-data")]
    pub export_chart_data: Option<PathBuf>,

    /// Save the chart and filters under this name
    #[arg(long = "save")]
    pub save: Option<String>,

    /// Restore a saved visualization by name or id
    #[arg(long = "load")]
    pub load: Option<String>,

    /// Saved-visualization file (defaults to the user data directory)
    #[arg(long = "store")]
    pub store: Option<PathBuf>,

    /// List saved visualizations
    #[arg(long = "list-saved", action)]
    pub list_saved: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangeArg {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnlyArg {
    pub column: String,
    pub values: Vec<String>,
}

fn split_assignment(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((column, rest)) if !column.trim().is_empty() => Ok((column.trim(), rest)),
        _ => Err(format!("expected COLUMN=VALUE, got '{}'", s)),
    }
}

pub fn parse_kind(s: &str) -> Result<ChartKind, String> {
    ChartKind::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = ChartKind::all().iter().map(|k| k.name()).collect();
        format!("unknown chart kind '{}' (expected one of {})", s, names.join(", "))
    })
}

pub fn parse_range(s: &str) -> Result<RangeArg, String> {
    let (column, bounds) = split_assignment(s)?;
    let (min, max) = bounds
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX, got '{}'", bounds))?;
    let parse = |v: &str| match v.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        Ok(_) => Err(format!("bound '{}' must be a finite number", v)),
        Err(e) => Err(format!("invalid bound '{}': {}", v, e)),
    };
    Ok(RangeArg {
        column: column.to_string(),
        min: parse(min)?,
        max: parse(max)?,
    })
}

pub fn parse_only(s: &str) -> Result<OnlyArg, String> {
    let (column, values) = split_assignment(s)?;
    Ok(OnlyArg {
        column: column.to_string(),
        values: values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
