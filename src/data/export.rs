//! Delimited-text export of the table and of the chart data.
//!
//! Both exports cover the filtered rows in view order, never just the
//! current page.

use crate::data::error::{DataError, DataResult};
use crate::types::{ChartSelection, Dataset};

/// Export the given rows with columns in display order
///
/// Column names the dataset does not have are skipped.
pub fn export_table(
    dataset: &Dataset,
    rows: &[usize],
    column_order: &[String],
    delimiter: char,
) -> String {
    let columns: Vec<(usize, &str)> = column_order
        .iter()
        .filter_map(|name| dataset.column_index(name).map(|i| (i, name.as_str())))
        .collect();
    let sep = delimiter.to_string();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|(_, name)| quote_csv_field(name, delimiter))
            .collect::<Vec<_>>()
            .join(&sep),
    );
    for row in dataset.rows_at(rows) {
        let line = columns
            .iter()
            .map(|(i, _)| quote_csv_field(&row.cell(*i).to_string(), delimiter))
            .collect::<Vec<_>>()
            .join(&sep);
        // A single empty field would otherwise read back as a blank line
        if line.is_empty() && columns.len() == 1 {
            lines.push("\"\"".to_string());
        } else {
            lines.push(line);
        }
    }

    tracing::debug!(rows = rows.len(), columns = columns.len(), "Exported table");
    lines.join("\n")
}

/// Export the selected x and y columns of the given rows
pub fn export_chart_data(
    dataset: &Dataset,
    rows: &[usize],
    selection: Option<&ChartSelection>,
    delimiter: char,
) -> DataResult<String> {
    let selection = selection.ok_or(DataError::NoSelection)?;
    for column in [&selection.x_column, &selection.y_column] {
        if !dataset.has_column(column) {
            return Err(DataError::UnknownColumn(column.clone()));
        }
    }
    let order = [selection.x_column.clone(), selection.y_column.clone()];
    Ok(export_table(dataset, rows, &order, delimiter))
}

/// Quote a field if necessary (contains delimiter, quotes, or newlines)
pub fn quote_csv_field(value: &str, delimiter: char) -> String {
    let needs_quoting = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        // Escape internal quotes by doubling them
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
