use anyhow::{Context, Result};
use clap::Parser;
use csvscope::cli::Args;
use csvscope::data::{ViewRow, compress_entry};
use csvscope::session::{Event, Session, Snapshot};
use csvscope::settings::{self, EngineSettings};
use csvscope::storage::{JsonFileStore, VisualizationStore, default_store_path};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csvscope=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(&args)
}

fn load_settings(args: &Args) -> Result<EngineSettings> {
    let mut settings = match &args.config {
        Some(path) => settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => settings::load_or_default(settings::default_settings_path().as_deref()),
    };
    if let Some(delimiter) = args.delimiter {
        settings.delimiter = delimiter;
    }
    if let Some(rows) = args.rows_per_page {
        settings.rows_per_page = rows;
    }
    Ok(settings)
}

fn store_for(args: &Args) -> Result<JsonFileStore> {
    let path = match &args.store {
        Some(path) => path.clone(),
        None => default_store_path().context("No data directory for saved visualizations")?,
    };
    Ok(JsonFileStore::new(path))
}

/// Build the event list the command line asks for, in pipeline order
fn events(args: &Args) -> Vec<Event> {
    let mut events = Vec::new();
    if let Some(kind) = args.kind {
        events.push(Event::SetChartKind(kind));
    }
    if let Some(x) = &args.x {
        events.push(Event::SetXColumn(x.clone()));
    }
    if let Some(y) = &args.y {
        events.push(Event::SetYColumn(y.clone()));
    }
    for range in &args.ranges {
        events.push(Event::SetRange {
            column: range.column.clone(),
            min: range.min,
            max: range.max,
        });
    }
    for only in &args.only {
        events.push(Event::SelectOnly {
            column: only.column.clone(),
            values: only.values.clone(),
        });
    }
    if let Some(search) = &args.search {
        events.push(Event::SetSearch(search.clone()));
    }
    if let Some(sort) = &args.sort {
        events.push(Event::ToggleSort(sort.clone()));
        if args.desc {
            events.push(Event::ToggleSort(sort.clone()));
        }
    }
    if let Some(group_by) = &args.group_by {
        events.push(Event::SetGroupBy(Some(group_by.clone())));
    }
    if let Some(page) = args.page {
        events.push(Event::SetPage(page));
    }
    events
}

fn run(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    let delimiter = settings.delimiter;
    let mut session = Session::new(settings);

    if args.list_saved {
        let store = store_for(args)?;
        for record in store.list()? {
            println!(
                "{}\t{}\t{}\t{}",
                record.id,
                record.name,
                record.chart_kind.name(),
                record.created_at
            );
        }
    }

    let Some(path) = &args.path else {
        return Ok(());
    };
    session
        .load_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if let Some(name) = &args.load {
        let store = store_for(args)?;
        session
            .load_saved(name, &store)
            .with_context(|| format!("Failed to restore '{}'", name))?;
    }

    for event in events(args) {
        if let Err(e) = session.dispatch(event.clone()) {
            tracing::error!(error = %e, ?event, "Event failed");
            return Err(e.into());
        }
    }

    let snapshot = session.snapshot();
    print_page(&snapshot);

    if args.stats {
        print_stats(&snapshot);
    }

    if args.chart_json {
        let chart = snapshot.chart()?;
        println!("{}", serde_json::to_string_pretty(&chart)?);
    }

    if let Some(path) = &args.export_table {
        write_export(path, &snapshot.export_table(delimiter))?;
    }
    if let Some(path) = &args.export_chart_data {
        write_export(path, &snapshot.export_chart_data(delimiter)?)?;
    }

    if let Some(name) = &args.save {
        let store = store_for(args)?;
        let record = session.save(name, &store)?;
        println!("Saved '{}' ({})", record.name, record.id);
    }

    Ok(())
}

fn print_page(snapshot: &Snapshot) {
    let output = snapshot.view_output();
    let columns = snapshot.view.column_order();
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| snapshot.dataset.column_index(c))
        .collect();

    println!("{}", snapshot.record_summary());
    println!("{}", columns.join("\t"));
    for line in &output.page_rows {
        match line {
            ViewRow::GroupHeader { key, count } => println!("== {} ({}) ==", key, count),
            ViewRow::Data { row } => {
                let row = &snapshot.dataset.rows[*row];
                let cells: Vec<String> = indices.iter().map(|i| row.cell(*i).to_string()).collect();
                println!("{}", cells.join("\t"));
            }
        }
    }
    println!("Page {} of {}", output.page, output.total_pages);
}

fn print_stats(snapshot: &Snapshot) {
    for column in &snapshot.profile.columns {
        println!("{}", column.column);
        for line in column.describe(snapshot.profile.total_rows) {
            println!("  {}", line);
        }
    }
}

fn write_export(path: &Path, text: &str) -> Result<()> {
    let is_gzip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    let written = if is_gzip {
        let entry: PathBuf = path.with_extension("");
        let name = entry
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("export.csv");
        std::fs::write(path, compress_entry(name, text)?)
    } else {
        std::fs::write(path, text)
    };
    written.with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "Exported");
    Ok(())
}
