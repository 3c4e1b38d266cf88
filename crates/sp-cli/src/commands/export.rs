//! Export command: searches with their query and host, as CSV or text.

use std::fmt::Write as _;
use std::fs;
use std::io::{BufWriter, Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use sp_core::AnnotatedEvent;
use sp_core::time::format_local;
use url::Url;

use crate::{Config, ExportFormat, HistoryArgs, WindowArgs};

use super::{load_classified, select_window};

/// One exported search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub root_domain: String,
    pub query: String,
    pub url: String,
}

impl ExportRow {
    /// Builds a row for an event that carries a query.
    pub fn from_event(event: &AnnotatedEvent, date: String) -> Option<Self> {
        let query = event.search_query.as_deref().filter(|q| !q.is_empty())?;
        Some(Self {
            date,
            root_domain: root_domain(&event.event.url),
            query: query.to_string(),
            url: event.event.url.clone(),
        })
    }
}

/// Host and port of `url`, with any `www.` left in place.
fn root_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// Quotes a CSV field when it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn format_csv(rows: &[ExportRow]) -> String {
    let mut output = String::from("Date,Root Domain,Search Query,URL\r\n");
    for row in rows {
        write!(
            output,
            "{},{},{},{}\r\n",
            csv_field(&row.date),
            csv_field(&row.root_domain),
            csv_field(&row.query),
            csv_field(&row.url)
        )
        .unwrap();
    }
    output
}

pub fn format_txt(rows: &[ExportRow]) -> String {
    let mut output = String::new();
    for row in rows {
        writeln!(
            output,
            "{}, {}, {}, {}",
            row.date, row.root_domain, row.query, row.url
        )
        .unwrap();
    }
    output
}

/// Runs the export command.
pub fn run(
    config: &Config,
    history: &HistoryArgs,
    window_args: &WindowArgs,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let events = load_classified(config, history)?;
    let window = select_window(&events, window_args, config, &Local::now())?;

    let rows: Vec<ExportRow> = window
        .events
        .iter()
        .filter_map(|e| ExportRow::from_event(e, format_local(e.event.visited_at, &Local)))
        .collect();

    let content = match format {
        ExportFormat::Csv => format_csv(&rows),
        ExportFormat::Txt => format_txt(&rows),
    };

    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} searches to {}", rows.len(), path.display());
        }
        None => {
            let stdout = stdout();
            let mut writer = BufWriter::new(stdout.lock());
            // Ignore broken pipes when piped to `head`
            let _ = writer.write_all(content.as_bytes());
            let _ = writer.flush();
        }
    }

    tracing::info!(rows = rows.len(), ?format, "exported searches");
    Ok(())
}
