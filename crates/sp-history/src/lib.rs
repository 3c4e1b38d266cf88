//! Browser history readers.
//!
//! Each reader turns an on-disk history into [`RawVisit`]s; [`load_history`]
//! picks a reader from the path and returns decoded [`Event`]s in canonical
//! order (oldest first), with rows whose timestamps cannot be decoded
//! removed.
//!
//! # Sources
//!
//! - Chromium-family profile directories (Chrome, Brave, Edge) or a bare
//!   `History` file. The database is copied before it is opened because a
//!   running browser holds a lock on it.
//! - JSON dumps: an array of `{url, title, visit_count, last_visit_time}`.
//! - History Trends Unlimited `.tsv` exports.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat};
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use sp_core::{Event, RawVisit, resolve_events};
use thiserror::Error;

/// File name of the history database inside a Chromium profile.
pub const CHROMIUM_HISTORY_FILE: &str = "History";

/// Columns in a History Trends Unlimited export row.
const TSV_COLUMNS: usize = 8;

/// History loading errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON history {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("history not found: {}", .0.display())]
    MissingHistoryFile(PathBuf),

    #[error("line {line}: expected 8 tab-separated columns, found {columns}")]
    MalformedTsvRow { line: usize, columns: usize },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> HistoryError + '_ {
    move |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Which reader a path is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    Chromium,
    Json,
    Tsv,
}

impl HistoryFormat {
    /// Picks a format from the path: `.json` and `.tsv` by extension, anything
    /// else is treated as a Chromium profile directory or `History` file.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Tsv,
            _ => Self::Chromium,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Json => "json",
            Self::Tsv => "tsv",
        }
    }
}

/// Loads and decodes a history, oldest first.
pub fn load_history(path: &Path) -> Result<Vec<Event>, HistoryError> {
    let format = HistoryFormat::detect(path);
    let raw = match format {
        HistoryFormat::Chromium => read_chromium(path)?,
        HistoryFormat::Json => read_json(path)?,
        HistoryFormat::Tsv => read_tsv(path)?,
    };

    let rows = raw.len();
    let events = resolve_events(raw);
    if events.len() < rows {
        tracing::warn!(
            dropped = rows - events.len(),
            path = %path.display(),
            "skipped history rows with undecodable timestamps"
        );
    }
    tracing::info!(?format, events = events.len(), path = %path.display(), "loaded history");
    Ok(events)
}

/// Reads the `urls` table of a Chromium history database.
///
/// `path` may be a profile directory or the database file itself.
pub fn read_chromium(path: &Path) -> Result<Vec<RawVisit>, HistoryError> {
    let db_path = if path.is_dir() {
        path.join(CHROMIUM_HISTORY_FILE)
    } else {
        path.to_path_buf()
    };
    if !db_path.is_file() {
        return Err(HistoryError::MissingHistoryFile(db_path));
    }

    let scratch = tempfile::tempdir().map_err(io_error(&db_path))?;
    let copied = scratch.path().join(CHROMIUM_HISTORY_FILE);
    fs::copy(&db_path, &copied).map_err(io_error(&db_path))?;

    let conn = Connection::open_with_flags(&copied, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(
        "SELECT url, title, visit_count, last_visit_time
         FROM urls
         ORDER BY last_visit_time ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let title: Option<String> = row.get(1)?;
        let visit_count: i64 = row.get(2)?;
        let last_visit_time: i64 = row.get(3)?;
        Ok(RawVisit {
            url: row.get(0)?,
            title: title.unwrap_or_default(),
            visit_count: u32::try_from(visit_count.max(0)).unwrap_or(u32::MAX),
            last_visit_time: last_visit_time.to_string(),
        })
    })?;

    let visits = rows.collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(rows = visits.len(), path = %db_path.display(), "read chromium history");
    Ok(visits)
}

/// A visit time in a JSON dump: Chromium microseconds or a formatted string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonVisitTime {
    Micros(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonVisit {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default = "one")]
    visit_count: u32,
    last_visit_time: JsonVisitTime,
}

const fn one() -> u32 {
    1
}

/// Reads a JSON array of history records.
pub fn read_json(path: &Path) -> Result<Vec<RawVisit>, HistoryError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let records: Vec<JsonVisit> =
        serde_json::from_str(&content).map_err(|source| HistoryError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(records
        .into_iter()
        .map(|record| RawVisit {
            url: record.url,
            title: record.title.unwrap_or_default(),
            visit_count: record.visit_count,
            last_visit_time: match record.last_visit_time {
                JsonVisitTime::Micros(micros) => micros.to_string(),
                JsonVisitTime::Text(text) => text,
            },
        })
        .collect())
}

/// Converts an HTU `visit_time` (Unix milliseconds, possibly fractional) to RFC 3339.
fn htu_visit_time(raw: &str) -> Option<String> {
    let millis: f64 = raw.trim().trim_start_matches('U').parse().ok()?;
    if !millis.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let micros = (millis * 1000.0).round() as i64;
    DateTime::from_timestamp_micros(micros)
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Reads a History Trends Unlimited export.
///
/// Columns: `url`, `host`, `domain`, `visit_time`, `visit_time_string`,
/// `day_of_week`, `transition`, `title`. Every row is a single visit.
pub fn read_tsv(path: &Path) -> Result<Vec<RawVisit>, HistoryError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let mut visits = Vec::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != TSV_COLUMNS {
            return Err(HistoryError::MalformedTsvRow {
                line: i + 1,
                columns: columns.len(),
            });
        }
        let last_visit_time = htu_visit_time(columns[3]).unwrap_or_else(|| columns[4].to_string());
        visits.push(RawVisit {
            url: columns[0].to_string(),
            title: columns[7].to_string(),
            visit_count: 1,
            last_visit_time,
        });
    }
    Ok(visits)
}
