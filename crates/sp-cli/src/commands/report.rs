//! Report command for ranking search systems.
//!
//! This module implements `sp report` over a week, a month or the full
//! history, with human-readable and JSON output.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use sp_core::{PeriodKind, RankedSummary, Window};

use crate::{Config, HistoryArgs, WindowArgs};

use super::{load_classified, select_window};

/// Systems whose names are longer than this are truncated in the table.
const ENGINE_COLUMN_WIDTH: usize = 17;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub kind: PeriodKind,
    pub index: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub total_windows: usize,
    pub summary: RankedSummary,
}

impl ReportData {
    pub fn from_window(
        window: &Window<'_>,
        hide_complements: bool,
        generated_at: DateTime<Utc>,
        timezone: String,
    ) -> Self {
        Self {
            generated_at,
            timezone,
            kind: window.kind,
            index: window.index,
            first_day: window.first_day,
            last_day: window.last_day,
            total_windows: window.total_windows,
            summary: window.rank(hide_complements),
        }
    }
}

/// Display options for the table.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Rows shown before the rest are grouped as "other".
    pub top: usize,
    /// Rows below this share are hidden.
    pub min_percent: Option<f64>,
}

// ========== Formatting ==========

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: usize, max: usize) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1 // Minimum 1 for visibility
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Formats the period description for the report header.
fn format_period_description(data: &ReportData) -> String {
    let title = match (data.kind, data.index) {
        (PeriodKind::Week, 0) => "Week: Current".to_string(),
        (PeriodKind::Week, 1) => "Week: 1 week ago".to_string(),
        (PeriodKind::Week, n) => format!("Week: {n} weeks ago"),
        (PeriodKind::Month, _) => data.first_day.format("%B %Y").to_string(),
        (PeriodKind::Full, _) => "Full history".to_string(),
    };
    // "Monday 2025-01-27 to 2025-02-02"
    format!(
        "{title}\n{} to {}",
        data.first_day.format("%A %Y-%m-%d"),
        data.last_day.format("%Y-%m-%d")
    )
}

fn truncate_engine(engine: &str) -> String {
    if engine.chars().count() <= ENGINE_COLUMN_WIDTH {
        engine.to_string()
    } else {
        let head: String = engine.chars().take(ENGINE_COLUMN_WIDTH - 3).collect();
        format!("{head}...")
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData, options: &ReportOptions) -> String {
    let mut output = String::new();
    let summary = &data.summary;
    let divider = "  |-----------------------------------------|";

    writeln!(output, "SEARCH REPORT: {}", format_period_description(data)).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "{divider}").unwrap();
    writeln!(output, "  | #  | System            | %      | Count |").unwrap();
    writeln!(output, "  |----|-------------------|--------|-------|").unwrap();

    let max_count = summary.engines.first().map_or(0, |e| e.count);
    for (i, engine) in summary.top(options.top).iter().enumerate() {
        let percentage = summary.percentage(engine.count);
        if options.min_percent.is_some_and(|min| percentage < min) {
            continue;
        }
        writeln!(
            output,
            "  | {:<2} | {:<17} | {percentage:5.2}% | {:5} | {}",
            i + 1,
            truncate_engine(&engine.engine),
            engine.count,
            progress_bar(engine.count, max_count)
        )
        .unwrap();
    }

    let other = summary.other_count(options.top);
    if other > 0 {
        writeln!(
            output,
            "  | -  | other             | {:5.2}% | {other:5} |",
            summary.percentage(other)
        )
        .unwrap();
    } else if summary.total_searches == 0 {
        let scope = match data.kind {
            PeriodKind::Week => " for this week.",
            PeriodKind::Month => " for this month.",
            PeriodKind::Full => ".",
        };
        writeln!(output, "  |      No searches found{scope:<18}|").unwrap();
    }
    writeln!(output, "{divider}").unwrap();

    writeln!(output).unwrap();
    writeln!(output, "Total searches:         {}", summary.total_searches).unwrap();
    writeln!(output, "Total systems searched: {}", summary.system_count()).unwrap();
    writeln!(
        output,
        "Total {}s logged:       {}",
        data.kind.unit(),
        data.total_windows
    )
    .unwrap();

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub totals: JsonTotals,
    pub engines: Vec<JsonEngine>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub period_type: PeriodKind,
    pub index: u32,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub searches: usize,
    pub systems: usize,
    pub windows_logged: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonEngine {
    pub engine: String,
    pub count: usize,
    pub percent: f64,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let summary = &data.summary;
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: data.timezone.clone(),
        period: JsonPeriod {
            start: data.first_day.format("%Y-%m-%d").to_string(),
            end: data.last_day.format("%Y-%m-%d").to_string(),
            period_type: data.kind,
            index: data.index,
        },
        totals: JsonTotals {
            searches: summary.total_searches,
            systems: summary.system_count(),
            windows_logged: data.total_windows,
        },
        engines: summary
            .engines
            .iter()
            .map(|e| JsonEngine {
                engine: e.engine.clone(),
                count: e.count,
                percent: summary.percentage(e.count),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(
    config: &Config,
    history: &HistoryArgs,
    window_args: &WindowArgs,
    options: &ReportOptions,
    hide_complements: bool,
    json: bool,
) -> Result<()> {
    let events = load_classified(config, history)?;
    let window = select_window(&events, window_args, config, &Local::now())?;

    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let data = ReportData::from_window(&window, hide_complements, Utc::now(), timezone);

    if json {
        let output = format_report_json(&data)?;
        println!("{output}");
    } else {
        let output = format_report(&data, options);
        print!("{output}");
    }

    Ok(())
}
