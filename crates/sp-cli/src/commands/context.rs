//! Context command: the history entries around one search.

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use sp_core::{find_by_local_time, surrounding};

use crate::{Config, HistoryArgs};

use super::list::format_entries;
use super::load_classified;

const AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a `--at` value such as `2025-01-28 09:30:00`.
pub fn parse_at(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), AT_FORMAT)
        .with_context(|| format!("invalid time '{value}': expected YYYY-MM-DD HH:MM:SS"))
}

/// Runs the context command.
pub fn run(config: &Config, history: &HistoryArgs, at: &str, radius: usize) -> Result<()> {
    let at = parse_at(at)?;
    let events = load_classified(config, history)?;

    let Some(index) = find_by_local_time(&events, at, &Local) else {
        bail!("no history entry visited at {}", at.format(AT_FORMAT));
    };
    tracing::debug!(index, radius, "found subject entry");

    let nearby = surrounding(&events, index, radius);
    print!("{}", format_entries(nearby, Some(&events[index]), &Local));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_at() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 28)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        assert_eq!(parse_at("2025-01-28 09:30:05").unwrap(), expected);
        assert_eq!(parse_at(" 2025-01-28 09:30:05 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_at_rejects_other_formats() {
        assert!(parse_at("2025-01-28").is_err());
        assert!(parse_at("28/01/2025 09:30:05").is_err());
    }
}
