//! CLI subcommand implementations.

pub mod context;
pub mod export;
pub mod list;
pub mod queries;
pub mod report;
pub mod sources;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use sp_core::{
    AnnotatedEvent, ClassifierConfig, Window, classify_with, full_history, window_by_month,
    window_by_week,
};

use crate::{Config, HistoryArgs, WindowArgs};

/// Picks the history to read: `--history`, then `--source`, then `history_path`.
pub fn resolve_history_path(config: &Config, args: &HistoryArgs) -> Result<PathBuf> {
    if let Some(path) = &args.history {
        return Ok(path.clone());
    }
    if let Some(name) = &args.source {
        return config
            .sources
            .get(name)
            .cloned()
            .with_context(|| format!("unknown history source '{name}' (see `sp sources`)"));
    }
    config
        .history_path
        .clone()
        .context("no history configured: pass --history or set history_path in the config file")
}

/// Loads a history and classifies every event in it.
pub fn load_classified(config: &Config, args: &HistoryArgs) -> Result<Vec<AnnotatedEvent>> {
    let path = resolve_history_path(config, args)?;
    let events = sp_history::load_history(&path)
        .with_context(|| format!("failed to load history from {}", path.display()))?;

    let classifier = ClassifierConfig {
        rolling_window: config.rolling_window,
    };
    Ok(classify_with(&events, &config.rules, &classifier))
}

/// Builds the calendar window the flags ask for.
pub fn select_window<'a, Tz: TimeZone>(
    events: &'a [AnnotatedEvent],
    args: &WindowArgs,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<Window<'a>> {
    let window = if args.full {
        full_history(events, now)
    } else if let Some(month) = args.month {
        window_by_month(events, month, now)?
    } else {
        let start_on_monday = config.start_on_monday && !args.sunday;
        window_by_week(events, args.week.unwrap_or(0), start_on_monday, now)?
    };
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sp_core::PeriodKind;

    #[test]
    fn test_history_flag_wins() {
        let config = Config {
            history_path: Some(PathBuf::from("/default")),
            sources: [("work".to_string(), PathBuf::from("/work"))].into(),
            ..Config::default()
        };

        let args = HistoryArgs {
            history: Some(PathBuf::from("/explicit")),
            source: None,
        };
        assert_eq!(
            resolve_history_path(&config, &args).unwrap(),
            PathBuf::from("/explicit")
        );

        let args = HistoryArgs {
            history: None,
            source: Some("work".to_string()),
        };
        assert_eq!(
            resolve_history_path(&config, &args).unwrap(),
            PathBuf::from("/work")
        );

        let args = HistoryArgs::default();
        assert_eq!(
            resolve_history_path(&config, &args).unwrap(),
            PathBuf::from("/default")
        );
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let args = HistoryArgs {
            history: None,
            source: Some("missing".to_string()),
        };
        let err = resolve_history_path(&Config::default(), &args).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown history source 'missing'"));
        assert!(resolve_history_path(&Config::default(), &HistoryArgs::default()).is_err());
    }

    #[test]
    fn test_select_window_kinds() {
        let now = Utc::now();
        let config = Config::default();

        let week = select_window(&[], &WindowArgs::default(), &config, &now).unwrap();
        assert_eq!(week.kind, PeriodKind::Week);

        let args = WindowArgs {
            month: Some(0),
            ..WindowArgs::default()
        };
        let month = select_window(&[], &args, &config, &now).unwrap();
        assert_eq!(month.kind, PeriodKind::Month);

        let args = WindowArgs {
            full: true,
            ..WindowArgs::default()
        };
        let full = select_window(&[], &args, &config, &now).unwrap();
        assert_eq!(full.kind, PeriodKind::Full);
    }
}
