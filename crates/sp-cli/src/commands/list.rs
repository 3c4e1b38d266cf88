//! List command: the searches in a window, one block per event.

use std::fmt::{Display, Write};

use anyhow::Result;
use chrono::{Local, TimeZone};
use sp_core::time::format_local;
use sp_core::{AnnotatedEvent, SearchLabel};

use crate::{Config, HistoryArgs, WindowArgs};

use super::{load_classified, select_window};

const DIVIDER: &str =
    "--------------------------------------------------------------------------------";

/// Formats history entries, optionally marking one as the subject.
pub fn format_entries<'a, Tz, I>(entries: I, subject: Option<&AnnotatedEvent>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
    I: IntoIterator<Item = &'a AnnotatedEvent>,
{
    let mut output = String::new();
    writeln!(output, "{:<6}{:<21}URL", "Index", "Last Visit Time").unwrap();
    writeln!(output, "{DIVIDER}").unwrap();

    for (i, entry) in entries.into_iter().enumerate() {
        let is_subject = subject.is_some_and(|s| std::ptr::eq(s, entry));
        if is_subject {
            writeln!(output, "         **Subject Search Entry**").unwrap();
        }
        writeln!(
            output,
            "{:<6}{}",
            i + 1,
            format_local(entry.event.visited_at, tz)
        )
        .unwrap();
        if let Some(engine) = &entry.search_engine {
            writeln!(output, "      {:<8}{engine}", "System:").unwrap();
            if entry.search_label != SearchLabel::None {
                writeln!(output, "      {:<8}[{}]", "Label:", entry.search_label).unwrap();
            }
            if let Some(query) = entry.search_query.as_deref().filter(|q| !q.is_empty()) {
                writeln!(output, "      {:<8}[{query}]", "Query:").unwrap();
            }
        }
        writeln!(output, "      URL: {}", entry.event.url.trim()).unwrap();
        writeln!(output, "{DIVIDER}").unwrap();
    }

    output
}

/// Runs the list command.
pub fn run(
    config: &Config,
    history: &HistoryArgs,
    window_args: &WindowArgs,
    all: bool,
    hide_complements: bool,
) -> Result<()> {
    let events = load_classified(config, history)?;
    let window = select_window(&events, window_args, config, &Local::now())?;

    let entries = if all {
        window.search_events()
    } else {
        window.visible_events(hide_complements)
    };
    tracing::debug!(entries = entries.len(), all, "listing searches");

    if entries.is_empty() {
        println!("No searches in this {}.", window.kind);
        return Ok(());
    }
    print!("{}", format_entries(entries, None, &Local));
    Ok(())
}
