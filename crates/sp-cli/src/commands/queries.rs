//! Queries command: distinct queries in a window with their counts.

use std::fmt::Write;

use anyhow::Result;
use chrono::Local;
use sp_core::{QueryCount, query_counts};

use crate::{Config, HistoryArgs, WindowArgs};

use super::{load_classified, select_window};

pub fn format_queries(counts: &[QueryCount]) -> String {
    let mut output = String::new();
    for count in counts {
        writeln!(output, "{:>5}  {}", count.count, count.query).unwrap();
    }
    output
}

/// Runs the queries command.
pub fn run(config: &Config, history: &HistoryArgs, window_args: &WindowArgs) -> Result<()> {
    let events = load_classified(config, history)?;
    let window = select_window(&events, window_args, config, &Local::now())?;

    let counts = query_counts(window.events.iter().copied());
    if counts.is_empty() {
        println!("No searches in this {}.", window.kind);
    } else {
        print!("{}", format_queries(&counts));
    }
    Ok(())
}
