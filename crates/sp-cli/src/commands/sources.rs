//! Sources command: configured history locations and whether they exist.

use std::fmt::Write;
use std::path::Path;

use sp_history::HistoryFormat;

use crate::Config;

fn source_line(output: &mut String, name: &str, path: &Path) {
    let status = if path.exists() { "ok" } else { "missing" };
    writeln!(
        output,
        "  {name:<12} {:<8} {:<8} {}",
        HistoryFormat::detect(path).as_str(),
        status,
        path.display()
    )
    .unwrap();
}

pub fn format_sources(config: &Config) -> String {
    let mut output = String::new();

    if config.history_path.is_none() && config.sources.is_empty() {
        writeln!(output, "No history sources configured.").unwrap();
        writeln!(
            output,
            "Set history_path or add a [sources] table in the config file."
        )
        .unwrap();
        return output;
    }

    writeln!(output, "History sources:").unwrap();
    if let Some(path) = &config.history_path {
        source_line(&mut output, "(default)", path);
    }
    for (name, path) in &config.sources {
        source_line(&mut output, name, path);
    }
    output
}

/// Runs the sources command.
pub fn run(config: &Config) {
    print!("{}", format_sources(config));
}
