//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Search path analysis for browser history.
///
/// Finds the searches in a browser history, works out which search system
/// each one used, and reports how searching is split across systems.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub history: HistoryArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which history to read.
#[derive(Debug, Clone, Default, Args)]
pub struct HistoryArgs {
    /// Browser profile directory, `History` database, `.json` dump or `.tsv` export.
    #[arg(long, global = true, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Named history source from the config file.
    #[arg(long, global = true, value_name = "NAME", conflicts_with = "history")]
    pub source: Option<String>,
}

/// Which calendar window to look at. Defaults to the current week.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct WindowArgs {
    /// Weeks back from the current week (0 = this week).
    #[arg(long, value_name = "N", conflicts_with_all = ["month", "full"])]
    pub week: Option<u32>,

    /// Months back from the current month (0 = this month).
    #[arg(long, value_name = "N", conflicts_with = "full")]
    pub month: Option<u32>,

    /// Use the whole history.
    #[arg(long)]
    pub full: bool,

    /// Start weeks on Sunday instead of Monday.
    #[arg(long)]
    pub sunday: bool,
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Txt,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank search systems by share of searches.
    Report {
        #[command(flatten)]
        window: WindowArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Number of systems to show before grouping the rest as "other".
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Hide systems below this share of searches.
        #[arg(long, value_name = "PERCENT")]
        min_percent: Option<f64>,

        /// Count chat-based search complements.
        #[arg(long)]
        with_complements: bool,
    },

    /// List the searches in a window.
    List {
        #[command(flatten)]
        window: WindowArgs,

        /// Include searches that are not counted or hidden by default.
        #[arg(long)]
        all: bool,

        /// Show chat-based search complements.
        #[arg(long)]
        with_complements: bool,
    },

    /// Write the searches in a window to a file.
    Export {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout when omitted).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the browsing around a search.
    Context {
        /// Local visit time of the search, as "YYYY-MM-DD HH:MM:SS".
        #[arg(long, value_name = "TIME")]
        at: String,

        /// Number of history entries to show on each side.
        #[arg(long, default_value_t = 3)]
        radius: usize,
    },

    /// List distinct search queries with counts.
    Queries {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// List configured history sources.
    Sources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn report_defaults_to_current_week() {
        let cli = Cli::parse_from(["sp", "report"]);
        let Some(Commands::Report { window, json, top, .. }) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(window.week, None);
        assert!(!window.full);
        assert!(!json);
        assert_eq!(top, None);
    }

    #[test]
    fn history_flags_are_global() {
        let cli = Cli::parse_from(["sp", "list", "--history", "/tmp/h.json", "--week", "2"]);
        assert_eq!(cli.history.history, Some(PathBuf::from("/tmp/h.json")));
        let Some(Commands::List { window, .. }) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(window.week, Some(2));
    }

    #[test]
    fn week_and_month_conflict() {
        assert!(Cli::try_parse_from(["sp", "report", "--week", "1", "--month", "1"]).is_err());
        assert!(Cli::try_parse_from(["sp", "report", "--month", "1", "--full"]).is_err());
    }

    #[test]
    fn export_format_parses() {
        let cli = Cli::parse_from(["sp", "export", "--format", "txt", "-o", "out.txt"]);
        let Some(Commands::Export { format, output, .. }) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(format, ExportFormat::Txt);
        assert_eq!(output, Some(PathBuf::from("out.txt")));
    }
}
