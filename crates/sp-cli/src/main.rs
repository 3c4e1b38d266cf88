use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{context, export, list, queries, report, sources};
use sp_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    config
        .rules
        .validate()
        .context("invalid search rules in configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let history = &cli.history;
    match &cli.command {
        Some(Commands::Report {
            window,
            json,
            top,
            min_percent,
            with_complements,
        }) => {
            let options = report::ReportOptions {
                top: top.unwrap_or(config.top),
                min_percent: *min_percent,
            };
            let hide = config.hide_complements && !with_complements;
            report::run(&config, history, window, &options, hide, *json)?;
        }
        Some(Commands::List {
            window,
            all,
            with_complements,
        }) => {
            let hide = config.hide_complements && !with_complements;
            list::run(&config, history, window, *all, hide)?;
        }
        Some(Commands::Export {
            window,
            format,
            output,
        }) => {
            export::run(&config, history, window, *format, output.as_deref())?;
        }
        Some(Commands::Context { at, radius }) => {
            context::run(&config, history, at, *radius)?;
        }
        Some(Commands::Queries { window }) => {
            queries::run(&config, history, window)?;
        }
        Some(Commands::Sources) => {
            sources::run(&config);
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
