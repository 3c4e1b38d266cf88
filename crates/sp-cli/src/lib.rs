//! Searchpaths CLI library.
//!
//! This crate provides the CLI interface for search path analysis.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ExportFormat, HistoryArgs, WindowArgs};
pub use config::{Config, dirs_config_path};
