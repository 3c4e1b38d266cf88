//! Configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sp_core::{DEFAULT_ROLLING_WINDOW, RuleSet};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// History read when neither `--history` nor `--source` is given.
    pub history_path: Option<PathBuf>,

    /// Named history locations, selectable with `--source`.
    pub sources: BTreeMap<String, PathBuf>,

    pub start_on_monday: bool,

    /// Leave chat-based search complements out of rankings and listings.
    pub hide_complements: bool,

    /// Systems shown in a report before the rest are grouped as "other".
    pub top: usize,

    /// Capacity of the classifier's rolling window.
    pub rolling_window: usize,

    pub rules: RuleSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_path: None,
            sources: BTreeMap::new(),
            start_on_monday: true,
            hide_complements: true,
            top: 10,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            rules: RuleSet::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SP_*)
        figment = figment.merge(Env::prefixed("SP_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for sp.
///
/// On Linux: `~/.config/searchpaths`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("searchpaths"))
}
