//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pomo_core::Category;
use pomo_core::timer::DEFAULT_MINUTES;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Session length used when `focus` is run without `--minutes`.
    pub default_minutes: u32,
    /// Category used when `focus` is run without `--category`.
    pub default_category: Category,
    /// Milliseconds between timer ticks. One second unless testing.
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("pomo.db"),
            default_minutes: DEFAULT_MINUTES,
            default_category: Category::default(),
            tick_interval_ms: 1000,
        }
    }
}

impl Config {
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

        // Load from environment variables (POMO_*)
        figment = figment.merge(Env::prefixed("POMO_"));

        figment.extract()
    }

    /// The tick interval, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Returns the platform-specific config directory for pomo.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pomo"))
}

/// Returns the platform-specific data directory for pomo.
///
/// On Linux: `~/.local/share/pomo`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pomo"))
}
