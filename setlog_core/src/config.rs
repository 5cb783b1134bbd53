//! Configuration file support for setlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/setlog/config.toml`.
//! Every field has a default, so a partial (or missing) file is fine.

use crate::history::default_dedup_window;
use crate::{Error, Result, DEFAULT_SET_COUNT};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session layout configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sets laid out for exercises whose prescription has no set count
    #[serde(default = "default_set_count")]
    pub default_set_count: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_set_count: default_set_count(),
        }
    }
}

/// Largest accepted dedup window, one day
pub const MAX_DEDUP_WINDOW_SECONDS: i64 = 86_400;

/// History reconciliation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Records closer than this are treated as the same workout
    #[serde(default = "default_dedup_window_seconds")]
    pub dedup_window_seconds: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dedup_window_seconds: default_dedup_window_seconds(),
        }
    }
}

impl HistoryConfig {
    /// Dedup window, clamped to `0..=MAX_DEDUP_WINDOW_SECONDS`
    pub fn dedup_window(&self) -> Duration {
        let seconds = self.dedup_window_seconds.clamp(0, MAX_DEDUP_WINDOW_SECONDS);
        Duration::try_seconds(seconds).unwrap_or_else(default_dedup_window)
    }
}

/// Output format of the tracing subscriber
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("setlog")
}

fn default_set_count() -> u32 {
    DEFAULT_SET_COUNT
}

fn default_dedup_window_seconds() -> i64 {
    60
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("setlog")
            .join("config.toml")
    }

    /// Reject values the session engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.session.default_set_count == 0 {
            return Err(Error::Config(
                "session.default_set_count must be at least 1".into(),
            ));
        }
        if !(0..=MAX_DEDUP_WINDOW_SECONDS).contains(&self.history.dedup_window_seconds) {
            return Err(Error::Config(format!(
                "history.dedup_window_seconds must be between 0 and {}",
                MAX_DEDUP_WINDOW_SECONDS
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
