//! Persistent CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";
const APP_DIR_NAME: &str = "race-buddy";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Reconcile with the backup folder around data commands
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
    /// Folder operation timeout in seconds, 0 disables it
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            auto_sync: default_auto_sync(),
            io_timeout_secs: default_io_timeout_secs(),
            db_path: None,
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

const fn default_auto_sync() -> bool {
    true
}

const fn default_io_timeout_secs() -> u64 {
    30
}

/// Directory holding race-buddy settings
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Config file location, `RACE_BUDDY_CONFIG` overrides the default
pub fn default_config_path() -> PathBuf {
    std::env::var_os("RACE_BUDDY_CONFIG")
        .filter(|value| !value.is_empty())
        .map_or_else(|| app_config_dir().join(CONFIG_FILE_NAME), PathBuf::from)
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let serialized = serde_json::to_string_pretty(self)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub const fn io_timeout(&self) -> Option<Duration> {
        if self.io_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.io_timeout_secs))
        }
    }
}
