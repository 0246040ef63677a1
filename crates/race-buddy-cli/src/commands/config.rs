use std::path::{Path, PathBuf};

use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub auto_sync: Option<bool>,
    pub io_timeout_secs: Option<u64>,
    pub db_path: Option<PathBuf>,
}

pub fn run_config_show(config: &CliConfig) {
    for line in format_config_lines(config, &default_config_path()) {
        println!("{line}");
    }
}

pub fn run_config_set(config: CliConfig, update: ConfigUpdate) -> Result<(), CliError> {
    let path = default_config_path();
    apply_config_update(config, update, &path)?;
    println!("Saved config to {}", path.display());
    Ok(())
}

pub fn apply_config_update(
    mut config: CliConfig,
    update: ConfigUpdate,
    path: &Path,
) -> Result<CliConfig, CliError> {
    if update.auto_sync.is_none() && update.io_timeout_secs.is_none() && update.db_path.is_none()
    {
        return Err(CliError::InvalidInput(
            "Provide at least one setting to change".to_string(),
        ));
    }

    if let Some(auto_sync) = update.auto_sync {
        config.auto_sync = auto_sync;
    }
    if let Some(timeout) = update.io_timeout_secs {
        config.io_timeout_secs = timeout;
    }
    if let Some(db_path) = update.db_path {
        config.db_path = Some(db_path).filter(|path| !path.as_os_str().is_empty());
    }

    config.save_to_path(path).map_err(CliError::Config)?;
    Ok(config)
}

pub fn format_config_lines(config: &CliConfig, path: &Path) -> Vec<String> {
    vec![
        format!("Config file: {}", path.display()),
        format!("auto_sync: {}", config.auto_sync),
        format!(
            "io_timeout_secs: {}",
            if config.io_timeout_secs == 0 {
                "none".to_string()
            } else {
                config.io_timeout_secs.to_string()
            }
        ),
        format!(
            "db_path: {}",
            config
                .db_path
                .as_ref()
                .map_or_else(|| "(default)".to_string(), |path| path.display().to_string())
        ),
    ]
}
