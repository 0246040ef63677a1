use std::env;
use std::path::{Path, PathBuf};

use race_buddy_core::backup::{
    BackupController, FileMarkerStore, LocalFolderGateway, MarkerStore, SyncEngine,
    SyncEngineConfig, SyncOutcome,
};
use race_buddy_core::services::DatabaseService;
use serde::Serialize;

use crate::config::CliConfig;
use crate::error::CliError;
use crate::picker::CliFolderPicker;

const DB_FILE_NAME: &str = "race-buddy.db";

pub type CliController =
    BackupController<LocalFolderGateway<CliFolderPicker>, DatabaseService, FileMarkerStore>;

/// Database path: command line, then `RACE_BUDDY_DB_PATH`, then config, then the data dir
pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &CliConfig) -> PathBuf {
    if let Some(path) = cli_db_path {
        return path;
    }

    if let Some(path) = env::var_os("RACE_BUDDY_DB_PATH").filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(path) = config.db_path.clone() {
        return path;
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("race-buddy")
        .join(DB_FILE_NAME)
}

/// Last-modified marker kept next to the database file
pub fn marker_path(db_path: &Path) -> PathBuf {
    db_path.with_extension("last-modified")
}

pub async fn open_database(db_path: &Path) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(db_path).await?)
}

/// Local store plus the backup controller for one command invocation
pub struct Session {
    pub db: DatabaseService,
    pub backup: CliController,
    auto_sync: bool,
}

impl Session {
    pub async fn open(
        db_path: &Path,
        config: &CliConfig,
        no_sync: bool,
        picker: CliFolderPicker,
    ) -> Result<Self, CliError> {
        let db = open_database(db_path).await?;
        let gateway = LocalFolderGateway::new(db.clone(), picker);
        let marker = FileMarkerStore::new(marker_path(db_path));
        let engine = SyncEngine::new(
            gateway,
            db.clone(),
            marker,
            SyncEngineConfig::new().with_io_timeout(config.io_timeout()),
        )
        .with_restore_callback(Box::new(|| {
            eprintln!("Local data restored from backup folder");
        }));

        let mut backup = BackupController::new(engine);
        backup.init().await;

        Ok(Self {
            db,
            backup,
            auto_sync: config.auto_sync && !no_sync,
        })
    }

    /// Pull newer backup data before the command reads or edits anything
    pub async fn startup_sync(&mut self) {
        if self.auto_sync {
            let outcome = self.backup.sync().await;
            report_auto_sync(&outcome);
        }
    }

    /// Mark local data as changed and push it when auto-sync is on
    pub async fn record_change(&mut self) -> Result<(), CliError> {
        self.backup.engine().marker().touch()?;
        if self.auto_sync {
            let outcome = self.backup.sync().await;
            report_auto_sync(&outcome);
        }
        Ok(())
    }
}

fn report_auto_sync(outcome: &SyncOutcome) {
    match auto_sync_warning(outcome) {
        Some(warning) => eprintln!("Warning: {warning}"),
        None => tracing::debug!("Auto-sync finished: {outcome:?}"),
    }
}

/// Message worth surfacing after a background reconcile, if any
pub fn auto_sync_warning(outcome: &SyncOutcome) -> Option<String> {
    if outcome.is_success() {
        return None;
    }
    match outcome {
        SyncOutcome::Failed(message) => Some(message.clone()),
        SyncOutcome::PermissionRevoked => {
            Some("Permission to backup folder was revoked".to_string())
        }
        _ => None,
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `1:02:03` above an hour, `42:07` below
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Render fractional seconds, rounded to the nearest second
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_seconds(seconds: f64) -> String {
    if seconds.is_finite() && seconds >= 0.0 {
        format_duration(seconds.round() as u64)
    } else {
        "-".to_string()
    }
}

pub fn format_pace(seconds_per_km: Option<f64>) -> String {
    match seconds_per_km {
        Some(pace) if pace.is_finite() && pace > 0.0 => format!("{} /km", format_seconds(pace)),
        _ => "-".to_string(),
    }
}

pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.1}{unit}"))
}

pub fn normalize_identifier(id: &str) -> Result<&str, CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::InvalidInput("ID cannot be empty".to_string()));
    }
    Ok(id)
}
