use race_buddy_core::backup::{BackupError, BackupState, SyncOutcome};
use race_buddy_core::util::format_iso_millis;

use crate::commands::common::Session;
use crate::error::CliError;

pub fn run_backup_status(session: &Session) {
    let state = session.backup.state();
    let path = session.backup.folder().map(|folder| folder.path.as_path());
    for line in format_backup_status(&state, path) {
        println!("{line}");
    }
}

pub async fn run_backup_select(session: &mut Session) -> Result<(), CliError> {
    match session.backup.select_folder().await? {
        None => {
            println!("Folder selection cancelled");
            Ok(())
        }
        Some(outcome) => {
            let folder_name = session
                .backup
                .state()
                .folder_name
                .unwrap_or_default();
            println!("Backup folder set to {folder_name}");
            finish(outcome)
        }
    }
}

pub async fn run_backup_remove(session: &mut Session) -> Result<(), CliError> {
    let had_folder = session.backup.folder().is_some();
    session.backup.remove_folder().await?;
    if had_folder {
        println!("Backup folder removed; the backup file was left in place");
    } else {
        println!("No backup folder selected");
    }
    Ok(())
}

pub async fn run_backup_sync(session: &mut Session) -> Result<(), CliError> {
    if session.backup.folder().is_none() {
        return Err(BackupError::NoFolderSelected.into());
    }
    let outcome = session.backup.sync().await;
    finish(outcome)
}

pub async fn run_backup_push(session: &mut Session) -> Result<(), CliError> {
    let outcome = session.backup.manual_backup().await?;
    finish(outcome)
}

pub async fn run_backup_restore(session: &mut Session) -> Result<(), CliError> {
    let outcome = session.backup.manual_restore().await?;
    finish(outcome)
}

/// Print a successful outcome or turn a failed one into an error
pub fn finish(outcome: SyncOutcome) -> Result<(), CliError> {
    match outcome {
        SyncOutcome::Skipped => println!("Another backup operation is in progress"),
        SyncOutcome::UpToDate => println!("Backup is up to date"),
        SyncOutcome::Pulled => println!("Local data updated from backup"),
        SyncOutcome::Pushed => println!("Backup updated with local data"),
        SyncOutcome::PermissionRevoked => return Err(BackupError::PermissionRevoked.into()),
        SyncOutcome::Failed(message) => return Err(CliError::Sync(message)),
    }
    Ok(())
}

pub fn format_backup_status(state: &BackupState, path: Option<&std::path::Path>) -> Vec<String> {
    if !state.is_supported {
        return vec!["Folder backup is not supported on this platform".to_string()];
    }

    let folder = match (&state.folder_name, path) {
        (Some(name), Some(path)) => format!("{name} ({})", path.display()),
        (Some(name), None) => name.clone(),
        _ => "none".to_string(),
    };
    let mut lines = vec![
        format!("Folder:      {folder}"),
        format!(
            "Access:      {}",
            if state.has_folder_access {
                "granted"
            } else {
                "not granted"
            }
        ),
        format!(
            "Last backup: {}",
            state
                .last_backup_date
                .map_or_else(|| "never".to_string(), format_iso_millis)
        ),
        format!("Status:      {}", state.sync_status),
    ];
    if let Some(error) = &state.error {
        lines.push(format!("Error:       {error}"));
    }
    lines
}
