//! Filesystem implementation of the folder gateway

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{BackupError, FolderGateway, FolderReference, PermissionState, SelectOutcome};
use crate::services::DatabaseService;

/// Interactive source of folder choices
pub trait FolderPicker {
    /// Ask for a folder, `None` when the user cancels
    fn pick_folder(&self) -> Option<PathBuf>;

    /// Ask the user to confirm access to a previously chosen folder
    fn confirm_access(&self, folder: &FolderReference) -> bool;
}

/// Folder gateway over a local (possibly cloud-synced) directory
///
/// A directory is `Granted` when it exists and is writable, `Denied` when it
/// is read-only and `Prompt` when it is missing, for example on an unmounted
/// drive. The folder reference is persisted in the local store.
pub struct LocalFolderGateway<P> {
    db: DatabaseService,
    picker: P,
}

impl<P: FolderPicker> LocalFolderGateway<P> {
    pub const fn new(db: DatabaseService, picker: P) -> Self {
        Self { db, picker }
    }

    async fn permission_of(path: &Path) -> PermissionState {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if !metadata.is_dir() => PermissionState::Denied,
            Ok(metadata) if metadata.permissions().readonly() => PermissionState::Denied,
            Ok(_) => PermissionState::Granted,
            Err(error) if error.kind() == ErrorKind::NotFound => PermissionState::Prompt,
            Err(error) => {
                tracing::debug!("Cannot inspect {}: {}", path.display(), error);
                PermissionState::Denied
            }
        }
    }

    async fn prepare_selection(path: PathBuf) -> Result<FolderReference, BackupError> {
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(BackupError::InvalidFolder(format!(
                    "{} is not a directory",
                    path.display()
                )));
            }
            Ok(_) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&path).await.map_err(|e| {
                    BackupError::InvalidFolder(format!("cannot create {}: {e}", path.display()))
                })?;
            }
            Err(error) => {
                return Err(BackupError::InvalidFolder(format!(
                    "{}: {error}",
                    path.display()
                )));
            }
        }

        let path = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| BackupError::InvalidFolder(format!("{}: {e}", path.display())))?;
        Ok(FolderReference::from_path(path))
    }

    fn temp_path_for(target: &Path) -> PathBuf {
        let file_name = target
            .file_name()
            .map_or_else(|| "backup".into(), |name| name.to_string_lossy());
        target.with_file_name(format!(".{file_name}.tmp"))
    }
}

impl<P: FolderPicker> FolderGateway for LocalFolderGateway<P> {
    fn is_supported(&self) -> bool {
        true
    }

    async fn select(&self) -> Result<SelectOutcome, BackupError> {
        let Some(path) = self.picker.pick_folder() else {
            return Ok(SelectOutcome::Cancelled);
        };

        let folder = Self::prepare_selection(path).await?;
        if !Self::permission_of(&folder.path).await.is_granted() {
            tracing::info!("Backup folder {} is not writable", folder.path.display());
            return Ok(SelectOutcome::Denied);
        }

        self.db.save_backup_folder(&folder).await?;
        tracing::info!("Selected backup folder {}", folder.path.display());
        Ok(SelectOutcome::Selected(folder))
    }

    async fn restore(&self) -> Result<Option<FolderReference>, BackupError> {
        let Some(folder) = self.db.load_backup_folder().await? else {
            return Ok(None);
        };

        let permission = Self::permission_of(&folder.path).await;
        if permission.is_granted() {
            Ok(Some(folder))
        } else {
            tracing::info!(
                "Stored backup folder {} is not accessible ({permission})",
                folder.path.display()
            );
            Ok(None)
        }
    }

    async fn query_permission(
        &self,
        folder: &FolderReference,
    ) -> Result<PermissionState, BackupError> {
        Ok(Self::permission_of(&folder.path).await)
    }

    async fn request_permission(
        &self,
        folder: &FolderReference,
    ) -> Result<PermissionState, BackupError> {
        if !self.picker.confirm_access(folder) {
            return Ok(PermissionState::Denied);
        }

        if Self::permission_of(&folder.path).await == PermissionState::Prompt {
            if let Err(error) = tokio::fs::create_dir_all(&folder.path).await {
                tracing::warn!(
                    "Cannot recreate backup folder {}: {}",
                    folder.path.display(),
                    error
                );
            }
        }

        Ok(Self::permission_of(&folder.path).await)
    }

    async fn remove(&self, folder: &FolderReference) -> Result<(), BackupError> {
        self.db.clear_backup_folder().await?;
        tracing::info!("Removed backup folder {}", folder.path.display());
        Ok(())
    }

    async fn read_file(
        &self,
        folder: &FolderReference,
        name: &str,
    ) -> Result<Option<Vec<u8>>, BackupError> {
        let path = folder.path.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(BackupError::Read(format!("{}: {error}", path.display()))),
        }
    }

    async fn write_file(
        &self,
        folder: &FolderReference,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), BackupError> {
        let target = folder.path.join(name);
        let temp = Self::temp_path_for(&target);

        if let Err(error) = tokio::fs::write(&temp, bytes).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(BackupError::Write(format!("{}: {error}", temp.display())));
        }

        if let Err(error) = tokio::fs::rename(&temp, &target).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(BackupError::Write(format!("{}: {error}", target.display())));
        }

        Ok(())
    }
}
