//! Backup controller: folder lifecycle and presentation state

use chrono::{DateTime, Utc};

use super::{
    BackupError, BackupStore, FolderGateway, FolderReference, MarkerStore, SelectOutcome,
    SyncEngine, SyncOutcome,
};
use crate::state::SyncState;

/// Presentation-ready backup state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupState {
    pub is_supported: bool,
    pub has_folder_access: bool,
    pub folder_name: Option<String>,
    pub last_backup_date: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub sync_status: SyncState,
}

/// Wires user actions to the folder gateway and the sync engine
pub struct BackupController<G, S, M> {
    engine: SyncEngine<G, S, M>,
    folder: Option<FolderReference>,
    has_folder_access: bool,
    error: Option<String>,
}

impl<G, S, M> BackupController<G, S, M>
where
    G: FolderGateway,
    S: BackupStore,
    M: MarkerStore,
{
    pub const fn new(engine: SyncEngine<G, S, M>) -> Self {
        Self {
            engine,
            folder: None,
            has_folder_access: false,
            error: None,
        }
    }

    pub const fn engine(&self) -> &SyncEngine<G, S, M> {
        &self.engine
    }

    pub const fn folder(&self) -> Option<&FolderReference> {
        self.folder.as_ref()
    }

    pub fn state(&self) -> BackupState {
        let status = self.engine.status();
        BackupState {
            is_supported: self.engine.gateway().is_supported(),
            has_folder_access: self.has_folder_access,
            folder_name: self.folder.as_ref().map(|folder| folder.name.clone()),
            last_backup_date: status.last_backup,
            error: self.error.clone().or(status.last_error),
            sync_status: status.state,
        }
    }

    /// Restore the persisted folder without prompting
    pub async fn init(&mut self) {
        if !self.engine.gateway().is_supported() {
            return;
        }

        match self.engine.gateway().restore().await {
            Ok(Some(folder)) => {
                self.engine.refresh_last_backup(&folder).await;
                self.folder = Some(folder);
                self.has_folder_access = true;
            }
            Ok(None) => {}
            Err(error) => tracing::warn!("Failed to restore backup folder: {error}"),
        }
    }

    /// Ask for a folder and reconcile with it
    ///
    /// Returns `Ok(None)` when the user cancelled.
    pub async fn select_folder(&mut self) -> Result<Option<SyncOutcome>, BackupError> {
        self.error = None;
        if !self.engine.gateway().is_supported() {
            return Err(self.record(BackupError::UnsupportedPlatform, None));
        }

        let folder = match self.engine.gateway().select().await {
            Ok(SelectOutcome::Selected(folder)) => folder,
            Ok(SelectOutcome::Cancelled) => return Ok(None),
            Ok(SelectOutcome::Denied) => {
                return Err(self.record(BackupError::PermissionDenied, None));
            }
            Err(error) => return Err(self.record(error, Some("Failed to select folder"))),
        };

        self.folder = Some(folder.clone());
        self.has_folder_access = true;
        let outcome = self.engine.reconcile(&folder).await;
        self.after(&outcome);
        Ok(Some(outcome))
    }

    /// Forget the folder; the snapshot file itself is left in place
    pub async fn remove_folder(&mut self) -> Result<(), BackupError> {
        self.error = None;
        if let Some(folder) = self.folder.take() {
            if let Err(error) = self.engine.gateway().remove(&folder).await {
                self.folder = Some(folder);
                return Err(self.record(error, Some("Failed to remove folder")));
            }
        }

        self.has_folder_access = false;
        self.engine.clear_status();
        Ok(())
    }

    pub async fn manual_backup(&mut self) -> Result<SyncOutcome, BackupError> {
        let folder = self.require_folder()?;
        let outcome = self.engine.manual_backup(&folder).await;
        self.after(&outcome);
        Ok(outcome)
    }

    pub async fn manual_restore(&mut self) -> Result<SyncOutcome, BackupError> {
        let folder = self.require_folder()?;
        let outcome = self.engine.manual_restore(&folder).await;
        self.after(&outcome);
        Ok(outcome)
    }

    /// Reconcile with the current folder, a no-op without one
    pub async fn sync(&mut self) -> SyncOutcome {
        let Some(folder) = self.folder.clone() else {
            return SyncOutcome::Skipped;
        };
        let outcome = self.engine.reconcile(&folder).await;
        self.after(&outcome);
        outcome
    }

    fn require_folder(&mut self) -> Result<FolderReference, BackupError> {
        self.error = None;
        self.folder
            .clone()
            .ok_or_else(|| self.record(BackupError::NoFolderSelected, None))
    }

    fn after(&mut self, outcome: &SyncOutcome) {
        if matches!(outcome, SyncOutcome::PermissionRevoked) {
            self.has_folder_access = false;
        }
    }

    fn record(&mut self, error: BackupError, context: Option<&str>) -> BackupError {
        self.error = Some(context.map_or_else(
            || error.to_string(),
            |context| format!("{context}: {error}"),
        ));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::snapshot::{encode, BackupData, BACKUP_FILE_NAME};
    use crate::backup::testing::{folder, MemoryGateway, MemoryMarker};
    use crate::backup::{PermissionState, SyncEngineConfig};
    use crate::services::DatabaseService;
    use crate::util::parse_iso_timestamp;
    use pretty_assertions::assert_eq;

    type TestController = BackupController<MemoryGateway, DatabaseService, MemoryMarker>;

    async fn controller_with(gateway: MemoryGateway) -> TestController {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(
            gateway,
            db,
            MemoryMarker::default(),
            SyncEngineConfig::default(),
        );
        BackupController::new(engine)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_restores_folder_and_last_backup_date() {
        let at = parse_iso_timestamp("2024-09-01T06:00:00.000Z").unwrap();
        let gateway = MemoryGateway::default();
        *gateway.stored.lock().unwrap() = Some(folder());
        gateway.put(
            BACKUP_FILE_NAME,
            encode(BackupData::default(), at).to_json().unwrap(),
        );
        let mut controller = controller_with(gateway).await;

        controller.init().await;

        let state = controller.state();
        assert!(state.has_folder_access);
        assert_eq!(state.folder_name.as_deref(), Some("race-buddy"));
        assert_eq!(state.last_backup_date, Some(at));
        assert_eq!(state.sync_status, SyncState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_skips_folder_without_permission() {
        let gateway = MemoryGateway::default();
        *gateway.stored.lock().unwrap() = Some(folder());
        gateway.set_permission(PermissionState::Prompt);
        let mut controller = controller_with(gateway).await;

        controller.init().await;

        assert!(!controller.state().has_folder_access);
        assert!(controller.folder().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unsupported_platform_reports_error() {
        let gateway = MemoryGateway {
            supported: false,
            ..MemoryGateway::default()
        };
        let mut controller = controller_with(gateway).await;
        controller.init().await;

        let result = controller.select_folder().await;

        assert_eq!(result, Err(BackupError::UnsupportedPlatform));
        let state = controller.state();
        assert!(!state.is_supported);
        assert_eq!(
            state.error.as_deref(),
            Some("Folder backup is not supported on this platform")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn select_then_reconcile_pushes() {
        let mut controller = controller_with(MemoryGateway::default()).await;

        let outcome = controller.select_folder().await.unwrap();

        assert_eq!(outcome, Some(SyncOutcome::Pushed));
        let state = controller.state();
        assert!(state.has_folder_access);
        assert_eq!(state.sync_status, SyncState::Synced);
        assert!(state.last_backup_date.is_some());
        assert!(controller.engine().gateway().get(BACKUP_FILE_NAME).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_selection_keeps_prior_state() {
        let gateway = MemoryGateway::default();
        *gateway.selection.lock().unwrap() = SelectOutcome::Cancelled;
        let mut controller = controller_with(gateway).await;

        assert_eq!(controller.select_folder().await, Ok(None));
        assert_eq!(controller.state().error, None);
        assert!(!controller.state().has_folder_access);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn denied_selection_is_an_error() {
        let gateway = MemoryGateway::default();
        *gateway.selection.lock().unwrap() = SelectOutcome::Denied;
        let mut controller = controller_with(gateway).await;

        assert_eq!(
            controller.select_folder().await,
            Err(BackupError::PermissionDenied)
        );
        assert!(controller.state().error.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn manual_operations_require_folder() {
        let mut controller = controller_with(MemoryGateway::default()).await;

        assert_eq!(
            controller.manual_backup().await,
            Err(BackupError::NoFolderSelected)
        );
        assert_eq!(
            controller.manual_restore().await,
            Err(BackupError::NoFolderSelected)
        );
        assert_eq!(
            controller.state().error.as_deref(),
            Some("No backup folder selected")
        );
        assert_eq!(controller.sync().await, SyncOutcome::Skipped);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn revoked_permission_clears_folder_access() {
        let mut controller = controller_with(MemoryGateway::default()).await;
        controller.select_folder().await.unwrap();

        let gateway = controller.engine().gateway();
        gateway.set_permission(PermissionState::Denied);
        *gateway.granted_on_request.lock().unwrap() = PermissionState::Denied;

        assert_eq!(controller.sync().await, SyncOutcome::PermissionRevoked);
        let state = controller.state();
        assert!(!state.has_folder_access);
        assert_eq!(state.sync_status, SyncState::Error);
        assert_eq!(
            state.error.as_deref(),
            Some("Permission to backup folder was revoked")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remove_folder_clears_state() {
        let mut controller = controller_with(MemoryGateway::default()).await;
        controller.select_folder().await.unwrap();

        controller.remove_folder().await.unwrap();

        let state = controller.state();
        assert!(!state.has_folder_access);
        assert_eq!(state.folder_name, None);
        assert_eq!(state.last_backup_date, None);
        assert!(controller.engine().gateway().stored.lock().unwrap().is_none());
        assert!(controller.engine().gateway().get(BACKUP_FILE_NAME).is_some());
    }
}
