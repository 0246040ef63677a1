//! Sync engine: timestamp reconciliation between local data and the snapshot

use std::cmp::Ordering as TimeOrdering;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::snapshot::{decode, encode, BackupSnapshot, BACKUP_FILE_NAME};
use super::{
    next_timestamp, BackupError, BackupStore, DecodeError, FolderGateway, FolderReference,
    MarkerStore,
};
use crate::state::SyncState;

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Called once after local data was replaced by a pulled snapshot
pub type RestoreCallback = Box<dyn Fn() + Send + Sync>;

/// Sync engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEngineConfig {
    /// Upper bound for each folder operation, `None` to wait forever
    pub io_timeout: Option<Duration>,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngineConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            io_timeout: Some(DEFAULT_IO_TIMEOUT),
        }
    }

    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }
}

/// Observable engine status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Timestamp of the snapshot both sides last agreed on
    pub last_backup: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Terminal result of one engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another operation was already in flight
    Skipped,
    /// Local marker and snapshot agree
    UpToDate,
    /// Local data was replaced from the snapshot
    Pulled,
    /// The snapshot was replaced with local data
    Pushed,
    /// Folder access was lost and could not be regained
    PermissionRevoked,
    Failed(String),
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Pulled | Self::Pushed)
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Sync,
    Backup,
    Restore,
}

impl Operation {
    const fn label(self) -> &'static str {
        match self {
            Self::Sync => "Sync",
            Self::Backup => "Backup",
            Self::Restore => "Restore",
        }
    }
}

/// Releases the in-flight flag when dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Reconciles the local store with the snapshot in a backup folder
///
/// At most one operation runs at a time; a call made while another is in
/// flight returns `SyncOutcome::Skipped` without waiting. Every failure ends
/// as `SyncState::Error` with a message, never as a returned error.
pub struct SyncEngine<G, S, M> {
    gateway: G,
    store: S,
    marker: M,
    config: SyncEngineConfig,
    in_flight: AtomicBool,
    status: watch::Sender<SyncStatus>,
    on_data_restored: Option<RestoreCallback>,
}

impl<G, S, M> SyncEngine<G, S, M>
where
    G: FolderGateway,
    S: BackupStore,
    M: MarkerStore,
{
    pub fn new(gateway: G, store: S, marker: M, config: SyncEngineConfig) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            gateway,
            store,
            marker,
            config,
            in_flight: AtomicBool::new(false),
            status,
            on_data_restored: None,
        }
    }

    /// Register the notification fired after a pull
    #[must_use]
    pub fn with_restore_callback(mut self, callback: RestoreCallback) -> Self {
        self.on_data_restored = Some(callback);
        self
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn marker(&self) -> &M {
        &self.marker
    }

    /// Snapshot of the current status
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receive every status transition
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Bidirectional reconciliation driven by timestamps
    pub async fn reconcile(&self, folder: &FolderReference) -> SyncOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Reconciliation already in flight, skipping");
            return SyncOutcome::Skipped;
        };

        if let Some(outcome) = self.verify_permission(folder, Operation::Sync).await {
            return outcome;
        }
        self.begin();

        match self.reconcile_locked(folder).await {
            Ok(outcome) => outcome,
            Err(error) => self.fail(Operation::Sync, &error),
        }
    }

    /// Overwrite the snapshot with local data regardless of timestamps
    pub async fn manual_backup(&self, folder: &FolderReference) -> SyncOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Backup requested while another operation is in flight");
            return SyncOutcome::Skipped;
        };

        if let Some(outcome) = self.verify_permission(folder, Operation::Backup).await {
            return outcome;
        }
        self.begin();

        // The fresh timestamp must still supersede whatever is out there
        let remote = match self.read_snapshot(folder).await {
            Ok(snapshot) => snapshot.map(|s| s.last_modified),
            Err(error) => {
                tracing::debug!("Ignoring unreadable snapshot before backup: {error}");
                None
            }
        };

        match self.push(folder, remote).await {
            Ok(outcome) => outcome,
            Err(error) => self.fail(Operation::Backup, &error),
        }
    }

    /// Replace local data with the snapshot regardless of timestamps
    pub async fn manual_restore(&self, folder: &FolderReference) -> SyncOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Restore requested while another operation is in flight");
            return SyncOutcome::Skipped;
        };

        if let Some(outcome) = self.verify_permission(folder, Operation::Restore).await {
            return outcome;
        }
        self.begin();

        let result = async {
            let bytes = self
                .timed(self.gateway.read_file(folder, BACKUP_FILE_NAME))
                .await?
                .ok_or(BackupError::NoBackupFound)?;
            let snapshot = decode(&bytes).map_err(|error| match error {
                DecodeError::UnsupportedVersion(version) => {
                    BackupError::UnsupportedVersion(version)
                }
                DecodeError::Malformed(error) => BackupError::Read(error.to_string()),
            })?;
            self.pull(snapshot).await
        }
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(error) => self.fail(Operation::Restore, &error),
        }
    }

    /// Read the snapshot timestamp for display without changing state
    pub async fn refresh_last_backup(&self, folder: &FolderReference) -> Option<DateTime<Utc>> {
        let last_backup = match self.read_snapshot(folder).await {
            Ok(snapshot) => snapshot.map(|s| s.last_modified),
            Err(error) => {
                tracing::debug!("Cannot read snapshot for status: {error}");
                None
            }
        };
        self.status.send_modify(|status| status.last_backup = last_backup);
        last_backup
    }

    /// Forget the displayed backup date and any error
    pub fn clear_status(&self) {
        self.status.send_replace(SyncStatus::default());
    }

    async fn reconcile_locked(&self, folder: &FolderReference) -> Result<SyncOutcome, BackupError> {
        let Some(remote) = self.read_snapshot(folder).await? else {
            tracing::info!("No usable snapshot in backup folder, creating one");
            return self.push(folder, None).await;
        };

        let local = self.marker.load();
        let local_millis = local.map_or(0, |at| at.timestamp_millis());
        let remote_millis = remote.last_modified.timestamp_millis();

        match remote_millis.cmp(&local_millis) {
            TimeOrdering::Equal => {
                tracing::debug!("Backup already up to date");
                self.synced(remote.last_modified);
                Ok(SyncOutcome::UpToDate)
            }
            TimeOrdering::Greater => {
                tracing::info!("Snapshot is newer than local data, pulling");
                self.pull(remote).await
            }
            TimeOrdering::Less => {
                tracing::info!("Local data is newer than snapshot, pushing");
                self.push(folder, Some(remote.last_modified)).await
            }
        }
    }

    /// Check permission, re-requesting once
    ///
    /// Returns the terminal outcome when the operation cannot proceed.
    async fn verify_permission(
        &self,
        folder: &FolderReference,
        operation: Operation,
    ) -> Option<SyncOutcome> {
        let result = async {
            let state = self.timed(self.gateway.query_permission(folder)).await?;
            if state.is_granted() {
                return Ok(true);
            }

            tracing::info!("Backup folder permission is {state}, requesting again");
            let state = self.timed(self.gateway.request_permission(folder)).await?;
            Ok::<bool, BackupError>(state.is_granted())
        }
        .await;

        match result {
            Ok(true) => None,
            Ok(false) => {
                self.fail(operation, &BackupError::PermissionRevoked);
                Some(SyncOutcome::PermissionRevoked)
            }
            Err(error) => Some(self.fail(operation, &error)),
        }
    }

    /// Read and decode the snapshot, treating a malformed document as absent
    async fn read_snapshot(
        &self,
        folder: &FolderReference,
    ) -> Result<Option<BackupSnapshot>, BackupError> {
        let Some(bytes) = self
            .timed(self.gateway.read_file(folder, BACKUP_FILE_NAME))
            .await?
        else {
            return Ok(None);
        };

        match decode(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(DecodeError::Malformed(error)) => {
                tracing::warn!("Backup snapshot is malformed and will be replaced: {error}");
                Ok(None)
            }
            Err(DecodeError::UnsupportedVersion(version)) => {
                Err(BackupError::UnsupportedVersion(version))
            }
        }
    }

    async fn push(
        &self,
        folder: &FolderReference,
        remote: Option<DateTime<Utc>>,
    ) -> Result<SyncOutcome, BackupError> {
        let data = self
            .store
            .export_all()
            .await
            .map_err(|error| BackupError::Export(error.to_string()))?;

        let at = next_timestamp(remote.max(self.marker.load()));
        let records = data.record_count();
        let bytes = encode(data, at)
            .to_json()
            .map_err(|error| BackupError::Export(error.to_string()))?;

        self.timed(self.gateway.write_file(folder, BACKUP_FILE_NAME, &bytes))
            .await?;
        self.marker.store(at)?;
        self.synced(at);

        tracing::info!("Wrote backup with {records} records");
        Ok(SyncOutcome::Pushed)
    }

    async fn pull(&self, snapshot: BackupSnapshot) -> Result<SyncOutcome, BackupError> {
        self.store
            .import_all(&snapshot.data)
            .await
            .map_err(|error| BackupError::Import(error.to_string()))?;
        self.marker.store(snapshot.last_modified)?;
        self.synced(snapshot.last_modified);

        tracing::info!(
            "Restored {} records from backup",
            snapshot.data.record_count()
        );
        if let Some(callback) = &self.on_data_restored {
            callback();
        }
        Ok(SyncOutcome::Pulled)
    }

    async fn timed<T>(
        &self,
        operation: impl Future<Output = Result<T, BackupError>>,
    ) -> Result<T, BackupError> {
        match self.config.io_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| BackupError::TimedOut(limit))?,
            None => operation.await,
        }
    }

    fn begin(&self) {
        self.status.send_modify(|status| {
            status.state = SyncState::Syncing;
            status.last_error = None;
        });
    }

    fn synced(&self, at: DateTime<Utc>) {
        self.status.send_modify(|status| {
            status.state = SyncState::Synced;
            status.last_backup = Some(at);
            status.last_error = None;
        });
    }

    fn fail(&self, operation: Operation, error: &BackupError) -> SyncOutcome {
        let message = match error {
            BackupError::PermissionRevoked | BackupError::NoBackupFound => error.to_string(),
            _ => format!("{} failed: {error}", operation.label()),
        };
        tracing::warn!("{message}");

        self.status.send_modify(|status| {
            status.state = SyncState::Error;
            status.last_error = Some(message.clone());
        });
        SyncOutcome::Failed(message)
    }
}
