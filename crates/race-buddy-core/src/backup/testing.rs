//! In-memory doubles for backup tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use super::{
    BackupError, FolderGateway, FolderReference, MarkerStore, PermissionState, SelectOutcome,
};

/// Gateway over a map of file names to contents
pub struct MemoryGateway {
    pub supported: bool,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub permission: Mutex<PermissionState>,
    /// State adopted when permission is requested again
    pub granted_on_request: Mutex<PermissionState>,
    pub selection: Mutex<SelectOutcome>,
    pub stored: Mutex<Option<FolderReference>>,
    /// When set, the next read waits for a notification
    pub read_gate: Mutex<Option<Arc<Notify>>>,
    pub hang_reads: bool,
    pub fail_writes: bool,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub permission_requests: AtomicUsize,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self {
            supported: true,
            files: Mutex::new(HashMap::new()),
            permission: Mutex::new(PermissionState::Granted),
            granted_on_request: Mutex::new(PermissionState::Granted),
            selection: Mutex::new(SelectOutcome::Selected(folder())),
            stored: Mutex::new(None),
            read_gate: Mutex::new(None),
            hang_reads: false,
            fail_writes: false,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            permission_requests: AtomicUsize::new(0),
        }
    }
}

impl MemoryGateway {
    pub fn put(&self, name: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(name.to_string(), bytes);
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn set_permission(&self, state: PermissionState) {
        *self.permission.lock().unwrap() = state;
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

/// Folder reference used throughout the backup tests
pub fn folder() -> FolderReference {
    FolderReference::from_path(PathBuf::from("/backups/race-buddy"))
}

impl FolderGateway for MemoryGateway {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn select(&self) -> Result<SelectOutcome, BackupError> {
        let outcome = self.selection.lock().unwrap().clone();
        if let SelectOutcome::Selected(folder) = &outcome {
            *self.stored.lock().unwrap() = Some(folder.clone());
        }
        Ok(outcome)
    }

    async fn restore(&self) -> Result<Option<FolderReference>, BackupError> {
        let granted = self.permission.lock().unwrap().is_granted();
        Ok(self.stored.lock().unwrap().clone().filter(|_| granted))
    }

    async fn query_permission(
        &self,
        _folder: &FolderReference,
    ) -> Result<PermissionState, BackupError> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn request_permission(
        &self,
        _folder: &FolderReference,
    ) -> Result<PermissionState, BackupError> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let next = *self.granted_on_request.lock().unwrap();
        *self.permission.lock().unwrap() = next;
        Ok(next)
    }

    async fn remove(&self, _folder: &FolderReference) -> Result<(), BackupError> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }

    async fn read_file(
        &self,
        _folder: &FolderReference,
        name: &str,
    ) -> Result<Option<Vec<u8>>, BackupError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.read_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.hang_reads {
            std::future::pending::<()>().await;
        }
        Ok(self.get(name))
    }

    async fn write_file(
        &self,
        _folder: &FolderReference,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), BackupError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(BackupError::Write("disk full".to_string()));
        }
        self.put(name, bytes.to_vec());
        Ok(())
    }
}

/// Marker held in memory
#[derive(Default)]
pub struct MemoryMarker {
    value: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryMarker {
    pub fn at(value: DateTime<Utc>) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }
}

impl MarkerStore for MemoryMarker {
    fn load(&self) -> Option<DateTime<Utc>> {
        *self.value.lock().unwrap()
    }

    fn store(&self, at: DateTime<Utc>) -> Result<(), BackupError> {
        *self.value.lock().unwrap() = Some(at);
        Ok(())
    }
}
