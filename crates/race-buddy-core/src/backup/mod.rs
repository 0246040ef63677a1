//! Folder backup and sync
//!
//! Local data is reconciled against a single JSON snapshot stored in a
//! user-chosen folder. The snapshot's `lastModified` timestamp and the local
//! marker are the only inputs to conflict resolution: the newer side wins
//! wholesale, records are upserted by id and nothing is merged or deleted.

mod controller;
mod engine;
mod error;
mod fs_gateway;
mod gateway;
mod marker;
mod snapshot;
mod store;

#[cfg(test)]
mod testing;

pub use controller::{BackupController, BackupState};
pub use engine::{RestoreCallback, SyncEngine, SyncEngineConfig, SyncOutcome, SyncStatus};
pub use error::{BackupError, DecodeError};
pub use fs_gateway::{FolderPicker, LocalFolderGateway};
pub use gateway::{FolderGateway, PermissionState, SelectOutcome};
pub use marker::{next_timestamp, FileMarkerStore, MarkerStore};
pub use snapshot::{decode, encode, BackupData, BackupSnapshot, BACKUP_FILE_NAME, SNAPSHOT_VERSION};
pub use store::BackupStore;

pub use crate::models::FolderReference;
