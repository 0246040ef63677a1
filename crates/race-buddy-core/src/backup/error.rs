//! Error types for folder backup

use std::time::Duration;

use thiserror::Error;

/// Failures raised by the folder gateway, the codec and the sync engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackupError {
    /// The platform cannot provide a backup folder
    #[error("Folder backup is not supported on this platform")]
    UnsupportedPlatform,

    /// The user refused access to the chosen folder
    #[error("Permission to backup folder was denied")]
    PermissionDenied,

    /// A previously granted folder is no longer accessible
    #[error("Permission to backup folder was revoked")]
    PermissionRevoked,

    #[error("No backup folder selected")]
    NoFolderSelected,

    #[error("No backup file found")]
    NoBackupFound,

    /// The chosen path cannot hold a backup
    #[error("Invalid backup folder: {0}")]
    InvalidFolder(String),

    #[error("Failed to read backup file: {0}")]
    Read(String),

    #[error("Failed to write backup file: {0}")]
    Write(String),

    #[error("Failed to import backup data: {0}")]
    Import(String),

    #[error("Failed to export local data: {0}")]
    Export(String),

    /// The snapshot was written by a newer schema
    #[error("Backup file uses unsupported version {0}")]
    UnsupportedVersion(u32),

    #[error("Backup folder did not respond within {0:?}")]
    TimedOut(Duration),

    /// Local store or marker failure outside the snapshot itself
    #[error("Local store error: {0}")]
    Store(String),
}

impl From<crate::Error> for BackupError {
    fn from(error: crate::Error) -> Self {
        Self::Store(error.to_string())
    }
}

/// Reasons a snapshot document cannot be decoded
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed backup snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported backup snapshot version {0}")]
    UnsupportedVersion(u32),
}
