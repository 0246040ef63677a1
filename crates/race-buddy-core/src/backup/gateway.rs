//! External folder gateway abstraction

use std::fmt;

use super::{BackupError, FolderReference};

/// Access level currently held on a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Access must be confirmed again before use
    Prompt,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => f.write_str("granted"),
            Self::Denied => f.write_str("denied"),
            Self::Prompt => f.write_str("prompt"),
        }
    }
}

/// Result of asking the user for a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(FolderReference),
    /// The user dismissed the picker
    Cancelled,
    Denied,
}

/// Permission-scoped access to one user-chosen directory
///
/// Implementations own persistence of the folder reference. Permission is
/// always reported as a `PermissionState` and never inferred from I/O errors.
#[allow(async_fn_in_trait)]
pub trait FolderGateway {
    /// Capability probe, free of side effects
    fn is_supported(&self) -> bool;

    /// Ask the user for a read-write folder and persist it on success
    async fn select(&self) -> Result<SelectOutcome, BackupError>;

    /// Load the persisted folder when its permission is still granted
    ///
    /// Never prompts.
    async fn restore(&self) -> Result<Option<FolderReference>, BackupError>;

    /// Check permission without prompting
    async fn query_permission(&self, folder: &FolderReference)
        -> Result<PermissionState, BackupError>;

    /// Explicitly ask the user to grant access again
    async fn request_permission(
        &self,
        folder: &FolderReference,
    ) -> Result<PermissionState, BackupError>;

    /// Forget the persisted reference
    async fn remove(&self, folder: &FolderReference) -> Result<(), BackupError>;

    /// Read one named file, `None` when it does not exist
    async fn read_file(
        &self,
        folder: &FolderReference,
        name: &str,
    ) -> Result<Option<Vec<u8>>, BackupError>;

    /// Create or fully overwrite one named file
    async fn write_file(
        &self,
        folder: &FolderReference,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), BackupError>;
}
