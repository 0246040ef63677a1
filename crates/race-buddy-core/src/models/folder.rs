//! Persisted reference to the user's backup folder

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Handle to the folder that holds the backup snapshot
///
/// Stored locally so permission can be re-checked on the next launch. It is
/// never part of an exported snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderReference {
    pub path: PathBuf,
    pub name: String,
}

impl FolderReference {
    /// Build a reference from a path, using its last component as the display name
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
        Self { path, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_uses_last_component() {
        let reference = FolderReference::from_path("/home/runner/Dropbox/race-buddy");
        assert_eq!(reference.name, "race-buddy");
    }

    #[test]
    fn from_path_falls_back_to_full_path() {
        let reference = FolderReference::from_path("/");
        assert_eq!(reference.name, "/");
    }
}
