//! Local last-modified marker
//!
//! The marker records when local data last changed or was last reconciled.
//! It lives outside the structured store so it survives independently of the
//! collections it describes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use super::BackupError;
use crate::util::{format_iso_millis, now_millis, parse_iso_timestamp};

/// Persistence for the local last-modified marker
pub trait MarkerStore {
    /// Current marker, `None` when absent or unreadable
    fn load(&self) -> Option<DateTime<Utc>>;

    /// Replace the marker
    fn store(&self, at: DateTime<Utc>) -> Result<(), BackupError>;

    /// Record a local mutation
    ///
    /// The new marker is never earlier than the current one, so data pulled
    /// from a device with a faster clock is still superseded by the next edit.
    fn touch(&self) -> Result<DateTime<Utc>, BackupError> {
        let at = next_timestamp(self.load());
        self.store(at)?;
        Ok(at)
    }
}

/// Current time, bumped past `after` when the clock has not yet moved beyond it
#[must_use]
pub fn next_timestamp(after: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now_millis();
    match after {
        Some(previous) if now <= previous => previous + TimeDelta::milliseconds(1),
        _ => now,
    }
}

/// Marker kept in a small text file next to the database
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling the marker is written to before being moved into place
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "marker".into(), |name| name.to_string_lossy());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerStore for FileMarkerStore {
    fn load(&self) -> Option<DateTime<Utc>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(
                    "Ignoring unreadable marker {}: {}",
                    self.path.display(),
                    error
                );
                return None;
            }
        };

        let parsed = parse_iso_timestamp(&raw);
        if parsed.is_none() {
            tracing::warn!(
                "Ignoring unparsable marker {}: {}",
                self.path.display(),
                crate::util::compact_text(&raw)
            );
        }
        parsed
    }

    fn store(&self, at: DateTime<Utc>) -> Result<(), BackupError> {
        let temp = self.temp_path();
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&temp, format_iso_millis(at))?;
            std::fs::rename(&temp, &self.path)
        };

        write().map_err(|error| {
            std::fs::remove_file(&temp).ok();
            BackupError::Store(format!(
                "cannot write marker {}: {error}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_marker_is_absent() {
        let tmp = tempdir().unwrap();
        let marker = FileMarkerStore::new(tmp.path().join("race-buddy.last-modified"));
        assert_eq!(marker.load(), None);
    }

    #[test]
    fn store_then_load() {
        let tmp = tempdir().unwrap();
        let marker = FileMarkerStore::new(tmp.path().join("nested").join("marker"));
        let at = parse_iso_timestamp("2024-07-01T08:00:00.125Z").unwrap();

        marker.store(at).unwrap();
        assert_eq!(marker.load(), Some(at));
        assert_eq!(
            std::fs::read_to_string(marker.path()).unwrap(),
            "2024-07-01T08:00:00.125Z"
        );
    }

    #[test]
    fn store_replaces_marker_in_place() {
        let tmp = tempdir().unwrap();
        let marker = FileMarkerStore::new(tmp.path().join("marker"));
        marker
            .store(parse_iso_timestamp("2024-07-01T08:00:00.000Z").unwrap())
            .unwrap();
        let later = parse_iso_timestamp("2024-07-02T08:00:00.000Z").unwrap();

        marker.store(later).unwrap();

        assert_eq!(marker.load(), Some(later));
        let names = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["marker".to_string()]);
    }

    #[test]
    fn failed_store_leaves_no_partial_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("marker");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();
        let marker = FileMarkerStore::new(path.clone());

        let result = marker.store(parse_iso_timestamp("2024-07-01T08:00:00.000Z").unwrap());

        assert!(matches!(result, Err(BackupError::Store(_))));
        assert!(!tmp.path().join(".marker.tmp").exists());
    }

    #[test]
    fn garbage_marker_is_absent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("marker");
        std::fs::write(&path, "not a timestamp").unwrap();

        assert_eq!(FileMarkerStore::new(path).load(), None);
    }

    #[test]
    fn touch_never_moves_backwards() {
        let tmp = tempdir().unwrap();
        let marker = FileMarkerStore::new(tmp.path().join("marker"));
        let future = now_millis() + TimeDelta::hours(2);
        marker.store(future).unwrap();

        let touched = marker.touch().unwrap();
        assert_eq!(touched, future + TimeDelta::milliseconds(1));
        assert_eq!(marker.load(), Some(touched));
    }

    #[test]
    fn next_timestamp_uses_clock_when_ahead() {
        let past = now_millis() - TimeDelta::days(1);
        assert!(next_timestamp(Some(past)) > past + TimeDelta::hours(23));
        assert!(next_timestamp(None) > past);
    }
}
