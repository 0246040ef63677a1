//! Shared database service wrapper used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::backup::{BackupData, BackupStore};
use crate::db::{
    ActivityRepository, Database, DietRepository, FolderRepository, LibSqlActivityRepository,
    LibSqlDietRepository, LibSqlFolderRepository, LibSqlProfileRepository, LibSqlStatsRepository,
    ProfileRepository, StatsRepository,
};
use crate::models::{Activity, ActivityType, DietEntry, FolderReference, StatsEntry, UserProfile};
use crate::Result;

/// Thread-safe service for DB and repository operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// A file that is not a valid database is moved aside and a fresh one is
    /// created in its place.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local database at {} is unreadable: {}. Moving it aside and starting fresh.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem path of the database, `None` for in-memory services.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        let message = error.to_string().to_ascii_lowercase();
        message.contains("file is not a database") || message.contains("malformed")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let base_name = db_path
                .file_name()
                .map_or_else(|| "race-buddy.db".into(), |name| name.to_string_lossy());
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local DB file from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        let Some(parent) = db_path.parent() else {
            return Ok(());
        };
        let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };
        // WAL and shared-memory sidecars belong to the moved file
        let sidecars = [format!("{base_name}-wal"), format!("{base_name}-shm")];

        for sidecar in sidecars {
            let path = parent.join(sidecar);
            if path.exists() {
                std::fs::remove_file(&path)?;
                tracing::warn!("Removed stale sidecar file {}", path.display());
            }
        }

        Ok(())
    }

    // Profile

    /// Load the user profile, if registered.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let db = self.db.lock().await;
        let repo = LibSqlProfileRepository::new(db.connection());
        repo.load().await
    }

    /// Replace the user profile.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlProfileRepository::new(db.connection());
        repo.save(profile).await
    }

    // Activities

    /// List activities newest-first.
    pub async fn list_activities(&self, limit: usize, offset: usize) -> Result<Vec<Activity>> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.list(limit, offset).await
    }

    /// List activities of one type newest-first.
    pub async fn list_activities_by_type(
        &self,
        activity_type: ActivityType,
    ) -> Result<Vec<Activity>> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.list_by_type(activity_type).await
    }

    /// Fetch an activity by id.
    pub async fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.get(id).await
    }

    /// Insert or replace an activity.
    pub async fn save_activity(&self, activity: &Activity) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.save(activity).await
    }

    /// Delete an activity.
    pub async fn delete_activity(&self, id: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.delete(id).await
    }

    /// Number of stored activities.
    pub async fn count_activities(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        repo.count().await
    }

    // Stats

    /// List stats entries newest-first.
    pub async fn list_stats(&self, limit: usize, offset: usize) -> Result<Vec<StatsEntry>> {
        let db = self.db.lock().await;
        let repo = LibSqlStatsRepository::new(db.connection());
        repo.list(limit, offset).await
    }

    /// Record a measurement for a day, replacing any entry already logged
    /// for that date while keeping its id.
    pub async fn add_stats_entry(
        &self,
        date: NaiveDate,
        weight_kg: f64,
        body_fat_percentage: Option<f64>,
    ) -> Result<StatsEntry> {
        let db = self.db.lock().await;
        let repo = LibSqlStatsRepository::new(db.connection());

        let entry = match repo.get_by_date(date).await? {
            Some(existing) => StatsEntry {
                weight_kg,
                body_fat_percentage,
                ..existing
            },
            None => StatsEntry::new(date, weight_kg, body_fat_percentage),
        };
        repo.save(&entry).await?;
        Ok(entry)
    }

    /// Delete a stats entry.
    pub async fn delete_stats_entry(&self, id: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlStatsRepository::new(db.connection());
        repo.delete(id).await
    }

    /// Number of stored stats entries.
    pub async fn count_stats(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let repo = LibSqlStatsRepository::new(db.connection());
        repo.count().await
    }

    // Diet

    /// List diet entries newest-first.
    pub async fn list_diet(&self, limit: usize, offset: usize) -> Result<Vec<DietEntry>> {
        let db = self.db.lock().await;
        let repo = LibSqlDietRepository::new(db.connection());
        repo.list(limit, offset).await
    }

    /// Insert or replace a diet entry.
    pub async fn save_diet_entry(&self, entry: &DietEntry) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlDietRepository::new(db.connection());
        repo.save(entry).await
    }

    /// Delete a diet entry.
    pub async fn delete_diet_entry(&self, id: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlDietRepository::new(db.connection());
        repo.delete(id).await
    }

    /// Number of stored diet entries.
    pub async fn count_diet(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let repo = LibSqlDietRepository::new(db.connection());
        repo.count().await
    }

    // Backup folder

    /// Load the persisted backup folder reference.
    pub async fn load_backup_folder(&self) -> Result<Option<FolderReference>> {
        let db = self.db.lock().await;
        let repo = LibSqlFolderRepository::new(db.connection());
        repo.load().await
    }

    /// Persist the backup folder reference.
    pub async fn save_backup_folder(&self, folder: &FolderReference) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlFolderRepository::new(db.connection());
        repo.save(folder).await
    }

    /// Forget the backup folder reference.
    pub async fn clear_backup_folder(&self) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlFolderRepository::new(db.connection());
        repo.clear().await
    }
}

impl BackupStore for DatabaseService {
    async fn export_all(&self) -> Result<BackupData> {
        let db = self.db.lock().await;
        let conn = db.connection();

        Ok(BackupData {
            user_profile: LibSqlProfileRepository::new(conn).load().await?,
            activities: LibSqlActivityRepository::new(conn).list_all().await?,
            stats_entries: LibSqlStatsRepository::new(conn).list_all().await?,
            diet_entries: LibSqlDietRepository::new(conn).list_all().await?,
        })
    }

    async fn import_all(&self, data: &BackupData) -> Result<()> {
        let db = self.db.lock().await;
        let conn = db.connection();

        if let Some(profile) = &data.user_profile {
            LibSqlProfileRepository::new(conn).save(profile).await?;
        }
        if !data.activities.is_empty() {
            LibSqlActivityRepository::new(conn)
                .save_many(&data.activities)
                .await?;
        }
        if !data.stats_entries.is_empty() {
            LibSqlStatsRepository::new(conn)
                .save_many(&data.stats_entries)
                .await?;
        }
        if !data.diet_entries.is_empty() {
            LibSqlDietRepository::new(conn)
                .save_many(&data.diet_entries)
                .await?;
        }

        tracing::debug!(
            "Imported {} activities, {} stats entries, {} diet entries",
            data.activities.len(),
            data.stats_entries.len(),
            data.diet_entries.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn in_memory_save_and_list_roundtrip() {
        let service = DatabaseService::open_in_memory().await.unwrap();

        let activity = Activity::new(ActivityType::RoadRun, day(2), 10.0, 3000.0);
        service.save_activity(&activity).await.unwrap();

        let activities = service.list_activities(10, 0).await.unwrap();
        assert_eq!(activities, vec![activity]);
        assert!(service.db_path().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_stats_entry_upserts_by_date() {
        let service = DatabaseService::open_in_memory().await.unwrap();

        let first = service.add_stats_entry(day(4), 80.0, None).await.unwrap();
        let second = service
            .add_stats_entry(day(4), 79.5, Some(17.0))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(service.count_stats().await.unwrap(), 1);
        let stored = service.list_stats(10, 0).await.unwrap();
        assert_eq!(stored[0].body_fat_percentage, Some(17.0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn export_all_collects_every_collection() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let profile = UserProfile {
            height_cm: Some(170.0),
            sex: Some(Sex::Male),
            ..UserProfile::default()
        };
        service.save_profile(&profile).await.unwrap();
        service
            .save_activity(&Activity::new(ActivityType::PoolSwim, day(1), 1.5, 1800.0))
            .await
            .unwrap();
        service.add_stats_entry(day(1), 75.0, None).await.unwrap();
        service
            .save_diet_entry(&DietEntry::new(day(1), 2100.0))
            .await
            .unwrap();

        let data = service.export_all().await.unwrap();
        assert_eq!(data.user_profile, Some(profile));
        assert_eq!(data.activities.len(), 1);
        assert_eq!(data.stats_entries.len(), 1);
        assert_eq!(data.diet_entries.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_all_upserts_without_deleting() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let local_only = Activity::new(ActivityType::RoadCycle, day(1), 40.0, 5400.0);
        let mut shared = Activity::new(ActivityType::RoadRun, day(2), 5.0, 1500.0);
        service.save_activity(&local_only).await.unwrap();
        service.save_activity(&shared).await.unwrap();

        shared.distance_in_km = 8.0;
        let incoming = BackupData {
            activities: vec![shared.clone()],
            ..BackupData::default()
        };
        service.import_all(&incoming).await.unwrap();

        assert_eq!(service.count_activities().await.unwrap(), 2);
        let stored = service.get_activity(&shared.id).await.unwrap().unwrap();
        assert_eq!(stored, shared);
        assert!(service.get_activity(&local_only.id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_all_keeps_profile_when_snapshot_has_none() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let profile = UserProfile {
            height_cm: Some(165.0),
            ..UserProfile::default()
        };
        service.save_profile(&profile).await.unwrap();

        service.import_all(&BackupData::default()).await.unwrap();

        assert_eq!(service.load_profile().await.unwrap(), Some(profile));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backup_folder_persistence() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let folder = FolderReference::from_path("/mnt/cloud/race-buddy");

        service.save_backup_folder(&folder).await.unwrap();
        assert_eq!(service.load_backup_folder().await.unwrap(), Some(folder));

        service.clear_backup_folder().await.unwrap();
        assert_eq!(service.load_backup_folder().await.unwrap(), None);
    }

    #[test]
    fn quarantine_moves_db_and_removes_sidecars() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("race-buddy.db");
        let wal_path = tmp.path().join("race-buddy.db-wal");
        std::fs::write(&db_path, b"bad-db").unwrap();
        std::fs::write(&wal_path, b"wal").unwrap();

        DatabaseService::quarantine_corrupted_db_files(&db_path).unwrap();

        assert!(!db_path.exists());
        assert!(!wal_path.exists());
        let quarantined = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .any(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("race-buddy.db.corrupt-")
            });
        assert!(quarantined);
    }

    #[test]
    fn detects_corrupted_db_errors() {
        assert!(DatabaseService::is_corrupted_db_error(
            &crate::Error::Database("SQLite failure: file is not a database".to_string())
        ));
        assert!(!DatabaseService::is_corrupted_db_error(
            &crate::Error::InvalidInput("calories must be positive".to_string())
        ));
    }
}
