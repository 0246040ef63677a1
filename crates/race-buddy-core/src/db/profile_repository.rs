//! User profile repository implementation

use crate::error::Result;
use crate::models::UserProfile;
use libsql::Connection;

const PROFILE_KEY: &str = "user";

/// Trait for the singleton profile record (async)
#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    /// Load the stored profile, if the user has registered one
    async fn load(&self) -> Result<Option<UserProfile>>;

    /// Replace the stored profile
    async fn save(&self, profile: &UserProfile) -> Result<()>;
}

/// libSQL implementation of `ProfileRepository`
pub struct LibSqlProfileRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlProfileRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for LibSqlProfileRepository<'_> {
    async fn load(&self) -> Result<Option<UserProfile>> {
        let mut rows = self
            .conn
            .query(
                "SELECT payload FROM user_profile WHERE key = ?",
                [PROFILE_KEY],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let payload: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let payload = serde_json::to_string(profile)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO user_profile (key, payload) VALUES (?, ?)",
                [PROFILE_KEY, payload.as_str()],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{ActivityType, Sex, Weekday};
    use chrono::NaiveDate;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_empty_profile() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProfileRepository::new(db.connection());

        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_and_replace_profile() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProfileRepository::new(db.connection());

        let mut profile = UserProfile {
            height_cm: Some(178.0),
            sex: Some(Sex::Female),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            ..UserProfile::default()
        };
        profile
            .schedule
            .set_day(Weekday::Tuesday, vec![ActivityType::RoadRun]);
        repo.save(&profile).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(profile.clone()));

        profile.target_weight_kg = Some(68.0);
        repo.save(&profile).await.unwrap();
        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.target_weight_kg, Some(68.0));
    }
}
