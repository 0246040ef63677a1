//! Activity repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET and integers

use crate::error::{Error, Result};
use crate::models::{Activity, ActivityType};
use libsql::Connection;

use super::{get_number, parse_date, parse_row_count};

const SELECT_COLUMNS: &str =
    "SELECT id, activity_type, date, distance_in_km, duration_in_seconds FROM activities";

/// Trait for activity storage operations (async)
#[allow(async_fn_in_trait)]
pub trait ActivityRepository {
    /// Get an activity by ID
    async fn get(&self, id: &str) -> Result<Option<Activity>>;

    /// Insert or replace an activity by its ID
    async fn save(&self, activity: &Activity) -> Result<()>;

    /// Insert or replace many activities in one transaction
    async fn save_many(&self, activities: &[Activity]) -> Result<()>;

    /// Delete an activity
    async fn delete(&self, id: &str) -> Result<()>;

    /// Number of stored activities
    async fn count(&self) -> Result<usize>;

    /// List activities, newest first
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Activity>>;

    /// List every activity, oldest first
    async fn list_all(&self) -> Result<Vec<Activity>>;

    /// List activities of one type, newest first
    async fn list_by_type(&self, activity_type: ActivityType) -> Result<Vec<Activity>>;
}

/// libSQL implementation of `ActivityRepository`
pub struct LibSqlActivityRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlActivityRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse an activity from a database row
    fn parse_activity(row: &libsql::Row) -> Result<Activity> {
        let activity_type: String = row.get(1)?;
        let date: String = row.get(2)?;

        Ok(Activity {
            id: row.get(0)?,
            activity_type: activity_type.parse().map_err(Error::Database)?,
            date: parse_date(&date)?,
            distance_in_km: row.get(3)?,
            duration_in_seconds: get_number(row, 4)?,
        })
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<Activity>> {
        let mut activities = Vec::new();
        while let Some(row) = rows.next().await? {
            activities.push(Self::parse_activity(&row)?);
        }
        Ok(activities)
    }
}

impl ActivityRepository for LibSqlActivityRepository<'_> {
    async fn get(&self, id: &str) -> Result<Option<Activity>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_activity(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, activity: &Activity) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO activities
                 (id, activity_type, date, distance_in_km, duration_in_seconds)
                 VALUES (?, ?, ?, ?, ?)",
                libsql::params![
                    activity.id.as_str(),
                    activity.activity_type.as_str(),
                    activity.date.to_string(),
                    activity.distance_in_km,
                    activity.duration_in_seconds
                ],
            )
            .await?;
        Ok(())
    }

    async fn save_many(&self, activities: &[Activity]) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for activity in activities {
            if let Err(e) = self.save(activity).await {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?", [id])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM activities", ())
            .await?;
        parse_row_count(rows.next().await?)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Activity>> {
        let rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"),
                [limit as i64, offset as i64],
            )
            .await?;
        Self::collect_rows(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Activity>> {
        let rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} ORDER BY date ASC, id ASC"), ())
            .await?;
        Self::collect_rows(rows).await
    }

    async fn list_by_type(&self, activity_type: ActivityType) -> Result<Vec<Activity>> {
        let rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} WHERE activity_type = ? ORDER BY date DESC, id DESC"),
                [activity_type.as_str()],
            )
            .await?;
        Self::collect_rows(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::NaiveDate;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn activity_on(day: u32, activity_type: ActivityType) -> Activity {
        Activity::new(
            activity_type,
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            5.0,
            1500.0,
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_and_get() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());

        let activity = activity_on(3, ActivityType::RoadRun);
        repo.save(&activity).await.unwrap();

        let fetched = repo.get(&activity.id).await.unwrap().unwrap();
        assert_eq!(fetched, activity);
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_replaces_by_id() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());

        let mut activity = activity_on(3, ActivityType::RoadRun);
        repo.save(&activity).await.unwrap();
        activity.distance_in_km = 21.1;
        repo.save(&activity).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let fetched = repo.get(&activity.id).await.unwrap().unwrap();
        assert!((fetched.distance_in_km - 21.1).abs() < f64::EPSILON);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_newest_first_with_pagination() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());

        let batch = vec![
            activity_on(1, ActivityType::RoadRun),
            activity_on(3, ActivityType::PoolSwim),
            activity_on(2, ActivityType::RoadCycle),
        ];
        repo.save_many(&batch).await.unwrap();

        let first_page = repo.list(2, 0).await.unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].date.to_string(), "2024-06-03");
        assert_eq!(first_page[1].date.to_string(), "2024-06-02");

        let second_page = repo.list(2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].date.to_string(), "2024-06-01");

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date.to_string(), "2024-06-01");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_durations_keep_full_precision() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());

        let mut fractional = activity_on(4, ActivityType::TreadmillRun);
        fractional.duration_in_seconds = 1800.5;
        let mut huge = activity_on(5, ActivityType::IndoorCycle);
        huge.duration_in_seconds = 1e19;
        repo.save_many(&[fractional.clone(), huge.clone()])
            .await
            .unwrap();

        let fetched = repo.get(&fractional.id).await.unwrap().unwrap();
        assert_eq!(fetched.duration_in_seconds, 1800.5);
        let fetched = repo.get(&huge.id).await.unwrap().unwrap();
        assert_eq!(fetched.duration_in_seconds, 1e19);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_numeric_duration_is_an_error() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());
        db.connection()
            .execute(
                "INSERT INTO activities
                 (id, activity_type, date, distance_in_km, duration_in_seconds)
                 VALUES ('bad', 'RoadRun', '2024-06-01', 5.0, 'slow')",
                (),
            )
            .await
            .unwrap();

        assert!(matches!(repo.get("bad").await, Err(Error::Database(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_by_type_and_delete() {
        let db = setup().await;
        let repo = LibSqlActivityRepository::new(db.connection());

        let swim = activity_on(1, ActivityType::SeaSwim);
        repo.save_many(&[swim.clone(), activity_on(2, ActivityType::RoadRun)])
            .await
            .unwrap();

        let swims = repo.list_by_type(ActivityType::SeaSwim).await.unwrap();
        assert_eq!(swims, vec![swim.clone()]);

        repo.delete(&swim.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(matches!(
            repo.delete(&swim.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
