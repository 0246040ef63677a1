//! Diet entry repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use libsql::Connection;

use crate::error::{Error, Result};
use crate::models::DietEntry;

use super::{get_number, parse_date, parse_row_count};

const SELECT_COLUMNS: &str =
    "SELECT id, date, calories, protein_g, carbs_g, fat_g, notes FROM diet_entries";

/// Trait for nutrition log storage operations (async)
#[allow(async_fn_in_trait)]
pub trait DietRepository {
    async fn get(&self, id: &str) -> Result<Option<DietEntry>>;

    async fn save(&self, entry: &DietEntry) -> Result<()>;

    async fn save_many(&self, entries: &[DietEntry]) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// List entries, newest first
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<DietEntry>>;

    /// List every entry, oldest first
    async fn list_all(&self) -> Result<Vec<DietEntry>>;
}

/// libSQL implementation of `DietRepository`
pub struct LibSqlDietRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlDietRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_entry(row: &libsql::Row) -> Result<DietEntry> {
        let date: String = row.get(1)?;
        Ok(DietEntry {
            id: row.get(0)?,
            date: parse_date(&date)?,
            calories: get_number(row, 2)?,
            protein_g: row.get(3)?,
            carbs_g: row.get(4)?,
            fat_g: row.get(5)?,
            notes: row.get(6)?,
        })
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<DietEntry>> {
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_entry(&row)?);
        }
        Ok(entries)
    }
}

impl DietRepository for LibSqlDietRepository<'_> {
    async fn get(&self, id: &str) -> Result<Option<DietEntry>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, entry: &DietEntry) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO diet_entries
                 (id, date, calories, protein_g, carbs_g, fat_g, notes)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    entry.id.as_str(),
                    entry.date.to_string(),
                    entry.calories,
                    entry.protein_g,
                    entry.carbs_g,
                    entry.fat_g,
                    entry.notes.clone()
                ],
            )
            .await?;
        Ok(())
    }

    async fn save_many(&self, entries: &[DietEntry]) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for entry in entries {
            if let Err(e) = self.save(entry).await {
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
            .execute("DELETE FROM diet_entries WHERE id = ?", [id])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM diet_entries", ())
            .await?;
        parse_row_count(rows.next().await?)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<DietEntry>> {
        let rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"),
                [limit as i64, offset as i64],
            )
            .await?;
        Self::collect_rows(rows).await
    }

    async fn list_all(&self) -> Result<Vec<DietEntry>> {
        let rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} ORDER BY date ASC, id ASC"), ())
            .await?;
        Self::collect_rows(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::NaiveDate;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_get_with_optional_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlDietRepository::new(db.connection());

        let mut entry = DietEntry::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 2400.0);
        entry.protein_g = Some(150.0);
        entry.notes = Some("carb load".to_string());
        repo.save(&entry).await.unwrap();

        let fetched = repo.get(&entry.id).await.unwrap().unwrap();
        assert_eq!(fetched, entry);
        assert_eq!(fetched.fat_g, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_many_and_count() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlDietRepository::new(db.connection());

        let entries = (1..=4)
            .map(|d| DietEntry::new(NaiveDate::from_ymd_opt(2024, 4, d).unwrap(), 2000.0))
            .collect::<Vec<_>>();
        repo.save_many(&entries).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 4);
        assert_eq!(repo.list(10, 0).await.unwrap()[0].date.to_string(), "2024-04-04");

        repo.delete(&entries[1].id).await.unwrap();
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fractional_calories_are_kept() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlDietRepository::new(db.connection());

        let entry = DietEntry::new(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), 2100.5);
        repo.save(&entry).await.unwrap();

        let fetched = repo.get(&entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.calories, 2100.5);
    }
}
