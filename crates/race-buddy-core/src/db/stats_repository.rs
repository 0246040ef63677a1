//! Stats entry repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use chrono::NaiveDate;
use libsql::Connection;

use crate::error::{Error, Result};
use crate::models::StatsEntry;

use super::{parse_date, parse_row_count};

const SELECT_COLUMNS: &str = "SELECT id, date, weight_kg, body_fat_percentage FROM stats_entries";

/// Trait for body-measurement storage operations (async)
#[allow(async_fn_in_trait)]
pub trait StatsRepository {
    async fn get(&self, id: &str) -> Result<Option<StatsEntry>>;

    /// Find the entry recorded for a given day
    async fn get_by_date(&self, date: NaiveDate) -> Result<Option<StatsEntry>>;

    /// Insert or replace an entry by its ID
    async fn save(&self, entry: &StatsEntry) -> Result<()>;

    /// Insert or replace many entries in one transaction
    async fn save_many(&self, entries: &[StatsEntry]) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// List entries, newest first
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<StatsEntry>>;

    /// List every entry, oldest first
    async fn list_all(&self) -> Result<Vec<StatsEntry>>;
}

/// libSQL implementation of `StatsRepository`
pub struct LibSqlStatsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlStatsRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_entry(row: &libsql::Row) -> Result<StatsEntry> {
        let date: String = row.get(1)?;
        Ok(StatsEntry {
            id: row.get(0)?,
            date: parse_date(&date)?,
            weight_kg: row.get(2)?,
            body_fat_percentage: row.get(3)?,
        })
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<StatsEntry>> {
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_entry(&row)?);
        }
        Ok(entries)
    }
}

impl StatsRepository for LibSqlStatsRepository<'_> {
    async fn get(&self, id: &str) -> Result<Option<StatsEntry>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_date(&self, date: NaiveDate) -> Result<Option<StatsEntry>> {
        let mut rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} WHERE date = ? ORDER BY id ASC LIMIT 1"),
                [date.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, entry: &StatsEntry) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO stats_entries (id, date, weight_kg, body_fat_percentage)
                 VALUES (?, ?, ?, ?)",
                libsql::params![
                    entry.id.as_str(),
                    entry.date.to_string(),
                    entry.weight_kg,
                    entry.body_fat_percentage
                ],
            )
            .await?;
        Ok(())
    }

    async fn save_many(&self, entries: &[StatsEntry]) -> Result<()> {
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
            .execute("DELETE FROM stats_entries WHERE id = ?", [id])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM stats_entries", ())
            .await?;
        parse_row_count(rows.next().await?)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<StatsEntry>> {
        let rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"),
                [limit as i64, offset as i64],
            )
            .await?;
        Self::collect_rows(rows).await
    }

    async fn list_all(&self) -> Result<Vec<StatsEntry>> {
        let rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} ORDER BY date ASC, id ASC"), ())
            .await?;
        Self::collect_rows(rows).await
    }
}
