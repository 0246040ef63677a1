//! Database layer for Race Buddy

mod activity_repository;
mod connection;
mod diet_repository;
mod folder_repository;
mod migrations;
mod profile_repository;
mod stats_repository;

use chrono::NaiveDate;

use crate::error::{Error, Result};

pub use activity_repository::{ActivityRepository, LibSqlActivityRepository};
pub use connection::Database;
pub use diet_repository::{DietRepository, LibSqlDietRepository};
pub use folder_repository::{FolderRepository, LibSqlFolderRepository};
pub use profile_repository::{LibSqlProfileRepository, ProfileRepository};
pub use stats_repository::{LibSqlStatsRepository, StatsRepository};

/// Parse a stored `YYYY-MM-DD` column
fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| Error::Database(format!("Invalid date '{value}': {e}")))
}

/// Read a numeric column that may hold either an integer or a real value
#[allow(clippy::cast_precision_loss)]
fn get_number(row: &libsql::Row, idx: i32) -> Result<f64> {
    match row.get_value(idx)? {
        libsql::Value::Real(value) => Ok(value),
        libsql::Value::Integer(value) => Ok(value as f64),
        other => Err(Error::Database(format!(
            "Expected a number in column {idx}, found {other:?}"
        ))),
    }
}

/// Read the single `COUNT(*)` column from an optional row
fn parse_row_count(row: Option<libsql::Row>) -> Result<usize> {
    let Some(row) = row else {
        return Ok(0);
    };
    let count: i64 = row.get(0)?;
    usize::try_from(count).map_err(|e| Error::Database(format!("Invalid row count: {e}")))
}
