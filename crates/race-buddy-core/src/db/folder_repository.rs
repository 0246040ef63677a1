//! Backup folder reference repository implementation

use crate::error::Result;
use crate::models::FolderReference;
use libsql::Connection;

const FOLDER_KEY: &str = "handle";

/// Trait for the persisted backup folder reference (async)
#[allow(async_fn_in_trait)]
pub trait FolderRepository {
    async fn load(&self) -> Result<Option<FolderReference>>;

    async fn save(&self, folder: &FolderReference) -> Result<()>;

    /// Forget the stored folder; a no-op when none is stored
    async fn clear(&self) -> Result<()>;
}

/// libSQL implementation of `FolderRepository`
pub struct LibSqlFolderRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlFolderRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl FolderRepository for LibSqlFolderRepository<'_> {
    async fn load(&self) -> Result<Option<FolderReference>> {
        let mut rows = self
            .conn
            .query(
                "SELECT payload FROM backup_folder WHERE key = ?",
                [FOLDER_KEY],
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

    async fn save(&self, folder: &FolderReference) -> Result<()> {
        let payload = serde_json::to_string(folder)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO backup_folder (key, payload) VALUES (?, ?)",
                [FOLDER_KEY, payload.as_str()],
            )
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM backup_folder WHERE key = ?", [FOLDER_KEY])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_folder_lifecycle() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlFolderRepository::new(db.connection());

        assert!(repo.load().await.unwrap().is_none());

        let folder = FolderReference::from_path("/tmp/backups");
        repo.save(&folder).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(folder));

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
        repo.clear().await.unwrap();
    }
}
