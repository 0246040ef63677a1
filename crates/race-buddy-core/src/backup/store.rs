//! Local store seam used by the sync engine

use super::BackupData;
use crate::Result;

/// Whole-dataset access to the local store
#[allow(async_fn_in_trait)]
pub trait BackupStore {
    /// Export every reconcilable collection
    async fn export_all(&self) -> Result<BackupData>;

    /// Upsert every record of every collection by id
    ///
    /// A missing profile or an empty collection leaves local data untouched;
    /// nothing is ever deleted.
    async fn import_all(&self, data: &BackupData) -> Result<()>;
}
