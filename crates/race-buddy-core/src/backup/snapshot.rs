//! Backup snapshot document and codec

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DecodeError;
use crate::models::{Activity, DietEntry, StatsEntry, UserProfile};
use crate::util::truncate_to_millis;

/// File name of the snapshot inside the backup folder
pub const BACKUP_FILE_NAME: &str = "race-buddy-backup.json";

/// Schema version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every reconcilable collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub stats_entries: Vec<StatsEntry>,
    #[serde(default)]
    pub diet_entries: Vec<DietEntry>,
}

impl BackupData {
    /// Total number of records, counting the profile as one
    #[must_use]
    pub fn record_count(&self) -> usize {
        usize::from(self.user_profile.is_some())
            + self.activities.len()
            + self.stats_entries.len()
            + self.diet_entries.len()
    }
}

/// The unit of exchange with the backup folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub version: u32,
    #[serde(with = "iso_millis")]
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub data: BackupData,
}

impl BackupSnapshot {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Stamp data with the current schema version and a timestamp
#[must_use]
pub fn encode(data: BackupData, at: DateTime<Utc>) -> BackupSnapshot {
    BackupSnapshot {
        version: SNAPSHOT_VERSION,
        last_modified: truncate_to_millis(at),
        data,
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Parse a snapshot document
///
/// The version is checked before the body so a snapshot from a newer schema
/// is reported as such rather than as malformed.
pub fn decode(bytes: &[u8]) -> Result<BackupSnapshot, DecodeError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    if probe.version != SNAPSHOT_VERSION {
        return Err(DecodeError::UnsupportedVersion(probe.version));
    }
    Ok(serde_json::from_slice(bytes)?)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::util::{format_iso_millis, parse_iso_timestamp, truncate_to_millis};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso_millis(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_timestamp(&raw)
            .map(truncate_to_millis)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
