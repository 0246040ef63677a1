//! Data models for Race Buddy

mod activity;
mod diet;
mod folder;
mod profile;
mod stats;

pub use activity::{Activity, ActivityType};
pub use diet::DietEntry;
pub use folder::FolderReference;
pub use profile::{Schedule, Sex, UserProfile, Weekday};
pub use stats::StatsEntry;

/// Generate a new record identifier using UUID v7 (time-sortable)
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
