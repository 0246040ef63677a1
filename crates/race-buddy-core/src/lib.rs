//! race-buddy-core - Core library for Race Buddy
//!
//! This crate contains the models, the local store and the folder backup
//! sync used by every Race Buddy client.

pub mod backup;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod util;

pub use error::{Error, Result};
pub use models::{Activity, ActivityType, DietEntry, StatsEntry, UserProfile};
pub use services::DatabaseService;
