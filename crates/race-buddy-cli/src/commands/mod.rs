pub mod activity;
pub mod backup;
pub mod common;
pub mod completions;
pub mod config;
pub mod diet;
pub mod export;
pub mod profile;
pub mod schedule;
pub mod stats;
