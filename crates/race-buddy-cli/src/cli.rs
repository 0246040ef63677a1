use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use race_buddy_core::models::{ActivityType, Sex, Weekday};

#[derive(Parser)]
#[command(name = "race-buddy")]
#[command(about = "Track training, body stats and diet with folder-based backup")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Skip automatic reconciliation with the backup folder
    #[arg(long, global = true)]
    pub no_sync: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Show or edit the weekly training schedule
    Schedule {
        #[command(subcommand)]
        command: Option<ScheduleCommands>,
    },
    /// Log and browse workouts
    #[command(alias = "activities")]
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Log and browse weight and body-fat readings
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// Log and browse nutrition
    Diet {
        #[command(subcommand)]
        command: DietCommands,
    },
    /// Manage the backup folder
    Backup {
        #[command(subcommand)]
        command: Option<BackupCommands>,
    },
    /// Print a backup snapshot of local data
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show or change CLI settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the stored profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields; omitted fields keep their value
    Set {
        #[arg(long, value_name = "CM")]
        height_cm: Option<f64>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date_of_birth: Option<NaiveDate>,
        /// male or female
        #[arg(long)]
        sex: Option<Sex>,
        #[arg(long, value_name = "KG")]
        target_weight_kg: Option<f64>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        target_date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Show the planned activities for each day
    Show,
    /// Replace the plan for one day; no types marks a rest day
    Set {
        /// Day of the week
        day: Weekday,
        /// Planned activity types
        activities: Vec<ActivityType>,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// Log a workout
    Add {
        /// Activity type, for example RoadRun or StrengthTrainingLegs
        #[arg(long = "type", value_name = "TYPE")]
        activity_type: ActivityType,
        /// Distance in kilometres (omit for strength sessions)
        #[arg(long, value_name = "KM")]
        distance_km: Option<f64>,
        /// Duration in seconds
        #[arg(long, value_name = "SECS")]
        duration: u32,
        /// Workout date (today when omitted)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// List workouts, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Only show one activity type
        #[arg(long = "type", value_name = "TYPE")]
        activity_type: Option<ActivityType>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workout
    Delete {
        /// Activity ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Record a reading; replaces the reading already logged for that date
    Add {
        #[arg(long, value_name = "KG")]
        weight_kg: f64,
        /// Body fat in percent
        #[arg(long, value_name = "PERCENT")]
        body_fat: Option<f64>,
        /// Reading date (today when omitted)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// List readings, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a reading
    Delete {
        /// Stats entry ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum DietCommands {
    /// Log a meal or daily total
    Add {
        #[arg(long)]
        calories: f64,
        #[arg(long, value_name = "GRAMS")]
        protein_g: Option<f64>,
        #[arg(long, value_name = "GRAMS")]
        carbs_g: Option<f64>,
        #[arg(long, value_name = "GRAMS")]
        fat_g: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// Entry date (today when omitted)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// List entries, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry
    Delete {
        /// Diet entry ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Show the backup folder and last backup
    Status,
    /// Choose the backup folder and reconcile with it
    Select {
        /// Folder path (prompted for when omitted)
        path: Option<PathBuf>,
    },
    /// Forget the backup folder; the backup file is kept
    Remove,
    /// Reconcile local data with the backup folder
    Sync,
    /// Overwrite the backup with local data
    Push,
    /// Overwrite local data with the backup
    Restore,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current settings
    Show,
    /// Change settings
    Set {
        /// Reconcile automatically around every command
        #[arg(long, value_name = "BOOL")]
        auto_sync: Option<bool>,
        /// Timeout for backup folder operations, 0 disables it
        #[arg(long, value_name = "SECS")]
        io_timeout_secs: Option<u64>,
        /// Default database path
        #[arg(long, value_name = "PATH")]
        db_path: Option<PathBuf>,
    },
}
