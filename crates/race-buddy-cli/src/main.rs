//! Race Buddy CLI - training, body stats and diet tracking from the terminal
//!
//! Data lives in a local database and is mirrored to a user-chosen backup
//! folder as a single JSON snapshot.

mod cli;
mod commands;
mod config;
mod error;
mod picker;


use clap::Parser;
use race_buddy_core::util::today;

use crate::cli::{
    ActivityCommands, BackupCommands, Cli, Commands, ConfigCommands, DietCommands,
    ProfileCommands, ScheduleCommands, StatsCommands,
};
use crate::commands::activity::{
    build_activity, run_activity_add, run_activity_delete, run_activity_list,
};
use crate::commands::backup::{
    run_backup_push, run_backup_remove, run_backup_restore, run_backup_select, run_backup_status,
    run_backup_sync,
};
use crate::commands::common::{resolve_db_path, Session};
use crate::commands::completions::run_completions;
use crate::commands::config::{run_config_set, run_config_show, ConfigUpdate};
use crate::commands::diet::{
    build_diet_entry, run_diet_add, run_diet_delete, run_diet_list, DietInput,
};
use crate::commands::export::run_export;
use crate::commands::profile::{run_profile_set, run_profile_show, ProfileUpdate};
use crate::commands::schedule::{run_schedule_set, run_schedule_show};
use crate::commands::stats::{run_stats_add, run_stats_delete, run_stats_list};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::picker::CliFolderPicker;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "race_buddy=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load().map_err(CliError::Config)?;

    match cli.command {
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Config { command } => match command.unwrap_or(ConfigCommands::Show) {
            ConfigCommands::Show => {
                run_config_show(&config);
                Ok(())
            }
            ConfigCommands::Set {
                auto_sync,
                io_timeout_secs,
                db_path,
            } => run_config_set(
                config,
                ConfigUpdate {
                    auto_sync,
                    io_timeout_secs,
                    db_path,
                },
            ),
        },
        command => {
            let db_path = resolve_db_path(cli.db_path, &config);
            let choice = match &command {
                Commands::Backup {
                    command: Some(BackupCommands::Select { path }),
                } => path.clone(),
                _ => None,
            };
            let mut session =
                Session::open(&db_path, &config, cli.no_sync, CliFolderPicker::new(choice))
                    .await?;
            run_data_command(&mut session, command).await
        }
    }
}

async fn run_data_command(session: &mut Session, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Profile { command } => match command.unwrap_or(ProfileCommands::Show {
            json: false,
        }) {
            ProfileCommands::Show { json } => run_profile_show(session, json).await,
            ProfileCommands::Set {
                height_cm,
                date_of_birth,
                sex,
                target_weight_kg,
                target_date,
            } => {
                let update = ProfileUpdate {
                    height_cm,
                    date_of_birth,
                    sex,
                    target_weight_kg,
                    target_date,
                };
                run_profile_set(session, update).await
            }
        },
        Commands::Schedule { command } => match command.unwrap_or(ScheduleCommands::Show) {
            ScheduleCommands::Show => run_schedule_show(session).await,
            ScheduleCommands::Set { day, activities } => {
                run_schedule_set(session, day, activities).await
            }
        },
        Commands::Activity { command } => match command {
            ActivityCommands::Add {
                activity_type,
                distance_km,
                duration,
                date,
            } => {
                let activity = build_activity(activity_type, distance_km, duration, date)?;
                run_activity_add(session, activity).await
            }
            ActivityCommands::List {
                limit,
                offset,
                activity_type,
                json,
            } => run_activity_list(session, limit, offset, activity_type, json).await,
            ActivityCommands::Delete { id } => run_activity_delete(session, &id).await,
        },
        Commands::Stats { command } => match command {
            StatsCommands::Add {
                weight_kg,
                body_fat,
                date,
            } => run_stats_add(session, date.unwrap_or_else(today), weight_kg, body_fat).await,
            StatsCommands::List {
                limit,
                offset,
                json,
            } => run_stats_list(session, limit, offset, json).await,
            StatsCommands::Delete { id } => run_stats_delete(session, &id).await,
        },
        Commands::Diet { command } => match command {
            DietCommands::Add {
                calories,
                protein_g,
                carbs_g,
                fat_g,
                notes,
                date,
            } => {
                let entry = build_diet_entry(DietInput {
                    calories,
                    protein_g,
                    carbs_g,
                    fat_g,
                    notes,
                    date,
                })?;
                run_diet_add(session, entry).await
            }
            DietCommands::List {
                limit,
                offset,
                json,
            } => run_diet_list(session, limit, offset, json).await,
            DietCommands::Delete { id } => run_diet_delete(session, &id).await,
        },
        Commands::Backup { command } => match command.unwrap_or(BackupCommands::Status) {
            BackupCommands::Status => {
                run_backup_status(session);
                Ok(())
            }
            BackupCommands::Select { .. } => run_backup_select(session).await,
            BackupCommands::Remove => run_backup_remove(session).await,
            BackupCommands::Sync => run_backup_sync(session).await,
            BackupCommands::Push => run_backup_push(session).await,
            BackupCommands::Restore => run_backup_restore(session).await,
        },
        Commands::Export { output } => run_export(session, output.as_deref()).await,
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
