use race_buddy_core::models::{ActivityType, Schedule, Weekday};

use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_schedule_show(session: &mut Session) -> Result<(), CliError> {
    session.startup_sync().await;
    let profile = session.db.load_profile().await?.unwrap_or_default();
    for line in format_schedule_lines(&profile.schedule) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_schedule_set(
    session: &mut Session,
    day: Weekday,
    activities: Vec<ActivityType>,
) -> Result<(), CliError> {
    session.startup_sync().await;
    let mut profile = session.db.load_profile().await?.unwrap_or_default();
    profile.schedule.set_day(day, dedup_activities(activities));
    session.db.save_profile(&profile).await?;
    session.record_change().await?;

    println!("{}", format_day(&profile.schedule, day));
    Ok(())
}

/// Drop repeated types while keeping the first occurrence order
pub fn dedup_activities(activities: Vec<ActivityType>) -> Vec<ActivityType> {
    let mut unique = Vec::with_capacity(activities.len());
    for activity in activities {
        if !unique.contains(&activity) {
            unique.push(activity);
        }
    }
    unique
}

pub fn format_schedule_lines(schedule: &Schedule) -> Vec<String> {
    Weekday::ALL
        .into_iter()
        .map(|day| format_day(schedule, day))
        .collect()
}

fn format_day(schedule: &Schedule, day: Weekday) -> String {
    let planned = schedule.day(day);
    let plan = if planned.is_empty() {
        "rest".to_string()
    } else {
        planned
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{:<10} {plan}", day.as_str())
}
