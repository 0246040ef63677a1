use chrono::NaiveDate;
use race_buddy_core::models::{Activity, ActivityType};
use race_buddy_core::util::today;

use crate::commands::common::{
    format_pace, format_seconds, normalize_identifier, print_json, Session,
};
use crate::error::CliError;

/// Build a validated activity; strength sessions always record zero distance
pub fn build_activity(
    activity_type: ActivityType,
    distance_km: Option<f64>,
    duration_seconds: u32,
    date: Option<NaiveDate>,
) -> Result<Activity, CliError> {
    if duration_seconds == 0 {
        return Err(CliError::InvalidInput(
            "Duration must be greater than zero".to_string(),
        ));
    }

    let distance = if activity_type.is_strength() {
        if distance_km.is_some_and(|distance| distance != 0.0) {
            return Err(CliError::InvalidInput(format!(
                "{activity_type} does not take a distance"
            )));
        }
        0.0
    } else {
        match distance_km {
            Some(distance) if distance.is_finite() && distance > 0.0 => distance,
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "{activity_type} requires a positive --distance-km"
                )));
            }
        }
    };

    Ok(Activity::new(
        activity_type,
        date.unwrap_or_else(today),
        distance,
        f64::from(duration_seconds),
    ))
}

pub async fn run_activity_add(session: &mut Session, activity: Activity) -> Result<(), CliError> {
    session.startup_sync().await;
    session.db.save_activity(&activity).await?;
    session.record_change().await?;

    println!("{}", activity.id);
    Ok(())
}

pub async fn run_activity_list(
    session: &mut Session,
    limit: usize,
    offset: usize,
    activity_type: Option<ActivityType>,
    json: bool,
) -> Result<(), CliError> {
    session.startup_sync().await;
    let activities = match activity_type {
        Some(kind) => session
            .db
            .list_activities_by_type(kind)
            .await?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect(),
        None => session.db.list_activities(limit, offset).await?,
    };

    if json {
        return print_json(&activities);
    }

    if activities.is_empty() {
        println!("No activities found");
        return Ok(());
    }

    for activity in &activities {
        println!("{}", format_activity_line(activity));
    }
    Ok(())
}

pub async fn run_activity_delete(session: &mut Session, id: &str) -> Result<(), CliError> {
    let id = normalize_identifier(id)?;
    session.startup_sync().await;
    session.db.delete_activity(id).await?;
    session.record_change().await?;

    println!("Deleted activity {id}");
    Ok(())
}

pub fn format_activity_line(activity: &Activity) -> String {
    let distance = if activity.activity_type.is_strength() {
        "-".to_string()
    } else {
        format!("{:.2} km", activity.distance_in_km)
    };
    format!(
        "{}  {}  {:<25} {:>9}  {:>8}  {}",
        activity.id,
        activity.date,
        activity.activity_type,
        distance,
        format_seconds(activity.duration_in_seconds),
        format_pace(activity.pace_seconds_per_km()),
    )
}
