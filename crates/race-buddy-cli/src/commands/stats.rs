use race_buddy_core::models::StatsEntry;

use crate::commands::common::{format_optional, normalize_identifier, print_json, Session};
use crate::error::CliError;

pub fn validate_stats(weight_kg: f64, body_fat: Option<f64>) -> Result<(), CliError> {
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(CliError::InvalidInput(
            "Weight must be a positive number".to_string(),
        ));
    }
    if body_fat.is_some_and(|fat| !(0.0..=100.0).contains(&fat)) {
        return Err(CliError::InvalidInput(
            "Body fat must be between 0 and 100 percent".to_string(),
        ));
    }
    Ok(())
}

pub async fn run_stats_add(
    session: &mut Session,
    date: chrono::NaiveDate,
    weight_kg: f64,
    body_fat: Option<f64>,
) -> Result<(), CliError> {
    validate_stats(weight_kg, body_fat)?;
    session.startup_sync().await;
    let entry = session.db.add_stats_entry(date, weight_kg, body_fat).await?;
    session.record_change().await?;

    println!("{}", entry.id);
    Ok(())
}

pub async fn run_stats_list(
    session: &mut Session,
    limit: usize,
    offset: usize,
    json: bool,
) -> Result<(), CliError> {
    session.startup_sync().await;
    let entries = session.db.list_stats(limit, offset).await?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No stats recorded");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_stats_line(entry));
    }
    Ok(())
}

pub async fn run_stats_delete(session: &mut Session, id: &str) -> Result<(), CliError> {
    let id = normalize_identifier(id)?;
    session.startup_sync().await;
    session.db.delete_stats_entry(id).await?;
    session.record_change().await?;

    println!("Deleted stats entry {id}");
    Ok(())
}

pub fn format_stats_line(entry: &StatsEntry) -> String {
    format!(
        "{}  {}  {:>8.1} kg  fat {:>6}  lean {:>9}",
        entry.id,
        entry.date,
        entry.weight_kg,
        format_optional(entry.body_fat_percentage, "%"),
        format_optional(entry.lean_mass_kg(), " kg"),
    )
}
