use chrono::NaiveDate;
use race_buddy_core::models::DietEntry;
use race_buddy_core::util::{normalize_text_option, today};

use crate::commands::common::{format_optional, normalize_identifier, print_json, Session};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct DietInput {
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

pub fn build_diet_entry(input: DietInput) -> Result<DietEntry, CliError> {
    if !(input.calories.is_finite() && input.calories >= 0.0) {
        return Err(CliError::InvalidInput(
            "Calories must be zero or more".to_string(),
        ));
    }

    for (label, value) in [
        ("Protein", input.protein_g),
        ("Carbs", input.carbs_g),
        ("Fat", input.fat_g),
    ] {
        if value.is_some_and(|grams| !(grams.is_finite() && grams >= 0.0)) {
            return Err(CliError::InvalidInput(format!(
                "{label} must be zero or more grams"
            )));
        }
    }

    Ok(DietEntry {
        protein_g: input.protein_g,
        carbs_g: input.carbs_g,
        fat_g: input.fat_g,
        notes: normalize_text_option(input.notes),
        ..DietEntry::new(input.date.unwrap_or_else(today), input.calories)
    })
}

pub async fn run_diet_add(session: &mut Session, entry: DietEntry) -> Result<(), CliError> {
    session.startup_sync().await;
    session.db.save_diet_entry(&entry).await?;
    session.record_change().await?;

    println!("{}", entry.id);
    Ok(())
}

pub async fn run_diet_list(
    session: &mut Session,
    limit: usize,
    offset: usize,
    json: bool,
) -> Result<(), CliError> {
    session.startup_sync().await;
    let entries = session.db.list_diet(limit, offset).await?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No diet entries found");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_diet_line(entry));
    }
    Ok(())
}

pub async fn run_diet_delete(session: &mut Session, id: &str) -> Result<(), CliError> {
    let id = normalize_identifier(id)?;
    session.startup_sync().await;
    session.db.delete_diet_entry(id).await?;
    session.record_change().await?;

    println!("Deleted diet entry {id}");
    Ok(())
}

pub fn format_diet_line(entry: &DietEntry) -> String {
    let mut line = format!(
        "{}  {}  {:>5.0} kcal  P {:>7}  C {:>7}  F {:>7}",
        entry.id,
        entry.date,
        entry.calories,
        format_optional(entry.protein_g, "g"),
        format_optional(entry.carbs_g, "g"),
        format_optional(entry.fat_g, "g"),
    );
    if let Some(notes) = &entry.notes {
        line.push_str("  ");
        line.push_str(notes);
    }
    line
}
