use chrono::NaiveDate;
use race_buddy_core::models::{Sex, UserProfile};

use crate::commands::common::{format_optional, print_json, Session};
use crate::error::CliError;

/// Field updates for `profile set`; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub height_cm: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub target_weight_kg: Option<f64>,
    pub target_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub const fn is_empty(&self) -> bool {
        self.height_cm.is_none()
            && self.date_of_birth.is_none()
            && self.sex.is_none()
            && self.target_weight_kg.is_none()
            && self.target_date.is_none()
    }

    pub fn apply(self, mut profile: UserProfile) -> Result<UserProfile, CliError> {
        if let Some(height) = self.height_cm {
            if !(height.is_finite() && height > 0.0) {
                return Err(CliError::InvalidInput(
                    "Height must be a positive number".to_string(),
                ));
            }
            profile.height_cm = Some(height);
        }
        if let Some(weight) = self.target_weight_kg {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(CliError::InvalidInput(
                    "Target weight must be a positive number".to_string(),
                ));
            }
            profile.target_weight_kg = Some(weight);
        }
        if self.date_of_birth.is_some() {
            profile.date_of_birth = self.date_of_birth;
        }
        if self.sex.is_some() {
            profile.sex = self.sex;
        }
        if self.target_date.is_some() {
            profile.target_date = self.target_date;
        }
        Ok(profile)
    }
}

pub async fn run_profile_show(session: &mut Session, json: bool) -> Result<(), CliError> {
    session.startup_sync().await;
    let profile = session.db.load_profile().await?;

    if json {
        return print_json(&profile);
    }

    let Some(profile) = profile else {
        println!("No profile yet. Run `race-buddy profile set` to create one.");
        return Ok(());
    };

    for line in format_profile_lines(&profile) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_profile_set(session: &mut Session, update: ProfileUpdate) -> Result<(), CliError> {
    if update.is_empty() {
        return Err(CliError::InvalidInput(
            "Provide at least one profile field to change".to_string(),
        ));
    }

    session.startup_sync().await;
    let current = session.db.load_profile().await?.unwrap_or_default();
    let profile = update.apply(current)?;
    session.db.save_profile(&profile).await?;
    session.record_change().await?;

    println!("Profile updated");
    Ok(())
}

pub fn format_profile_lines(profile: &UserProfile) -> Vec<String> {
    let date = |value: Option<NaiveDate>| value.map_or_else(|| "-".to_string(), |d| d.to_string());
    let mut lines = vec![
        format!("Height:        {}", format_optional(profile.height_cm, " cm")),
        format!("Date of birth: {}", date(profile.date_of_birth)),
        format!(
            "Sex:           {}",
            profile
                .sex
                .map_or_else(|| "-".to_string(), |sex| sex.to_string())
        ),
        format!(
            "Target weight: {}",
            format_optional(profile.target_weight_kg, " kg")
        ),
        format!("Target date:   {}", date(profile.target_date)),
    ];
    if !profile.is_registered() {
        lines.push("Registration incomplete: height, date of birth and sex are required".into());
    }
    lines
}
