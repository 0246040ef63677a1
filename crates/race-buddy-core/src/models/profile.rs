//! User profile and weekly training schedule

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ActivityType;

/// Biological sex used for body-composition targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(format!("unknown sex: {other}")),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("male"),
            Self::Female => f.write_str("female"),
        }
    }
}

/// Day of the training week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == wanted || day.as_str()[..3] == wanted)
            .ok_or_else(|| format!("unknown weekday: {wanted}"))
    }
}

/// Planned activity types for each day of the week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub monday: Vec<ActivityType>,
    #[serde(default)]
    pub tuesday: Vec<ActivityType>,
    #[serde(default)]
    pub wednesday: Vec<ActivityType>,
    #[serde(default)]
    pub thursday: Vec<ActivityType>,
    #[serde(default)]
    pub friday: Vec<ActivityType>,
    #[serde(default)]
    pub saturday: Vec<ActivityType>,
    #[serde(default)]
    pub sunday: Vec<ActivityType>,
}

impl Schedule {
    #[must_use]
    pub fn day(&self, day: Weekday) -> &[ActivityType] {
        match day {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
            Weekday::Saturday => &self.saturday,
            Weekday::Sunday => &self.sunday,
        }
    }

    /// Replace the plan for one day
    pub fn set_day(&mut self, day: Weekday, activities: Vec<ActivityType>) {
        let slot = match day {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        };
        *slot = activities;
    }
}

/// The single user profile stored on this device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl UserProfile {
    /// Registration is complete once height, date of birth and sex are known
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.height_cm.is_some() && self.date_of_birth.is_some() && self.sex.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_not_registered() {
        let profile = UserProfile::default();
        assert!(!profile.is_registered());
        assert!(profile.schedule.day(Weekday::Monday).is_empty());
    }

    #[test]
    fn test_registered_profile() {
        let profile = UserProfile {
            height_cm: Some(180.0),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15),
            sex: Some(Sex::Female),
            ..UserProfile::default()
        };
        assert!(profile.is_registered());
    }

    #[test]
    fn test_profile_json_shape() {
        let mut profile = UserProfile {
            height_cm: Some(172.5),
            sex: Some(Sex::Male),
            ..UserProfile::default()
        };
        profile
            .schedule
            .set_day(Weekday::Wednesday, vec![ActivityType::RoadRun]);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["heightCm"], 172.5);
        assert_eq!(json["sex"], "male");
        assert!(json["dateOfBirth"].is_null());
        assert_eq!(json["schedule"]["wednesday"][0], "RoadRun");
    }

    #[test]
    fn test_weekday_parse_accepts_short_names() {
        assert_eq!("Mon".parse::<Weekday>(), Ok(Weekday::Monday));
        assert_eq!("sunday".parse::<Weekday>(), Ok(Weekday::Sunday));
        assert!("funday".parse::<Weekday>().is_err());
    }
}
