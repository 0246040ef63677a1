//! Workout activity model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_record_id;

/// Kind of workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    RoadRun,
    TreadmillRun,
    PoolSwim,
    SeaSwim,
    RoadCycle,
    IndoorCycle,
    StrengthTrainingLegs,
    StrengthTrainingArms,
    StrengthTrainingCore,
    StrengthTrainingShoulders,
    StrengthTrainingBack,
}

impl ActivityType {
    pub const ALL: [Self; 11] = [
        Self::RoadRun,
        Self::TreadmillRun,
        Self::PoolSwim,
        Self::SeaSwim,
        Self::RoadCycle,
        Self::IndoorCycle,
        Self::StrengthTrainingLegs,
        Self::StrengthTrainingArms,
        Self::StrengthTrainingCore,
        Self::StrengthTrainingShoulders,
        Self::StrengthTrainingBack,
    ];

    /// Stable tag used in snapshots and the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoadRun => "RoadRun",
            Self::TreadmillRun => "TreadmillRun",
            Self::PoolSwim => "PoolSwim",
            Self::SeaSwim => "SeaSwim",
            Self::RoadCycle => "RoadCycle",
            Self::IndoorCycle => "IndoorCycle",
            Self::StrengthTrainingLegs => "StrengthTrainingLegs",
            Self::StrengthTrainingArms => "StrengthTrainingArms",
            Self::StrengthTrainingCore => "StrengthTrainingCore",
            Self::StrengthTrainingShoulders => "StrengthTrainingShoulders",
            Self::StrengthTrainingBack => "StrengthTrainingBack",
        }
    }

    /// Strength sessions carry no distance
    #[must_use]
    pub const fn is_strength(self) -> bool {
        matches!(
            self,
            Self::StrengthTrainingLegs
                | Self::StrengthTrainingArms
                | Self::StrengthTrainingCore
                | Self::StrengthTrainingShoulders
                | Self::StrengthTrainingBack
        )
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown activity type: {wanted}"))
    }
}

/// A recorded workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique identifier
    pub id: String,
    /// Workout kind
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Calendar day the workout happened
    pub date: NaiveDate,
    pub distance_in_km: f64,
    pub duration_in_seconds: f64,
}

impl Activity {
    /// Create a new activity with a fresh identifier
    #[must_use]
    pub fn new(
        activity_type: ActivityType,
        date: NaiveDate,
        distance_in_km: f64,
        duration_in_seconds: f64,
    ) -> Self {
        Self {
            id: new_record_id(),
            activity_type,
            date,
            distance_in_km,
            duration_in_seconds,
        }
    }

    /// Average pace in seconds per kilometre, when a distance was recorded
    #[must_use]
    pub fn pace_seconds_per_km(&self) -> Option<f64> {
        if self.distance_in_km > 0.0 {
            Some(self.duration_in_seconds / self.distance_in_km)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_parse_is_case_insensitive() {
        assert_eq!("roadrun".parse::<ActivityType>(), Ok(ActivityType::RoadRun));
        assert_eq!(
            " StrengthTrainingCore ".parse::<ActivityType>(),
            Ok(ActivityType::StrengthTrainingCore)
        );
        assert!("Yoga".parse::<ActivityType>().is_err());
    }

    #[test]
    fn test_activity_serializes_with_type_tag() {
        let activity = Activity {
            id: "a1".to_string(),
            activity_type: ActivityType::PoolSwim,
            date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            distance_in_km: 1.5,
            duration_in_seconds: 1800.0,
        };

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "PoolSwim");
        assert_eq!(json["date"], "2024-05-04");
        assert_eq!(json["distanceInKm"], 1.5);
        assert_eq!(json["durationInSeconds"], 1800.0);
    }

    #[test]
    fn test_activity_accepts_fractional_duration() {
        let raw = r#"{"id":"a2","type":"RoadRun","date":"2024-05-05",
            "distanceInKm":5.0,"durationInSeconds":1800.5}"#;
        let activity: Activity = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.duration_in_seconds, 1800.5);
        assert_eq!(activity.pace_seconds_per_km(), Some(360.1));
    }

    #[test]
    fn test_pace() {
        let run = Activity::new(
            ActivityType::RoadRun,
            NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            10.0,
            3000.0,
        );
        assert_eq!(run.pace_seconds_per_km(), Some(300.0));

        let lift = Activity::new(
            ActivityType::StrengthTrainingBack,
            NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            0.0,
            2400.0,
        );
        assert!(lift.activity_type.is_strength());
        assert_eq!(lift.pace_seconds_per_km(), None);
    }

    #[test]
    fn test_new_ids_unique() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let a = Activity::new(ActivityType::RoadRun, date, 5.0, 1500.0);
        let b = Activity::new(ActivityType::RoadRun, date, 5.0, 1500.0);
        assert_ne!(a.id, b.id);
    }
}
