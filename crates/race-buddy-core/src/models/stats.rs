//! Body measurement model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_record_id;

/// Weight and body-fat reading for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEntry {
    pub id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(default)]
    pub body_fat_percentage: Option<f64>,
}

impl StatsEntry {
    #[must_use]
    pub fn new(date: NaiveDate, weight_kg: f64, body_fat_percentage: Option<f64>) -> Self {
        Self {
            id: new_record_id(),
            date,
            weight_kg,
            body_fat_percentage,
        }
    }

    /// Lean mass in kilograms, when body fat was measured
    #[must_use]
    pub fn lean_mass_kg(&self) -> Option<f64> {
        self.body_fat_percentage
            .map(|fat| self.weight_kg * (1.0 - fat / 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_fat_serializes_as_null() {
        let entry = StatsEntry::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 80.0, None);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["bodyFatPercentage"].is_null());
        assert_eq!(json["weightKg"], 80.0);
    }

    #[test]
    fn test_lean_mass() {
        let entry = StatsEntry::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            80.0,
            Some(25.0),
        );
        assert_eq!(entry.lean_mass_kg(), Some(60.0));
    }
}
