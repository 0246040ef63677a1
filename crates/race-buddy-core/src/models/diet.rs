//! Nutrition log model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_record_id;

/// One logged meal or daily nutrition total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietEntry {
    pub id: String,
    pub date: NaiveDate,
    pub calories: f64,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DietEntry {
    #[must_use]
    pub fn new(date: NaiveDate, calories: f64) -> Self {
        Self {
            id: new_record_id(),
            date,
            calories,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            notes: None,
        }
    }
}
