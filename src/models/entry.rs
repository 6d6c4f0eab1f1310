use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DoseError, Result};

/// A committed log entry. Immutable once created.
///
/// Field names on disk follow the entry record: `foodName`,
/// `calculatedInsulin`, `timestamp` in epoch milliseconds, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    /// Commit instant in epoch milliseconds, as a string.
    pub id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// For composite meals, the constituent names joined by ", ".
    pub food_name: String,

    /// Grams, rounded to one decimal.
    pub carbs: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bg: Option<f64>,

    /// Units, rounded to one decimal.
    pub calculated_insulin: f64,

    pub portion_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn check_amount(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DoseError::InvalidNutrition(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

impl FoodEntry {
    /// Create an entry stamped at `timestamp`. The id is derived from it.
    ///
    /// Rejects negative or non-finite carbs and insulin.
    pub fn new(
        timestamp: DateTime<Utc>,
        food_name: impl Into<String>,
        carbs: f64,
        calculated_insulin: f64,
        current_bg: Option<f64>,
        portion_description: impl Into<String>,
    ) -> Result<Self> {
        check_amount("carbs", carbs)?;
        check_amount("insulin", calculated_insulin)?;
        Ok(Self {
            id: timestamp.timestamp_millis().to_string(),
            timestamp,
            food_name: food_name.into(),
            carbs,
            current_bg,
            calculated_insulin,
            portion_description: portion_description.into(),
            image_url: None,
        })
    }

    /// Calendar date of the entry as seen in `tz`.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }

    pub fn is_valid(&self) -> bool {
        check_amount("carbs", self.carbs).is_ok()
            && check_amount("insulin", self.calculated_insulin).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_id_derived_from_timestamp() {
        let entry = FoodEntry::new(at(1_700_000_000_123), "Toast", 30.0, 3.0, None, "").unwrap();
        assert_eq!(entry.id, "1700000000123");
    }

    #[test]
    fn test_rejects_negative_or_non_finite() {
        assert!(FoodEntry::new(at(0), "x", -1.0, 0.0, None, "").is_err());
        assert!(FoodEntry::new(at(0), "x", 1.0, f64::NAN, None, "").is_err());
        assert!(FoodEntry::new(at(0), "x", 0.0, 0.0, None, "").is_ok());
    }

    #[test]
    fn test_entry_record_format() {
        let json = r#"{
            "id": "1700000000000",
            "timestamp": 1700000000000,
            "foodName": "Oatmeal",
            "carbs": 45.5,
            "currentBg": 140,
            "calculatedInsulin": 5.4,
            "portionDescription": "1 bowl"
        }"#;
        let entry: FoodEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.food_name, "Oatmeal");
        assert_eq!(entry.current_bg, Some(140.0));
        assert_eq!(entry.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert!(entry.image_url.is_none());

        let out = serde_json::to_value(&entry).unwrap();
        assert_eq!(out["timestamp"], 1_700_000_000_000_i64);
        assert_eq!(out["calculatedInsulin"], 5.4);
        assert!(out.get("imageUrl").is_none());
    }

    #[test]
    fn test_local_date_depends_on_zone() {
        // 2024-03-10 23:30 UTC
        let entry = FoodEntry::new(at(1_710_113_400_000), "Late snack", 10.0, 1.0, None, "").unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(entry.local_date(&utc), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(entry.local_date(&plus_two), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }
}
