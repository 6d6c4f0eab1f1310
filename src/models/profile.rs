use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dosing::constants::{
    DEFAULT_CARB_RATIO, DEFAULT_SENSITIVITY_FACTOR, DEFAULT_TARGET_GLUCOSE,
};
use crate::error::{DoseError, Result};

/// Unit glucose readings are entered in. Display only; the arithmetic is
/// the same for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[default]
    #[serde(rename = "mg/dL")]
    MgDl,

    #[serde(rename = "mmol/L")]
    MmolL,
}

impl GlucoseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlucoseUnit::MgDl => "mg/dL",
            GlucoseUnit::MmolL => "mmol/L",
        }
    }
}

impl fmt::Display for GlucoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlucoseUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg/dl" | "mgdl" | "mg" => Ok(GlucoseUnit::MgDl),
            "mmol/l" | "mmoll" | "mmol" => Ok(GlucoseUnit::MmolL),
            other => Err(format!("unknown glucose unit '{}'", other)),
        }
    }
}

/// A user's dosing ratios.
///
/// Field names on disk follow the settings record: `icr`, `isf`, `targetBg`,
/// `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosingProfile {
    /// Grams of carbohydrate covered by one unit (ICR).
    #[serde(rename = "icr")]
    pub carb_ratio: f64,

    /// Glucose drop per unit (ISF).
    #[serde(rename = "isf")]
    pub sensitivity_factor: f64,

    #[serde(rename = "targetBg")]
    pub target_glucose: f64,

    #[serde(rename = "unit", default)]
    pub glucose_unit: GlucoseUnit,
}

impl Default for DosingProfile {
    fn default() -> Self {
        Self {
            carb_ratio: DEFAULT_CARB_RATIO,
            sensitivity_factor: DEFAULT_SENSITIVITY_FACTOR,
            target_glucose: DEFAULT_TARGET_GLUCOSE,
            glucose_unit: GlucoseUnit::default(),
        }
    }
}

fn check_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DoseError::InvalidProfile(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}

impl DosingProfile {
    /// Build a profile, rejecting any non-positive or non-finite field.
    pub fn new(
        carb_ratio: f64,
        sensitivity_factor: f64,
        target_glucose: f64,
        glucose_unit: GlucoseUnit,
    ) -> Result<Self> {
        let profile = Self {
            carb_ratio,
            sensitivity_factor,
            target_glucose,
            glucose_unit,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check that every ratio is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        check_positive("carb ratio", self.carb_ratio)?;
        check_positive("sensitivity factor", self.sensitivity_factor)?;
        check_positive("target glucose", self.target_glucose)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// A partial edit of a profile. Unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileUpdate {
    pub carb_ratio: Option<f64>,
    pub sensitivity_factor: Option<f64>,
    pub target_glucose: Option<f64>,
    pub glucose_unit: Option<GlucoseUnit>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the edited profile. The result is validated as a whole.
    pub fn apply(&self, base: &DosingProfile) -> Result<DosingProfile> {
        DosingProfile::new(
            self.carb_ratio.unwrap_or(base.carb_ratio),
            self.sensitivity_factor.unwrap_or(base.sensitivity_factor),
            self.target_glucose.unwrap_or(base.target_glucose),
            self.glucose_unit.unwrap_or(base.glucose_unit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = DosingProfile::default();
        assert!(profile.is_valid());
        assert_eq!(profile.carb_ratio, 10.0);
        assert_eq!(profile.sensitivity_factor, 50.0);
        assert_eq!(profile.target_glucose, 100.0);
        assert_eq!(profile.glucose_unit, GlucoseUnit::MgDl);
    }

    #[test]
    fn test_rejects_non_positive_fields() {
        assert!(DosingProfile::new(0.0, 50.0, 100.0, GlucoseUnit::MgDl).is_err());
        assert!(DosingProfile::new(10.0, -1.0, 100.0, GlucoseUnit::MgDl).is_err());
        assert!(DosingProfile::new(10.0, 50.0, 0.0, GlucoseUnit::MgDl).is_err());
        assert!(DosingProfile::new(f64::NAN, 50.0, 100.0, GlucoseUnit::MgDl).is_err());
        assert!(DosingProfile::new(f64::INFINITY, 50.0, 100.0, GlucoseUnit::MgDl).is_err());
    }

    #[test]
    fn test_invalid_profile_error_kind() {
        let err = DosingProfile::new(10.0, 0.0, 100.0, GlucoseUnit::MgDl).unwrap_err();
        assert!(matches!(err, DoseError::InvalidProfile(ref msg) if msg.contains("sensitivity")));
    }

    #[test]
    fn test_settings_record_field_names() {
        let json = r#"{"icr": 12, "isf": 2.5, "targetBg": 6.0, "unit": "mmol/L"}"#;
        let profile: DosingProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.carb_ratio, 12.0);
        assert_eq!(profile.sensitivity_factor, 2.5);
        assert_eq!(profile.target_glucose, 6.0);
        assert_eq!(profile.glucose_unit, GlucoseUnit::MmolL);

        let out = serde_json::to_value(profile).unwrap();
        assert_eq!(out["unit"], "mmol/L");
        assert_eq!(out["targetBg"], 6.0);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("mg/dL".parse::<GlucoseUnit>().unwrap(), GlucoseUnit::MgDl);
        assert_eq!("MMOL/L".parse::<GlucoseUnit>().unwrap(), GlucoseUnit::MmolL);
        assert!("grains".parse::<GlucoseUnit>().is_err());
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let base = DosingProfile::default();
        let update = ProfileUpdate {
            carb_ratio: Some(8.0),
            ..Default::default()
        };
        let edited = update.apply(&base).unwrap();
        assert_eq!(edited.carb_ratio, 8.0);
        assert_eq!(edited.sensitivity_factor, base.sensitivity_factor);

        let bad = ProfileUpdate {
            sensitivity_factor: Some(0.0),
            ..Default::default()
        };
        assert!(bad.apply(&base).is_err());
    }
}
