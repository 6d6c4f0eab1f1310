use crate::dosing::calculations::scale_by_portion;
use crate::dosing::constants::{FALLBACK_REFERENCE_UNIT, PRODUCT_REFERENCE_UNIT};
use crate::error::{DoseError, Result};

/// One food in a meal that is still being composed.
#[derive(Debug, Clone, PartialEq)]
pub struct MealLineItem {
    /// Unique within the meal it belongs to.
    pub id: u64,

    pub name: String,

    /// Grams, rounded to one decimal.
    pub carbs: f64,

    /// Units, rounded to one decimal.
    pub insulin: f64,
}

/// Carbohydrate content of a portion, given per reference quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionQuantity {
    /// Grams of carbohydrate per `reference_unit`.
    pub carbs_per_unit: f64,

    /// Reference quantity, e.g. 100 for "per 100g".
    pub reference_unit: f64,

    /// Quantity actually eaten, in the same unit as `reference_unit`.
    pub amount_consumed: f64,
}

impl NutritionQuantity {
    /// Build from possibly blank inputs.
    ///
    /// Blank fields take their neutral value: no carbs, nothing eaten, and a
    /// reference unit of 1. A zero reference unit is also replaced by 1.
    pub fn from_inputs(
        carbs_per_unit: Option<f64>,
        reference_unit: Option<f64>,
        amount_consumed: Option<f64>,
    ) -> Self {
        let reference_unit = match reference_unit {
            Some(r) if r != 0.0 => r,
            _ => FALLBACK_REFERENCE_UNIT,
        };
        Self {
            carbs_per_unit: carbs_per_unit.unwrap_or(0.0),
            reference_unit,
            amount_consumed: amount_consumed.unwrap_or(0.0),
        }
    }

    /// Quantity from a catalog figure given per 100 g/ml.
    pub fn per_100(carbs_per_100: f64, amount_consumed: f64) -> Self {
        Self {
            carbs_per_unit: carbs_per_100,
            reference_unit: PRODUCT_REFERENCE_UNIT,
            amount_consumed,
        }
    }

    /// Reject negative or non-finite figures. A zero reference unit is
    /// allowed; it is replaced by 1 when scaling.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("carbs per unit", self.carbs_per_unit),
            ("reference unit", self.reference_unit),
            ("amount consumed", self.amount_consumed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DoseError::InvalidNutrition(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Carbs in the portion, rounded to one decimal.
    pub fn total_carbs(&self) -> f64 {
        scale_by_portion(self.carbs_per_unit, self.reference_unit, self.amount_consumed)
    }

    /// Provenance note, e.g. "250 units of 23g/100g".
    pub fn describe(&self) -> String {
        format!(
            "{} units of {}g/{}g",
            self.amount_consumed, self.carbs_per_unit, self.reference_unit
        )
    }
}
