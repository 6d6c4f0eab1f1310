use crate::dosing::constants::FALLBACK_REFERENCE_UNIT;
use crate::models::{DosingProfile, NutritionQuantity};

/// Round to one decimal place, half away from zero.
///
/// This is the only rounding applied to doses and carb totals shown to the
/// user or stored in a log entry.
#[inline]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Insulin units needed to cover `carbs` grams. Not rounded.
///
/// The profile must already be validated; a non-positive carb ratio is
/// rejected when the profile is edited, not here.
#[inline]
pub fn carb_dose(carbs: f64, profile: &DosingProfile) -> f64 {
    carbs / profile.carb_ratio
}

/// Extra units needed to bring `current_glucose` down to target. Not rounded.
///
/// Returns 0 when no reading is given or the reading is at or below target.
/// Low readings never produce a negative correction.
pub fn correction_dose(current_glucose: Option<f64>, profile: &DosingProfile) -> f64 {
    match current_glucose {
        Some(bg) if bg > profile.target_glucose => {
            (bg - profile.target_glucose) / profile.sensitivity_factor
        }
        _ => 0.0,
    }
}

/// Recommended dose: carb dose plus correction, rounded once.
pub fn total_dose(carbs: f64, current_glucose: Option<f64>, profile: &DosingProfile) -> f64 {
    round1(carb_dose(carbs, profile) + correction_dose(current_glucose, profile))
}

/// Unrounded carbs for a portion. A zero reference unit is replaced by 1.
fn raw_portion_carbs(carbs_per_unit: f64, reference_unit: f64, amount_consumed: f64) -> f64 {
    let reference_unit = if reference_unit == 0.0 {
        tracing::debug!(
            fallback = FALLBACK_REFERENCE_UNIT,
            "reference unit is zero, substituting fallback"
        );
        FALLBACK_REFERENCE_UNIT
    } else {
        reference_unit
    };
    carbs_per_unit / reference_unit * amount_consumed
}

/// Carbs in a consumed portion, rounded to one decimal.
///
/// `scale_by_portion(23.0, 100.0, 250.0) == 57.5`.
pub fn scale_by_portion(carbs_per_unit: f64, reference_unit: f64, amount_consumed: f64) -> f64 {
    round1(raw_portion_carbs(
        carbs_per_unit,
        reference_unit,
        amount_consumed,
    ))
}

/// Breakdown of a dose recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseBreakdown {
    pub carbs: f64,
    pub carb_dose: f64,
    pub correction_dose: f64,
    /// Rounded total.
    pub total: f64,
}

/// Compute the full breakdown for a carb amount and optional reading.
pub fn dose_breakdown(
    carbs: f64,
    current_glucose: Option<f64>,
    profile: &DosingProfile,
) -> DoseBreakdown {
    DoseBreakdown {
        carbs,
        carb_dose: carb_dose(carbs, profile),
        correction_dose: correction_dose(current_glucose, profile),
        total: total_dose(carbs, current_glucose, profile),
    }
}

/// Carbs and dose for a measured portion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortionQuote {
    /// Portion carbs, rounded to one decimal.
    pub carbs: f64,
    /// Dose, rounded to one decimal.
    pub insulin: f64,
}

/// Quote a portion: rounded carbs plus the dose for it.
///
/// The dose is computed from the unrounded carb figure so the two roundings
/// do not compound.
pub fn quote_portion(
    quantity: &NutritionQuantity,
    current_glucose: Option<f64>,
    profile: &DosingProfile,
) -> PortionQuote {
    let raw = raw_portion_carbs(
        quantity.carbs_per_unit,
        quantity.reference_unit,
        quantity.amount_consumed,
    );
    PortionQuote {
        carbs: round1(raw),
        insulin: total_dose(raw, current_glucose, profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlucoseUnit;

    fn profile() -> DosingProfile {
        DosingProfile {
            carb_ratio: 10.0,
            sensitivity_factor: 50.0,
            target_glucose: 100.0,
            glucose_unit: GlucoseUnit::MgDl,
        }
    }

    #[test]
    fn test_round1_half_away_from_zero() {
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(0.24), 0.2);
        assert_eq!(round1(-0.25), -0.3);
        assert_eq!(round1(8.6), 8.6);
    }

    #[test]
    fn test_carb_dose_unrounded() {
        let dose = carb_dose(7.0, &DosingProfile { carb_ratio: 3.0, ..profile() });
        assert!((dose - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_correction_never_negative() {
        let p = profile();
        assert_eq!(correction_dose(None, &p), 0.0);
        assert_eq!(correction_dose(Some(100.0), &p), 0.0);
        assert_eq!(correction_dose(Some(40.0), &p), 0.0);
        assert!((correction_dose(Some(180.0), &p) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_total_dose_with_correction() {
        let b = dose_breakdown(70.0, Some(180.0), &profile());
        assert!((b.carb_dose - 7.0).abs() < 1e-9);
        assert!((b.correction_dose - 1.6).abs() < 1e-9);
        assert!((b.total - 8.6).abs() < 1e-9);
    }

    #[test]
    fn test_scale_by_portion() {
        assert!((scale_by_portion(23.0, 100.0, 250.0) - 57.5).abs() < 1e-9);
        assert_eq!(scale_by_portion(0.0, 100.0, 250.0), 0.0);
        // Zero reference unit falls back to 1
        assert!((scale_by_portion(2.0, 0.0, 3.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_quote_uses_unrounded_carbs_for_dose() {
        // 1.25g shows as 1.3g, but the dose is taken from 1.25g
        let p = DosingProfile { carb_ratio: 0.5, ..profile() };
        let q = NutritionQuantity {
            carbs_per_unit: 1.25,
            reference_unit: 1.0,
            amount_consumed: 1.0,
        };
        let quote = quote_portion(&q, None, &p);
        assert!((quote.carbs - 1.3).abs() < 1e-9);
        assert!((quote.insulin - 2.5).abs() < 1e-9);
    }
}
