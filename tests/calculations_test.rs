use assert_float_eq::*;

use gluco_dose_rs::dosing::{
    carb_dose, correction_dose, round1, scale_by_portion, total_dose,
};
use gluco_dose_rs::models::{DosingProfile, GlucoseUnit, NutritionQuantity};

fn make_profile(icr: f64, isf: f64, target: f64) -> DosingProfile {
    DosingProfile::new(icr, isf, target, GlucoseUnit::MgDl).unwrap()
}

#[test]
fn test_carb_dose_is_plain_division() {
    for icr in [1.0, 4.5, 10.0, 12.0, 33.3] {
        let profile = make_profile(icr, 50.0, 100.0);
        for carbs in [0.0, 0.1, 7.0, 45.5, 120.0] {
            assert_eq!(carb_dose(carbs, &profile), carbs / icr);
        }
    }
}

#[test]
fn test_no_correction_at_or_below_target() {
    let profile = make_profile(10.0, 50.0, 100.0);
    for bg in [0.0, 40.0, 70.0, 99.9, 100.0] {
        assert_eq!(correction_dose(Some(bg), &profile), 0.0);
    }
    assert_eq!(correction_dose(None, &profile), 0.0);
}

#[test]
fn test_total_dose_monotonic_in_carbs() {
    let profile = make_profile(12.0, 40.0, 110.0);
    let mut previous = f64::MIN;
    for step in 0..400 {
        let carbs = step as f64 * 0.7;
        let dose = total_dose(carbs, Some(150.0), &profile);
        assert!(dose >= previous, "dose dropped at {} g", carbs);
        previous = dose;
    }
}

#[test]
fn test_total_dose_monotonic_in_glucose() {
    let profile = make_profile(10.0, 50.0, 100.0);
    let mut previous = f64::MIN;
    for step in 0..400 {
        let bg = step as f64 * 1.3;
        let dose = total_dose(45.0, Some(bg), &profile);
        assert!(dose >= previous, "dose dropped at glucose {}", bg);
        previous = dose;
    }
}

#[test]
fn test_consuming_reference_amount_is_identity() {
    for x in [0.0, 1.0, 12.34, 23.0, 57.55, 99.99] {
        assert_eq!(scale_by_portion(x, 100.0, 100.0), round1(x));
    }
}

#[test]
fn test_meal_with_high_reading() {
    let profile = make_profile(10.0, 50.0, 100.0);
    assert_float_absolute_eq!(carb_dose(70.0, &profile), 7.0, 1e-9);
    assert_float_absolute_eq!(correction_dose(Some(180.0), &profile), 1.6, 1e-9);
    assert_float_absolute_eq!(total_dose(70.0, Some(180.0), &profile), 8.6, 1e-9);
}

#[test]
fn test_portion_scaling_per_100g() {
    assert_float_absolute_eq!(scale_by_portion(23.0, 100.0, 250.0), 57.5, 1e-9);

    let quantity = NutritionQuantity::from_inputs(Some(23.0), Some(100.0), Some(250.0));
    assert_float_absolute_eq!(quantity.total_carbs(), 57.5, 1e-9);
}

#[test]
fn test_mmol_profile_uses_same_arithmetic() {
    let mg = make_profile(10.0, 2.0, 6.0);
    let mmol = DosingProfile::new(10.0, 2.0, 6.0, GlucoseUnit::MmolL).unwrap();
    assert_eq!(total_dose(30.0, Some(10.0), &mg), total_dose(30.0, Some(10.0), &mmol));
    assert_float_absolute_eq!(total_dose(30.0, Some(10.0), &mmol), 5.0, 1e-9);
}
