use chrono::{Local, NaiveDate};

use crate::dosing::calculations::{DoseBreakdown, PortionQuote};
use crate::models::{DosingProfile, FoodEntry, GlucoseUnit};
use crate::services::ProductMatch;
use crate::state::{DailyTotals, MealBuilder};

/// Display a dose breakdown.
pub fn display_dose(dose: &DoseBreakdown, current_glucose: Option<f64>, unit: GlucoseUnit) {
    println!();
    println!("Carbs:       {:>6.1} g", dose.carbs);
    println!("Carb dose:   {:>6.2} U", dose.carb_dose);
    match current_glucose {
        Some(bg) => println!(
            "Correction:  {:>6.2} U  (glucose {} {})",
            dose.correction_dose, bg, unit
        ),
        None => println!("Correction:  {:>6.2} U  (no reading)", dose.correction_dose),
    }
    println!("Total:       {:>6.1} U", dose.total);
    println!();
}

/// Display a portion quote.
pub fn display_quote(name: &str, quote: &PortionQuote) {
    let name = if name.is_empty() { "Portion" } else { name };
    println!("{}: {:.1} g carbs => {:.1} U", name, quote.carbs, quote.insulin);
}

/// Display the items of the meal being composed.
pub fn display_meal(meal: &MealBuilder) {
    if meal.is_empty() {
        println!("Meal: (empty)");
        return;
    }

    let max_name_len = meal.items().iter().map(|i| i.name.len()).max().unwrap_or(10);

    println!();
    println!("=== Current meal ===");
    for (i, item) in meal.items().iter().enumerate() {
        println!(
            "{:>3}. {:<width$} - {:>6.1} g | {:>5.1} U",
            i + 1,
            item.name,
            item.carbs,
            item.insulin,
            width = max_name_len
        );
    }
    let (carbs, insulin) = meal.totals();
    println!("--- Total: {:.1} g carbs, {:.1} U ---", carbs, insulin);
    println!();
}

/// Display a single logged entry.
pub fn display_entry(entry: &FoodEntry) {
    let time = entry.timestamp.with_timezone(&Local);
    let bg = entry
        .current_bg
        .map(|bg| format!(", glucose {}", bg))
        .unwrap_or_default();
    println!(
        "  {}  {} - {:.1} g carbs, {:.1} U{}",
        time.format("%a %d %b %H:%M"),
        entry.food_name,
        entry.carbs,
        entry.calculated_insulin,
        bg
    );
    if !entry.portion_description.is_empty() {
        println!("      {}", entry.portion_description);
    }
}

/// Display a list of log entries.
pub fn display_entries(entries: &[&FoodEntry], date: Option<NaiveDate>) {
    if entries.is_empty() {
        match date {
            Some(day) => println!("No meals logged on {}.", day),
            None => println!("No meals logged yet."),
        }
        return;
    }

    println!();
    match date {
        Some(day) => println!("=== Entries on {} ({}) ===", day, entries.len()),
        None => println!("=== All entries ({}) ===", entries.len()),
    }
    for entry in entries {
        display_entry(entry);
    }
    println!();
}

/// Display totals for one day.
pub fn display_daily_totals(date: NaiveDate, totals: &DailyTotals) {
    println!(
        "{}: {} entries, {:.1} g carbs, {:.1} U insulin",
        date, totals.entries, totals.carbs, totals.insulin
    );
}

/// Display product search results.
pub fn display_products(query: &str, products: &[ProductMatch]) {
    if products.is_empty() {
        println!("No products found for '{}'.", query);
        return;
    }
    println!();
    for (i, p) in products.iter().enumerate() {
        println!(
            "{:>3}. {} - {} g carbs per 100 g",
            i + 1,
            p.display_name(),
            p.carbs_per_100g
        );
    }
    println!();
}

/// Display the dosing profile.
pub fn display_profile(profile: &DosingProfile) {
    println!("Carb ratio (ICR):         1 U per {} g", profile.carb_ratio);
    println!(
        "Sensitivity factor (ISF): 1 U per {} {}",
        profile.sensitivity_factor, profile.glucose_unit
    );
    println!(
        "Target glucose:           {} {}",
        profile.target_glucose, profile.glucose_unit
    );
}
