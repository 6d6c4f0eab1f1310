use dialoguer::{Confirm, Input, Select};

use crate::error::{DoseError, Result};
use crate::models::{DosingProfile, GlucoseUnit, MealLineItem, ProfileUpdate};
use crate::services::ProductMatch;

/// Steps offered while composing a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealAction {
    SearchProduct,
    EnterPortion,
    EnterCarbs,
    RemoveItem,
    Commit,
    Cancel,
}

const MEAL_ACTIONS: [(MealAction, &str); 6] = [
    (MealAction::SearchProduct, "Search a product"),
    (MealAction::EnterPortion, "Enter carbs per unit and amount"),
    (MealAction::EnterCarbs, "Enter total carbs"),
    (MealAction::RemoveItem, "Remove an item"),
    (MealAction::Commit, "Log meal"),
    (MealAction::Cancel, "Quit without logging"),
];

/// Parse a number field. Blank input means "not given".
pub fn parse_optional_number(input: &str) -> Result<Option<f64>> {
    let input = input.trim().replace(',', ".");
    if input.is_empty() {
        return Ok(None);
    }
    let value: f64 = input
        .parse()
        .map_err(|_| DoseError::InvalidInput(format!("'{}' is not a number", input)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DoseError::InvalidInput(format!(
            "'{}' must be a non-negative number",
            input
        )));
    }
    Ok(Some(value))
}

/// Validator for number prompts; the message is shown and the prompt repeats.
fn number_input_error(input: &String) -> std::result::Result<(), String> {
    parse_optional_number(input).map(|_| ()).map_err(|e| e.to_string())
}

/// Prompt for a number that may be left blank. Invalid input is asked again.
pub fn prompt_optional_number(prompt: &str) -> Result<Option<f64>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(number_input_error)
        .interact_text()?;
    parse_optional_number(&input)
}

/// Prompt for a number with a default value.
pub fn prompt_number(prompt: &str, default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(number_input_error)
        .interact_text()?;
    Ok(parse_optional_number(&input)?.unwrap_or(default))
}

/// Prompt for free text, possibly empty.
pub fn prompt_text(prompt: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(input.trim().to_string())
}

/// Prompt for the current glucose reading, which is optional.
pub fn prompt_current_glucose(unit: GlucoseUnit) -> Result<Option<f64>> {
    prompt_optional_number(&format!("Current blood glucose in {} (optional)", unit))
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Pick the next step while composing a meal.
pub fn prompt_meal_action(has_items: bool) -> Result<MealAction> {
    let actions: Vec<(MealAction, &str)> = MEAL_ACTIONS
        .iter()
        .copied()
        .filter(|(action, _)| {
            has_items || !matches!(action, MealAction::RemoveItem | MealAction::Commit)
        })
        .collect();
    let labels: Vec<&str> = actions.iter().map(|(_, label)| *label).collect();

    let selection = Select::new()
        .with_prompt("What next?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(actions[selection].0)
}

/// Let the user pick one of the product matches.
///
/// Returns `None` when they choose none of them.
pub fn select_product(products: &[ProductMatch]) -> Result<Option<usize>> {
    let mut options: Vec<String> = products
        .iter()
        .map(|p| format!("{} ({}g carbs/100g)", p.display_name(), p.carbs_per_100g))
        .collect();
    options.push("None of these".to_string());

    let selection = Select::new()
        .with_prompt("Which product?")
        .items(&options)
        .default(0)
        .interact()?;

    Ok((selection < products.len()).then_some(selection))
}

/// Let the user pick a meal item to remove.
pub fn select_meal_item(items: &[MealLineItem]) -> Result<Option<u64>> {
    let mut options: Vec<String> = items
        .iter()
        .map(|item| format!("{} - {}g, {} U", item.name, item.carbs, item.insulin))
        .collect();
    options.push("Keep all".to_string());

    let selection = Select::new()
        .with_prompt("Remove which item?")
        .items(&options)
        .default(options.len() - 1)
        .interact()?;

    Ok(items.get(selection).map(|item| item.id))
}

/// Ask for every profile value, offering the current ones as defaults.
pub fn prompt_profile(current: &DosingProfile) -> Result<ProfileUpdate> {
    let carb_ratio = prompt_number("Carb ratio (grams per unit)", current.carb_ratio)?;
    let sensitivity_factor =
        prompt_number("Sensitivity factor (glucose drop per unit)", current.sensitivity_factor)?;
    let target_glucose = prompt_number("Target blood glucose", current.target_glucose)?;

    let units = [GlucoseUnit::MgDl, GlucoseUnit::MmolL];
    let default_unit = units
        .iter()
        .position(|u| *u == current.glucose_unit)
        .unwrap_or(0);
    let unit_index = Select::new()
        .with_prompt("Glucose unit")
        .items(&units.map(|u| u.as_str()))
        .default(default_unit)
        .interact()?;

    Ok(ProfileUpdate {
        carb_ratio: Some(carb_ratio),
        sensitivity_factor: Some(sensitivity_factor),
        target_glucose: Some(target_glucose),
        glucose_unit: Some(units[unit_index]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_number() {
        assert_eq!(parse_optional_number("").unwrap(), None);
        assert_eq!(parse_optional_number("  ").unwrap(), None);
        assert_eq!(parse_optional_number("42").unwrap(), Some(42.0));
        assert_eq!(parse_optional_number("7,5").unwrap(), Some(7.5));
        assert!(parse_optional_number("abc").is_err());
        assert!(parse_optional_number("-3").is_err());
        assert!(parse_optional_number("inf").is_err());
    }

    #[test]
    fn test_number_prompt_validator() {
        assert!(number_input_error(&String::new()).is_ok());
        assert!(number_input_error(&"12,5".to_string()).is_ok());

        let err = number_input_error(&"abc".to_string()).unwrap_err();
        assert!(err.contains("not a number"));
        assert!(number_input_error(&"-3".to_string()).is_err());
    }
}
