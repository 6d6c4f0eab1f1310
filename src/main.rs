use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gluco_dose_rs::cli::{Cli, Command, ProfileAction};
use gluco_dose_rs::config::Config;
use gluco_dose_rs::dosing::PRODUCT_REFERENCE_UNIT;
use gluco_dose_rs::error::{DoseError, Result};
use gluco_dose_rs::interface::{
    display_daily_totals, display_dose, display_entries, display_entry, display_meal,
    display_products, display_profile, display_quote, export_entries, prompt_current_glucose,
    prompt_meal_action, prompt_optional_number, prompt_profile, prompt_text, prompt_yes_no,
    select_meal_item, select_product, MealAction,
};
use gluco_dose_rs::models::{NutritionQuantity, ProfileUpdate};
use gluco_dose_rs::services::{
    estimate_food, search_products, CatalogEstimator, CsvProductCatalog, FoodInput,
};
use gluco_dose_rs::state::{JsonFileStore, Session};

type AppSession = Session<JsonFileStore>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warn, info with -v, debug with -vv.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::debug!(?config, "loaded configuration");

    let mut session = Session::open(JsonFileStore::new(&config.data_dir))?;

    match cli.command.unwrap_or_default() {
        Command::Meal => cmd_meal(&mut session, &config.catalog_path),
        Command::Dose { carbs, bg } => cmd_dose(&session, carbs, bg),
        Command::Quick {
            name,
            carbs_per_unit,
            reference_unit,
            amount,
            bg,
            log,
        } => cmd_quick(
            &mut session,
            &name,
            NutritionQuantity::from_inputs(carbs_per_unit, Some(reference_unit), amount),
            bg,
            log,
        ),
        Command::Estimate {
            description,
            bg,
            yes,
        } => cmd_estimate(&mut session, &config.catalog_path, description, bg, yes),
        Command::Search { query } => cmd_search(&config.catalog_path, &query),
        Command::History { date, today } => {
            let date = if today {
                Some(Local::now().date_naive())
            } else {
                date
            };
            cmd_history(&session, date)
        }
        Command::Profile { action } => {
            cmd_profile(&mut session, action.unwrap_or(ProfileAction::Show))
        }
        Command::Export { output, date } => cmd_export(&session, &output, date),
    }
}

/// Load the product catalog, falling back to an empty one if the file is
/// missing.
fn load_catalog(path: &Path) -> Result<CsvProductCatalog> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "product catalog not found");
        return Ok(CsvProductCatalog::default());
    }
    CsvProductCatalog::load(path)
}

fn check_reading(label: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DoseError::InvalidInput(format!(
            "{} must be a non-negative number",
            label
        ))),
        _ => Ok(()),
    }
}

/// Show the dose for a known carb amount.
fn cmd_dose(session: &AppSession, carbs: f64, bg: Option<f64>) -> Result<()> {
    check_reading("carbs", Some(carbs))?;
    check_reading("glucose", bg)?;

    let dose = session.dose(carbs, bg);
    display_dose(&dose, bg, session.profile().glucose_unit);
    Ok(())
}

/// Quote a measured portion and optionally log it.
fn cmd_quick(
    session: &mut AppSession,
    name: &str,
    quantity: NutritionQuantity,
    bg: Option<f64>,
    log: bool,
) -> Result<()> {
    quantity.validate()?;
    check_reading("glucose", bg)?;

    let quote = session.quote(&quantity, bg);
    display_quote(name, &quote);

    if log {
        let entry = session.log_portion(name, &quantity, bg, Utc::now())?;
        println!("Logged:");
        display_entry(entry);
    }
    Ok(())
}

/// Estimate a described food, confirm, and log it.
fn cmd_estimate(
    session: &mut AppSession,
    catalog_path: &Path,
    description: String,
    bg: Option<f64>,
    yes: bool,
) -> Result<()> {
    check_reading("glucose", bg)?;

    let estimator = CatalogEstimator::new(load_catalog(catalog_path)?);
    let token = session.begin_estimate();
    match estimate_food(&estimator, &FoodInput::Description(description)) {
        Ok(estimate) => {
            session.receive_estimate(token, estimate);
        }
        Err(e) => {
            eprintln!("Estimate failed: {}", e);
            return Ok(());
        }
    }

    let Some(estimate) = session.pending_estimate() else {
        return Ok(());
    };
    println!("{}: {:.1} g carbs", estimate.food_name, estimate.carbs);
    if !estimate.explanation.is_empty() {
        println!("  {}", estimate.explanation);
    }
    let bg = match bg {
        None if !yes => prompt_current_glucose(session.profile().glucose_unit)?,
        _ => bg,
    };
    let dose = session.dose(estimate.carbs, bg);
    display_dose(&dose, bg, session.profile().glucose_unit);

    if !yes && !prompt_yes_no("Log this entry?", true)? {
        session.discard_estimate();
        println!("Discarded.");
        return Ok(());
    }

    if let Some(entry) = session.confirm_estimate(bg, Utc::now())? {
        println!("Logged:");
        display_entry(entry);
    }
    Ok(())
}

/// Search the product catalog.
fn cmd_search(catalog_path: &Path, query: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let products = search_products(&catalog, query)?;
    display_products(query, &products);
    Ok(())
}

/// Show logged entries, optionally for one day.
fn cmd_history(session: &AppSession, date: Option<NaiveDate>) -> Result<()> {
    let entries = session.log().filter_by_date(date);
    display_entries(&entries, date);
    if let Some(day) = date {
        display_daily_totals(day, &session.log().daily_totals(day));
    }
    Ok(())
}

/// Show or edit the dosing profile.
fn cmd_profile(session: &mut AppSession, action: ProfileAction) -> Result<()> {
    let update = match action {
        ProfileAction::Show => {
            display_profile(session.profile());
            return Ok(());
        }
        ProfileAction::Set {
            icr,
            isf,
            target,
            unit,
        } => ProfileUpdate {
            carb_ratio: icr,
            sensitivity_factor: isf,
            target_glucose: target,
            glucose_unit: unit,
        },
        ProfileAction::Edit => prompt_profile(session.profile())?,
    };

    if update.is_empty() {
        println!("Nothing to change. Use --icr, --isf, --target or --unit.");
        return Ok(());
    }

    let profile = session.update_profile(&update)?;
    display_profile(profile);
    println!("Profile saved.");
    Ok(())
}

/// Export entries to CSV.
fn cmd_export(session: &AppSession, output: &Path, date: Option<NaiveDate>) -> Result<()> {
    let entries = session.log().filter_by_date(date);
    export_entries(output, &entries)?;
    println!("Exported {} entries to {}", entries.len(), output.display());
    Ok(())
}

/// Compose a meal interactively and log it as one entry.
fn cmd_meal(session: &mut AppSession, catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;

    loop {
        display_meal(session.meal());

        match prompt_meal_action(!session.meal().is_empty())? {
            MealAction::SearchProduct => {
                let query = prompt_text("Product name")?;
                let products = match search_products(&catalog, &query) {
                    Ok(products) => products,
                    Err(e) => {
                        eprintln!("Search failed: {}", e);
                        continue;
                    }
                };
                if products.is_empty() {
                    display_products(&query, &products);
                    continue;
                }
                let Some(index) = select_product(&products)? else {
                    continue;
                };
                let product = &products[index];
                let amount = prompt_optional_number("Amount eaten (g/ml)")?;
                let quantity = product.quantity(amount.unwrap_or(0.0));
                if session
                    .add_portion_to_meal(&product.display_name(), &quantity)
                    .is_none()
                {
                    println!("Nothing added: the portion has no carbohydrates.");
                }
            }
            MealAction::EnterPortion => {
                let name = prompt_text("Food name (optional)")?;
                let carbs_per_unit = prompt_optional_number("Carbs per reference quantity (g)")?;
                let reference_unit = prompt_optional_number(&format!(
                    "Reference quantity (g/ml, blank for {})",
                    PRODUCT_REFERENCE_UNIT
                ))?
                .or(Some(PRODUCT_REFERENCE_UNIT));
                let amount = prompt_optional_number("Amount eaten (g/ml)")?;

                let quantity =
                    NutritionQuantity::from_inputs(carbs_per_unit, reference_unit, amount);
                if session.add_portion_to_meal(&name, &quantity).is_none() {
                    println!("Nothing added: the portion has no carbohydrates.");
                }
            }
            MealAction::EnterCarbs => {
                let name = prompt_text("Food name (optional)")?;
                let carbs = prompt_optional_number("Total carbs (g)")?.unwrap_or(0.0);
                if session.add_carbs_to_meal(&name, carbs).is_none() {
                    println!("Nothing added: enter more than 0 g of carbs.");
                }
            }
            MealAction::RemoveItem => {
                if let Some(id) = select_meal_item(session.meal().items())? {
                    session.remove_from_meal(id);
                }
            }
            MealAction::Commit => match session.commit_meal(Utc::now()) {
                Ok(entry) => {
                    println!("Logged:");
                    display_entry(entry);
                    return Ok(());
                }
                Err(DoseError::EmptyMeal) => println!("Nothing to log yet."),
                Err(e) => eprintln!("Could not log the meal, items kept: {}", e),
            },
            MealAction::Cancel => {
                let count = session.meal().len();
                if count == 0 || prompt_yes_no(&format!("Discard {} items?", count), false)? {
                    return Ok(());
                }
            }
        }
    }
}
