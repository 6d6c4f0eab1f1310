use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::models::GlucoseUnit;

/// Gluco: turn meals and glucose readings into insulin dose recommendations.
///
/// A calculator, not medical advice: always verify doses with your care team.
#[derive(Parser, Debug)]
#[command(name = "gluco")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the profile and entry log.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Extra configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Compose a meal from several foods and log it as one entry.
    #[default]
    Meal,

    /// Show the dose for a carbohydrate amount.
    Dose {
        /// Carbohydrates in grams.
        #[arg(long)]
        carbs: f64,

        /// Current blood glucose.
        #[arg(long)]
        bg: Option<f64>,
    },

    /// Quote a measured portion, optionally logging it directly.
    Quick {
        /// Food name.
        #[arg(long, default_value = "")]
        name: String,

        /// Carbohydrate grams per reference quantity.
        #[arg(long)]
        carbs_per_unit: Option<f64>,

        /// Reference quantity the carbs are given for.
        #[arg(long, default_value = "100")]
        reference_unit: f64,

        /// Quantity eaten.
        #[arg(long)]
        amount: Option<f64>,

        /// Current blood glucose.
        #[arg(long)]
        bg: Option<f64>,

        /// Log the portion as its own entry.
        #[arg(long)]
        log: bool,
    },

    /// Estimate the carbohydrates of a described food and log it.
    Estimate {
        /// What you are going to eat.
        description: String,

        /// Current blood glucose.
        #[arg(long)]
        bg: Option<f64>,

        /// Log without asking for confirmation.
        #[arg(long, short)]
        yes: bool,
    },

    /// Search the product catalog.
    Search {
        /// Product name.
        query: String,
    },

    /// Show logged entries.
    History {
        /// Only entries on this date (YYYY-MM-DD).
        #[arg(long, conflicts_with = "today")]
        date: Option<NaiveDate>,

        /// Only today's entries.
        #[arg(long)]
        today: bool,
    },

    /// Show or edit the dosing profile.
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Write logged entries to a CSV file.
    Export {
        /// Output path.
        #[arg(long, short)]
        output: PathBuf,

        /// Only entries on this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Print the current profile.
    Show,

    /// Change profile values; unset values are kept.
    Set {
        /// Carb ratio: grams covered by one unit.
        #[arg(long)]
        icr: Option<f64>,

        /// Sensitivity factor: glucose drop per unit.
        #[arg(long)]
        isf: Option<f64>,

        /// Target blood glucose.
        #[arg(long)]
        target: Option<f64>,

        /// Glucose unit (mg/dL or mmol/L).
        #[arg(long)]
        unit: Option<GlucoseUnit>,
    },

    /// Edit the profile interactively.
    Edit,
}
