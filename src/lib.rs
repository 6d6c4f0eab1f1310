pub mod cli;
pub mod config;
pub mod dosing;
pub mod error;
pub mod interface;
pub mod models;
pub mod services;
pub mod state;

pub use error::{DoseError, Result};
pub use models::{DosingProfile, FoodEntry, MealLineItem, NutritionQuantity};
pub use state::{FoodEntryLog, MealBuilder, Session};
