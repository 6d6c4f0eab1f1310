pub mod entry;
pub mod meal;
pub mod profile;

pub use entry::FoodEntry;
pub use meal::{MealLineItem, NutritionQuantity};
pub use profile::{DosingProfile, GlucoseUnit, ProfileUpdate};
