mod entry_log;
mod meal_builder;
mod persistence;
mod session;

pub use entry_log::{DailyTotals, FoodEntryLog};
pub use meal_builder::MealBuilder;
pub use persistence::{
    load_json, save_json, JsonFileStore, MemoryStore, PersistentStore, ENTRIES_KEY, PROFILE_KEY,
};
pub use session::Session;
