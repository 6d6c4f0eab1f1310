pub mod export;
pub mod prompts;
pub mod render;

pub use export::{export_entries, write_entries_csv};
pub use prompts::{
    parse_optional_number, prompt_current_glucose, prompt_meal_action, prompt_optional_number,
    prompt_profile, prompt_text, prompt_yes_no, select_meal_item, select_product, MealAction,
};
pub use render::{
    display_daily_totals, display_dose, display_entries, display_entry, display_meal,
    display_products, display_profile, display_quote,
};
