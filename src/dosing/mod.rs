pub mod calculations;
pub mod constants;

pub use calculations::{
    carb_dose, correction_dose, dose_breakdown, quote_portion, round1, scale_by_portion,
    total_dose, DoseBreakdown, PortionQuote,
};
pub use constants::*;
