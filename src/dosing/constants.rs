/// Default carb ratio: grams of carbohydrate covered by one unit.
pub const DEFAULT_CARB_RATIO: f64 = 10.0;

/// Default sensitivity factor: glucose drop per unit.
pub const DEFAULT_SENSITIVITY_FACTOR: f64 = 50.0;

/// Default target glucose (mg/dL).
pub const DEFAULT_TARGET_GLUCOSE: f64 = 100.0;

/// Reference quantity used by product catalog figures (per 100 g/ml).
pub const PRODUCT_REFERENCE_UNIT: f64 = 100.0;

/// Substitute for a blank or zero reference unit.
pub const FALLBACK_REFERENCE_UNIT: f64 = 1.0;

/// Maximum number of product candidates surfaced per search.
pub const MAX_PRODUCT_MATCHES: usize = 5;

/// Shortest query sent to a product catalog.
pub const MIN_QUERY_LEN: usize = 2;

/// Minimum Jaro-Winkler similarity for a fuzzy product match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Name used for a meal line item added without a name.
pub const UNNAMED_ITEM: &str = "Unknown item";

/// Name used for a directly logged entry without a name.
pub const MANUAL_ENTRY_NAME: &str = "Manual entry";

/// Separator between constituent names of a composite meal.
pub const MEAL_NAME_SEPARATOR: &str = ", ";
