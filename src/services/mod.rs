//! Collaborators that supply raw nutrition figures.
//!
//! Estimation and product lookup sit behind traits so a local table, a
//! remote service, or a test double can stand in. Every figure coming back
//! is checked here before it reaches the calculator or a meal.

pub mod catalog;
pub mod estimator;
pub mod pending;

use crate::dosing::constants::{MAX_PRODUCT_MATCHES, PRODUCT_REFERENCE_UNIT};
use crate::error::{DoseError, Result};
use crate::models::NutritionQuantity;

pub use catalog::{CatalogProduct, CsvProductCatalog};
pub use estimator::CatalogEstimator;
pub use pending::{PendingResult, RequestToken};

/// What to estimate: a free-text description or a photo.
#[derive(Debug, Clone, PartialEq)]
pub enum FoodInput {
    Description(String),
    Image { data: Vec<u8>, mime_type: String },
}

/// Raw answer from a [`NutritionEstimator`].
#[derive(Debug, Clone, PartialEq)]
pub struct FoodEstimate {
    pub food_name: String,
    /// Total carbs for the described portion, not per unit.
    pub carbs_grams: f64,
    pub portion_size: String,
    /// 0 to 1.
    pub confidence: f64,
    pub explanation: String,
}

/// An estimate whose figures passed boundary checks.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedFood {
    pub food_name: String,
    pub carbs: f64,
    pub explanation: String,
}

/// A candidate product from a [`ProductCatalog`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMatch {
    pub name: String,
    pub carbs_per_100g: f64,
    pub brand: Option<String>,
}

impl ProductMatch {
    /// "<brand> <name>" when a brand is known, else the name.
    pub fn display_name(&self) -> String {
        match self.brand.as_deref().map(str::trim) {
            Some(brand) if !brand.is_empty() => format!("{} {}", brand, self.name),
            _ => self.name.clone(),
        }
    }

    /// Portion of this product, with its figure taken per 100 g/ml.
    pub fn quantity(&self, amount_consumed: f64) -> NutritionQuantity {
        NutritionQuantity {
            carbs_per_unit: self.carbs_per_100g,
            reference_unit: PRODUCT_REFERENCE_UNIT,
            amount_consumed,
        }
    }
}

/// Estimates the carbs of a described or photographed food.
pub trait NutritionEstimator {
    fn estimate(&self, input: &FoodInput) -> Result<FoodEstimate>;
}

/// Looks up products by name, best match first.
pub trait ProductCatalog {
    fn search(&self, query: &str) -> Result<Vec<ProductMatch>>;
}

fn check_carbs(value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DoseError::InvalidNutrition(format!(
            "carbohydrate value must be a non-negative number, got {}",
            value
        )))
    }
}

/// Accept an estimate only if its carb figure is a non-negative number.
pub fn validate_estimate(estimate: FoodEstimate) -> Result<EstimatedFood> {
    let carbs = check_carbs(estimate.carbs_grams)?;
    Ok(EstimatedFood {
        food_name: estimate.food_name.trim().to_string(),
        carbs,
        explanation: estimate.explanation,
    })
}

/// Drop candidates with unusable figures and cap the list length.
pub fn validate_products(products: Vec<ProductMatch>) -> Vec<ProductMatch> {
    products
        .into_iter()
        .filter(|p| match check_carbs(p.carbs_per_100g) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(product = %p.name, error = %e, "dropping catalog candidate");
                false
            }
        })
        .take(MAX_PRODUCT_MATCHES)
        .collect()
}

/// Run an estimator and validate its answer.
pub fn estimate_food<E: NutritionEstimator + ?Sized>(
    estimator: &E,
    input: &FoodInput,
) -> Result<EstimatedFood> {
    let estimate = estimator.estimate(input)?;
    tracing::debug!(
        food = %estimate.food_name,
        carbs = estimate.carbs_grams,
        confidence = estimate.confidence,
        "received estimate"
    );
    validate_estimate(estimate)
}

/// Run a catalog search and validate the candidates.
pub fn search_products<C: ProductCatalog + ?Sized>(
    catalog: &C,
    query: &str,
) -> Result<Vec<ProductMatch>> {
    Ok(validate_products(catalog.search(query)?))
}
