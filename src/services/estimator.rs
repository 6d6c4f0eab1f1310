use crate::dosing::calculations::scale_by_portion;
use crate::dosing::constants::PRODUCT_REFERENCE_UNIT;
use crate::error::{DoseError, Result};
use crate::services::catalog::CsvProductCatalog;
use crate::services::{FoodEstimate, FoodInput, NutritionEstimator};

/// Serving assumed when a catalog row has no typical portion.
const DEFAULT_PORTION_G: f64 = 100.0;

/// Offline estimator that answers descriptions from the product catalog,
/// assuming the matched product's typical serving.
///
/// Photos need a vision-capable estimator and are refused.
#[derive(Debug, Clone)]
pub struct CatalogEstimator {
    catalog: CsvProductCatalog,
}

impl CatalogEstimator {
    pub fn new(catalog: CsvProductCatalog) -> Self {
        Self { catalog }
    }
}

impl NutritionEstimator for CatalogEstimator {
    fn estimate(&self, input: &FoodInput) -> Result<FoodEstimate> {
        let description = match input {
            FoodInput::Description(text) => text,
            FoodInput::Image { mime_type, .. } => {
                return Err(DoseError::UnsupportedInput(format!(
                    "catalog estimator cannot read images ({})",
                    mime_type
                )));
            }
        };

        let (product, score) = self.catalog.best(description).ok_or_else(|| {
            DoseError::InvalidInput(format!("no catalog match for '{}'", description.trim()))
        })?;

        let portion = product.typical_portion_g.unwrap_or(DEFAULT_PORTION_G);
        let carbs = scale_by_portion(product.carbs_per_100g, PRODUCT_REFERENCE_UNIT, portion);
        let matched = product.to_match();

        Ok(FoodEstimate {
            food_name: matched.display_name(),
            carbs_grams: carbs,
            portion_size: format!("{}g", portion),
            confidence: score,
            explanation: format!(
                "Catalog value {}g carbs per 100g at a standard portion of {}g",
                product.carbs_per_100g, portion
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::CatalogProduct;

    fn estimator() -> CatalogEstimator {
        CatalogEstimator::new(CsvProductCatalog::new(vec![
            CatalogProduct {
                name: "Oatmeal".to_string(),
                brand: None,
                carbs_per_100g: 12.0,
                typical_portion_g: Some(250.0),
            },
            CatalogProduct {
                name: "Crackers".to_string(),
                brand: Some("Crunch".to_string()),
                carbs_per_100g: 70.0,
                typical_portion_g: None,
            },
        ]))
    }

    #[test]
    fn test_estimates_typical_portion() {
        let est = estimator()
            .estimate(&FoodInput::Description("oatmeal".to_string()))
            .unwrap();
        assert_eq!(est.food_name, "Oatmeal");
        assert!((est.carbs_grams - 30.0).abs() < 1e-9);
        assert_eq!(est.portion_size, "250g");
        assert!(est.explanation.contains("250g"));
    }

    #[test]
    fn test_default_portion_and_brand() {
        let est = estimator()
            .estimate(&FoodInput::Description("crackers".to_string()))
            .unwrap();
        assert_eq!(est.food_name, "Crunch Crackers");
        assert!((est.carbs_grams - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_is_unsupported() {
        let input = FoodInput::Image {
            data: vec![0xff, 0xd8],
            mime_type: "image/jpeg".to_string(),
        };
        assert!(matches!(
            estimator().estimate(&input),
            Err(DoseError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_unknown_food() {
        let result = estimator().estimate(&FoodInput::Description("xyzzy".to_string()));
        assert!(matches!(result, Err(DoseError::InvalidInput(_))));
    }
}
