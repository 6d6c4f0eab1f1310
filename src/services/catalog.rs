use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::dosing::constants::{FUZZY_MATCH_THRESHOLD, MAX_PRODUCT_MATCHES, MIN_QUERY_LEN};
use crate::error::Result;
use crate::services::{ProductCatalog, ProductMatch};

/// A row of the product catalog CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub name: String,

    #[serde(default)]
    pub brand: Option<String>,

    pub carbs_per_100g: f64,

    /// Standard serving, used when estimating from a description.
    #[serde(default)]
    pub typical_portion_g: Option<f64>,
}

impl CatalogProduct {
    pub fn to_match(&self) -> ProductMatch {
        ProductMatch {
            name: self.name.clone(),
            carbs_per_100g: self.carbs_per_100g,
            brand: self.brand.clone().filter(|b| !b.trim().is_empty()),
        }
    }

    /// Lowercased "<brand> <name>" used for matching.
    fn search_text(&self) -> String {
        match &self.brand {
            Some(brand) if !brand.trim().is_empty() => {
                format!("{} {}", brand.trim(), self.name).to_lowercase()
            }
            _ => self.name.to_lowercase(),
        }
    }
}

/// Product catalog read from a CSV file with the header
/// `name,brand,carbs_per_100g,typical_portion_g`.
#[derive(Debug, Clone, Default)]
pub struct CsvProductCatalog {
    products: Vec<CatalogProduct>,
}

impl CsvProductCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(rdr))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut products = Vec::new();
        for record in reader.deserialize() {
            let product: CatalogProduct = record?;
            products.push(product);
        }
        tracing::debug!(count = products.len(), "loaded product catalog");
        Ok(Self { products })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products ranked by similarity to `query`, best first, with scores.
    ///
    /// Substring hits score 1.0; everything else uses Jaro-Winkler
    /// similarity and must reach the fuzzy threshold.
    pub fn ranked(&self, query: &str) -> Vec<(&CatalogProduct, f64)> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let mut candidates: Vec<(&CatalogProduct, f64)> = self
            .products
            .iter()
            .map(|p| {
                let text = p.search_text();
                let score = if text.contains(&query) {
                    1.0
                } else {
                    jaro_winkler(&text, &query).max(jaro_winkler(&p.name.to_lowercase(), &query))
                };
                (p, score)
            })
            .filter(|(_, score)| *score > FUZZY_MATCH_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        candidates
    }

    /// Single best match for `query`, if any.
    pub fn best(&self, query: &str) -> Option<(&CatalogProduct, f64)> {
        self.ranked(query).into_iter().next()
    }
}

impl ProductCatalog for CsvProductCatalog {
    fn search(&self, query: &str) -> Result<Vec<ProductMatch>> {
        Ok(self
            .ranked(query)
            .into_iter()
            .take(MAX_PRODUCT_MATCHES)
            .map(|(p, _)| p.to_match())
            .collect())
    }
}
