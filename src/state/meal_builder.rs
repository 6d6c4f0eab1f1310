use chrono::{DateTime, Utc};

use crate::dosing::calculations::round1;
use crate::dosing::constants::{MEAL_NAME_SEPARATOR, UNNAMED_ITEM};
use crate::error::{DoseError, Result};
use crate::models::{FoodEntry, MealLineItem};

/// Accumulates the items of a composite meal until it is committed.
#[derive(Debug, Default)]
pub struct MealBuilder {
    /// Items in insertion order.
    items: Vec<MealLineItem>,
    next_id: u64,
}

impl MealBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and return its id.
    ///
    /// Items with no carbs are rejected and `None` is returned. An empty
    /// name is replaced by a placeholder.
    pub fn add_item(&mut self, name: &str, carbs: f64, insulin: f64) -> Option<u64> {
        if carbs.is_nan() || carbs <= 0.0 {
            tracing::debug!(carbs, "ignoring meal item without carbs");
            return None;
        }

        let name = name.trim();
        let name = if name.is_empty() { UNNAMED_ITEM } else { name };

        self.next_id += 1;
        let id = self.next_id;
        self.items.push(MealLineItem {
            id,
            name: name.to_string(),
            carbs,
            insulin,
        });
        tracing::debug!(id, name, carbs, insulin, "added meal item");
        Some(id)
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn remove_item(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Summed carbs and insulin of the current items, not rounded again.
    pub fn totals(&self) -> (f64, f64) {
        self.items
            .iter()
            .fold((0.0, 0.0), |(carbs, insulin), item| {
                (carbs + item.carbs, insulin + item.insulin)
            })
    }

    /// Turn the current items into one log entry stamped at `timestamp` and
    /// clear the builder.
    ///
    /// Fails with [`DoseError::EmptyMeal`] when there is nothing to commit;
    /// the builder is left untouched in that case.
    pub fn commit(&mut self, timestamp: DateTime<Utc>) -> Result<FoodEntry> {
        let entry = self.to_entry(timestamp)?;
        self.clear();
        Ok(entry)
    }

    /// The entry `commit` would produce, without clearing the items.
    pub fn to_entry(&self, timestamp: DateTime<Utc>) -> Result<FoodEntry> {
        if self.items.is_empty() {
            return Err(DoseError::EmptyMeal);
        }

        let (carbs, insulin) = self.totals();
        let food_name = self
            .items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(MEAL_NAME_SEPARATOR);
        let description = format!("Composite meal ({} items)", self.items.len());

        FoodEntry::new(
            timestamp,
            food_name,
            round1(carbs),
            round1(insulin),
            None,
            description,
        )
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[MealLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
