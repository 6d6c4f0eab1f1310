use chrono::{DateTime, Utc};

use crate::dosing::calculations::{
    dose_breakdown, quote_portion, total_dose, DoseBreakdown, PortionQuote,
};
use crate::dosing::constants::MANUAL_ENTRY_NAME;
use crate::error::{DoseError, Result};
use crate::models::{DosingProfile, FoodEntry, NutritionQuantity, ProfileUpdate};
use crate::services::{EstimatedFood, PendingResult, RequestToken};
use crate::state::entry_log::FoodEntryLog;
use crate::state::meal_builder::MealBuilder;
use crate::state::persistence::PersistentStore;

/// One user's working state: profile, log, the meal being composed and any
/// pending estimate. Every committed change is written through `store`.
pub struct Session<S: PersistentStore> {
    store: S,
    profile: DosingProfile,
    log: FoodEntryLog,
    meal: MealBuilder,
    estimate: PendingResult<EstimatedFood>,
}

impl<S: PersistentStore> Session<S> {
    /// Load the profile and log from `store`.
    ///
    /// A missing profile means first run and the defaults are used. A stored
    /// profile that fails validation is rejected the same way rather than
    /// used for dosing. Stored entries with negative or non-finite figures
    /// are skipped.
    pub fn open(store: S) -> Result<Self> {
        let profile = match store.load_profile()? {
            Some(profile) => match profile.validate() {
                Ok(()) => profile,
                Err(e) => {
                    tracing::warn!(error = %e, "stored profile is invalid, using defaults");
                    DosingProfile::default()
                }
            },
            None => {
                tracing::info!("no stored profile, using defaults");
                DosingProfile::default()
            }
        };

        let mut entries = store.load_entries()?;
        let loaded = entries.len();
        entries.retain(FoodEntry::is_valid);
        if entries.len() < loaded {
            tracing::warn!(
                dropped = loaded - entries.len(),
                "ignoring stored entries with invalid figures"
            );
        }
        tracing::debug!(entries = entries.len(), "loaded entry log");

        Ok(Self {
            store,
            profile,
            log: FoodEntryLog::from_entries(entries),
            meal: MealBuilder::new(),
            estimate: PendingResult::new(),
        })
    }

    pub fn profile(&self) -> &DosingProfile {
        &self.profile
    }

    pub fn log(&self) -> &FoodEntryLog {
        &self.log
    }

    pub fn meal(&self) -> &MealBuilder {
        &self.meal
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the profile. Invalid profiles are rejected and nothing is
    /// saved.
    pub fn set_profile(&mut self, profile: DosingProfile) -> Result<()> {
        profile.validate()?;
        self.store.save_profile(&profile)?;
        tracing::info!(
            icr = profile.carb_ratio,
            isf = profile.sensitivity_factor,
            target = profile.target_glucose,
            "profile saved"
        );
        self.profile = profile;
        Ok(())
    }

    /// Apply a partial edit to the profile.
    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<&DosingProfile> {
        let edited = update.apply(&self.profile)?;
        self.set_profile(edited)?;
        Ok(&self.profile)
    }

    /// Dose breakdown for a carb amount under the current profile.
    pub fn dose(&self, carbs: f64, current_glucose: Option<f64>) -> DoseBreakdown {
        dose_breakdown(carbs, current_glucose, &self.profile)
    }

    /// Carbs and dose for a measured portion under the current profile.
    pub fn quote(&self, quantity: &NutritionQuantity, current_glucose: Option<f64>) -> PortionQuote {
        quote_portion(quantity, current_glucose, &self.profile)
    }

    /// Prepend `entry` to the log and persist the full log.
    ///
    /// The in-memory log only changes once the store accepted the new
    /// snapshot.
    pub fn append_entry(&mut self, entry: FoodEntry) -> Result<&FoodEntry> {
        self.store_entry(entry)?;
        Ok(&self.log.entries()[0])
    }

    fn store_entry(&mut self, entry: FoodEntry) -> Result<()> {
        let mut snapshot = Vec::with_capacity(self.log.len() + 1);
        snapshot.push(entry.clone());
        snapshot.extend_from_slice(self.log.entries());
        self.store.save_entries(&snapshot)?;

        self.log.append(entry);
        tracing::info!(entries = self.log.len(), "entry logged");
        Ok(())
    }

    /// Log a measured portion directly as its own entry.
    ///
    /// Portions without carbs are not logged.
    pub fn log_portion(
        &mut self,
        name: &str,
        quantity: &NutritionQuantity,
        current_glucose: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<&FoodEntry> {
        quantity.validate()?;
        let quote = self.quote(quantity, current_glucose);
        if quote.carbs <= 0.0 {
            return Err(DoseError::InvalidInput(
                "portion has no carbohydrates to log".to_string(),
            ));
        }
        let name = name.trim();
        let name = if name.is_empty() { MANUAL_ENTRY_NAME } else { name };
        let entry = FoodEntry::new(
            self.log.next_timestamp(now),
            name,
            quote.carbs,
            quote.insulin,
            current_glucose,
            quantity.describe(),
        )?;
        self.append_entry(entry)
    }

    /// Quote a portion without glucose correction and add it to the meal.
    ///
    /// Correction is a property of the whole meal, so items only carry their
    /// carb dose. Returns the new item id, or `None` for a portion without
    /// carbs.
    pub fn add_portion_to_meal(&mut self, name: &str, quantity: &NutritionQuantity) -> Option<u64> {
        let quote = self.quote(quantity, None);
        self.meal.add_item(name, quote.carbs, quote.insulin)
    }

    /// Add an item whose carbs are already known.
    pub fn add_carbs_to_meal(&mut self, name: &str, carbs: f64) -> Option<u64> {
        let insulin = total_dose(carbs, None, &self.profile);
        self.meal.add_item(name, carbs, insulin)
    }

    pub fn remove_from_meal(&mut self, id: u64) -> bool {
        self.meal.remove_item(id)
    }

    /// Commit the meal as one entry and persist the log.
    ///
    /// An empty meal yields [`DoseError::EmptyMeal`] and changes nothing.
    /// The items are kept when the store write fails.
    pub fn commit_meal(&mut self, now: DateTime<Utc>) -> Result<&FoodEntry> {
        let at = self.log.next_timestamp(now);
        let entry = self.meal.to_entry(at)?;
        tracing::info!(food = %entry.food_name, carbs = entry.carbs, "meal committed");
        self.store_entry(entry)?;
        self.meal.clear();
        Ok(&self.log.entries()[0])
    }

    /// Start an estimation request; earlier outstanding requests are
    /// superseded.
    pub fn begin_estimate(&mut self) -> RequestToken {
        self.estimate.begin()
    }

    /// Deliver an estimate. Returns false if the request was superseded or
    /// discarded.
    pub fn receive_estimate(&mut self, token: RequestToken, estimate: EstimatedFood) -> bool {
        self.estimate.resolve(token, estimate)
    }

    pub fn pending_estimate(&self) -> Option<&EstimatedFood> {
        self.estimate.peek()
    }

    pub fn discard_estimate(&mut self) {
        self.estimate.discard();
    }

    /// Log the pending estimate with an optional glucose reading.
    ///
    /// Returns `Ok(None)` when there is no estimate to log.
    pub fn confirm_estimate(
        &mut self,
        current_glucose: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Option<&FoodEntry>> {
        let Some(estimate) = self.estimate.peek().cloned() else {
            return Ok(None);
        };
        let dose = total_dose(estimate.carbs, current_glucose, &self.profile);
        let entry = FoodEntry::new(
            self.log.next_timestamp(now),
            estimate.food_name,
            estimate.carbs,
            dose,
            current_glucose,
            estimate.explanation,
        )?;
        self.store_entry(entry)?;
        self.estimate.take();
        Ok(self.log.latest())
    }
}
