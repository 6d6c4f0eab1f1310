use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::dosing::calculations::round1;
use crate::models::FoodEntry;

/// Committed entries, most recent first.
///
/// Entries are never reordered or changed; `append` is the only mutator.
#[derive(Debug, Default, Clone)]
pub struct FoodEntryLog {
    entries: Vec<FoodEntry>,
}

/// Totals for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    pub entries: usize,
    /// Grams, rounded to one decimal.
    pub carbs: f64,
    /// Units, rounded to one decimal.
    pub insulin: f64,
}

impl FoodEntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a log as loaded at startup, already in most-recent-first order.
    pub fn from_entries(entries: Vec<FoodEntry>) -> Self {
        Self { entries }
    }

    /// Insert at the head of the log.
    pub fn append(&mut self, entry: FoodEntry) {
        tracing::debug!(id = %entry.id, food = %entry.food_name, "appending log entry");
        self.entries.insert(0, entry);
    }

    /// Timestamp for the next entry: `now`, or 1 ms after the newest entry
    /// when `now` is not strictly later. Keeps entry ids unique and sorted.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.latest() {
            Some(latest) if now <= latest.timestamp => latest.timestamp + Duration::milliseconds(1),
            _ => now,
        }
    }

    /// Entries on `date` in the local time zone, or every entry when `date`
    /// is `None`.
    pub fn filter_by_date(&self, date: Option<NaiveDate>) -> Vec<&FoodEntry> {
        self.filter_by_date_in(date, &Local)
    }

    /// Entries whose calendar date in `tz` equals `date`. Matching is by
    /// calendar day, not by a 24-hour window.
    pub fn filter_by_date_in<Tz: TimeZone>(
        &self,
        date: Option<NaiveDate>,
        tz: &Tz,
    ) -> Vec<&FoodEntry> {
        match date {
            None => self.entries.iter().collect(),
            Some(day) => self
                .entries
                .iter()
                .filter(|entry| entry.local_date(tz) == day)
                .collect(),
        }
    }

    /// Entry count and summed carbs/insulin for a local calendar day.
    pub fn daily_totals(&self, date: NaiveDate) -> DailyTotals {
        self.daily_totals_in(date, &Local)
    }

    pub fn daily_totals_in<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> DailyTotals {
        let day = self.filter_by_date_in(Some(date), tz);
        let carbs: f64 = day.iter().map(|e| e.carbs).sum();
        let insulin: f64 = day.iter().map(|e| e.calculated_insulin).sum();
        DailyTotals {
            entries: day.len(),
            carbs: round1(carbs),
            insulin: round1(insulin),
        }
    }

    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&FoodEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
