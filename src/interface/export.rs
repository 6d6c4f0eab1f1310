use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::FoodEntry;

#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    timestamp: String,
    food_name: &'a str,
    carbs: f64,
    current_bg: Option<f64>,
    calculated_insulin: f64,
    portion_description: &'a str,
}

impl<'a> From<&'a FoodEntry> for EntryRow<'a> {
    fn from(entry: &'a FoodEntry) -> Self {
        Self {
            timestamp: entry.timestamp.to_rfc3339(),
            food_name: &entry.food_name,
            carbs: entry.carbs,
            current_bg: entry.current_bg,
            calculated_insulin: entry.calculated_insulin,
            portion_description: &entry.portion_description,
        }
    }
}

/// Write entries as CSV, one row per entry, with a header row.
pub fn write_entries_csv<W: Write>(writer: W, entries: &[&FoodEntry]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in entries {
        csv.serialize(EntryRow::from(*entry))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write entries to a CSV file at `path`.
pub fn export_entries<P: AsRef<Path>>(path: P, entries: &[&FoodEntry]) -> Result<()> {
    let file = File::create(path)?;
    write_entries_csv(file, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_csv_rows() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let a = FoodEntry::new(ts, "Bread, Jam", 45.0, 4.5, None, "Composite meal (2 items)")
            .unwrap();
        let b = FoodEntry::new(ts, "Apple", 20.0, 2.4, Some(150.0), "1 apple").unwrap();

        let mut out = Vec::new();
        write_entries_csv(&mut out, &[&a, &b]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "timestamp,food_name,carbs,current_bg,calculated_insulin,portion_description"
        );
        assert_eq!(
            lines[1],
            "2023-11-14T22:13:20+00:00,\"Bread, Jam\",45.0,,4.5,Composite meal (2 items)"
        );
        assert_eq!(lines[2], "2023-11-14T22:13:20+00:00,Apple,20.0,150.0,2.4,1 apple");
    }
}
