use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{DosingProfile, FoodEntry};

/// Store key holding the dosing profile.
pub const PROFILE_KEY: &str = "gluco_settings";

/// Store key holding the entry log.
pub const ENTRIES_KEY: &str = "gluco_entries";

/// Durable home of the profile and the entry log.
///
/// Each value is written in full on every change; there are no partial
/// updates. A missing value loads as `None` / empty.
pub trait PersistentStore {
    fn load_profile(&self) -> Result<Option<DosingProfile>>;

    fn save_profile(&self, profile: &DosingProfile) -> Result<()>;

    /// Entries in most-recent-first order.
    fn load_entries(&self) -> Result<Vec<FoodEntry>>;

    fn save_entries(&self, entries: &[FoodEntry]) -> Result<()>;
}

/// Read a JSON value from `path`. A missing file yields `None`.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write a JSON value to `path`, replacing its previous content.
///
/// The value is written to a sibling temp file first and renamed into place
/// so a crash never leaves a half-written file.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Store that keeps each key as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl PersistentStore for JsonFileStore {
    fn load_profile(&self) -> Result<Option<DosingProfile>> {
        load_json(self.key_path(PROFILE_KEY))
    }

    fn save_profile(&self, profile: &DosingProfile) -> Result<()> {
        save_json(self.key_path(PROFILE_KEY), profile)
    }

    fn load_entries(&self) -> Result<Vec<FoodEntry>> {
        let entries: Option<Vec<FoodEntry>> = load_json(self.key_path(ENTRIES_KEY))?;
        Ok(entries.unwrap_or_default())
    }

    fn save_entries(&self, entries: &[FoodEntry]) -> Result<()> {
        save_json(self.key_path(ENTRIES_KEY), entries)
    }
}

/// Store that keeps values in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profile: RefCell<Option<DosingProfile>>,
    entries: RefCell<Vec<FoodEntry>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing profile and log.
    pub fn with_state(profile: Option<DosingProfile>, entries: Vec<FoodEntry>) -> Self {
        Self {
            profile: RefCell::new(profile),
            entries: RefCell::new(entries),
            saves: RefCell::new(0),
        }
    }

    /// Number of save calls received so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl PersistentStore for MemoryStore {
    fn load_profile(&self) -> Result<Option<DosingProfile>> {
        Ok(*self.profile.borrow())
    }

    fn save_profile(&self, profile: &DosingProfile) -> Result<()> {
        *self.profile.borrow_mut() = Some(*profile);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn load_entries(&self) -> Result<Vec<FoodEntry>> {
        Ok(self.entries.borrow().clone())
    }

    fn save_entries(&self, entries: &[FoodEntry]) -> Result<()> {
        *self.entries.borrow_mut() = entries.to_vec();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlucoseUnit;
    use chrono::DateTime;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_files_load_as_first_run() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_profile().unwrap().is_none());
        assert!(store.load_entries().unwrap().is_empty());
    }

    #[test]
    fn test_profile_and_entries_persist() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        let profile = DosingProfile::new(12.0, 40.0, 110.0, GlucoseUnit::MgDl).unwrap();
        store.save_profile(&profile).unwrap();

        let ts = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let entries = vec![FoodEntry::new(ts, "Apple", 20.0, 1.7, Some(120.0), "1 apple").unwrap()];
        store.save_entries(&entries).unwrap();

        let reopened = JsonFileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.load_profile().unwrap(), Some(profile));
        assert_eq!(reopened.load_entries().unwrap(), entries);
        assert!(dir.path().join("nested").join("gluco_settings.json").exists());
        assert!(dir.path().join("nested").join("gluco_entries.json").exists());
    }

    #[test]
    fn test_load_existing_settings_record() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"icr": 8, "isf": 45, "targetBg": 95, "unit": "mg/dL"}"#)
            .unwrap();

        let profile: DosingProfile = load_json(file.path()).unwrap().unwrap();
        assert_eq!(profile.carb_ratio, 8.0);
        assert_eq!(profile.target_glucose, 95.0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        let loaded: Result<Option<DosingProfile>> = load_json(file.path());
        assert!(loaded.is_err());
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        store.save_profile(&DosingProfile::default()).unwrap();
        store.save_entries(&[]).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load_profile().unwrap(), Some(DosingProfile::default()));
    }
}
