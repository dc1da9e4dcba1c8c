use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unsupported data format version {0}")]
    UnsupportedVersion(u32),
    #[error("data directory not found")]
    NoDataDir,
}

/// Where the authoritative set of marked dates lives.
///
/// `Ok(None)` from [`load_marked_dates`](Self::load_marked_dates) means
/// nothing has been saved yet, i.e. a new user.
pub trait MarkedDatesStore {
    fn load_marked_dates(&self) -> Result<Option<BTreeSet<NaiveDate>>, StorageError>;
    fn save_marked_dates(&self, dates: &BTreeSet<NaiveDate>) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct DataFile {
    version: u32,
    period_dates: BTreeSet<NaiveDate>,
}

/// Marked dates stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_local_dir>/periodical/cycles.json`.
    pub fn at_default_location() -> Result<Self, StorageError> {
        Ok(Self::new(default_data_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete all data permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "wiped marked dates");
        }
        Ok(())
    }
}

pub fn default_data_file() -> Result<PathBuf, StorageError> {
    let dir = dirs::data_local_dir()
        .ok_or(StorageError::NoDataDir)?
        .join("periodical");
    Ok(dir.join("cycles.json"))
}

impl MarkedDatesStore for JsonFileStore {
    fn load_marked_dates(&self) -> Result<Option<BTreeSet<NaiveDate>>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved marked dates");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let data: DataFile = serde_json::from_slice(&bytes)?;
        if data.version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(data.version));
        }
        tracing::debug!(count = data.period_dates.len(), "loaded marked dates");
        Ok(Some(data.period_dates))
    }

    fn save_marked_dates(&self, dates: &BTreeSet<NaiveDate>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = DataFile {
            version: FORMAT_VERSION,
            period_dates: dates.clone(),
        };
        let json = serde_json::to_vec_pretty(&data)?;
        fs::write(&self.path, json)?;
        tracing::debug!(count = dates.len(), path = %self.path.display(), "saved marked dates");
        Ok(())
    }
}

/// Store kept in memory, for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dates: RefCell<Option<BTreeSet<NaiveDate>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(dates: BTreeSet<NaiveDate>) -> Self {
        Self {
            dates: RefCell::new(Some(dates)),
        }
    }
}

impl MarkedDatesStore for MemoryStore {
    fn load_marked_dates(&self) -> Result<Option<BTreeSet<NaiveDate>>, StorageError> {
        Ok(self.dates.borrow().clone())
    }

    fn save_marked_dates(&self, dates: &BTreeSet<NaiveDate>) -> Result<(), StorageError> {
        *self.dates.borrow_mut() = Some(dates.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn missing_file_is_new_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cycles.json"));
        assert!(store.load_marked_dates().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("cycles.json"));
        let dates = BTreeSet::from([d("2024-01-02"), d("2024-01-01")]);

        store.save_marked_dates(&dates).unwrap();
        assert_eq!(store.load_marked_dates().unwrap(), Some(dates));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"2024-01-01\""));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycles.json");
        fs::write(&path, r#"{"version": 7, "period_dates": []}"#).unwrap();

        let result = JsonFileStore::new(&path).load_marked_dates();
        assert!(matches!(result, Err(StorageError::UnsupportedVersion(7))));
    }

    #[test]
    fn corrupted_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycles.json");
        fs::write(&path, b"not json").unwrap();

        let result = JsonFileStore::new(&path).load_marked_dates();
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn wipe_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cycles.json"));
        store.save_marked_dates(&BTreeSet::from([d("2024-01-01")])).unwrap();

        store.wipe().unwrap();
        assert!(store.load_marked_dates().unwrap().is_none());
        store.wipe().unwrap();
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load_marked_dates().unwrap().is_none());

        let dates = BTreeSet::from([d("2024-01-01")]);
        store.save_marked_dates(&dates).unwrap();
        assert_eq!(store.load_marked_dates().unwrap(), Some(dates));
    }
}
