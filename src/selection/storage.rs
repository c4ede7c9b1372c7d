//! Key-value store for remembering the committed selection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use crate::core::utility::{get_file_path, load_json, save_json};

/// Committed buy currency
pub const FROM_CURRENCY_KEY: &str = "fromCurrency";
/// Committed sell currency
pub const TO_CURRENCY_KEY: &str = "toCurrency";
/// Backend instance the stored selection belongs to
pub const SERVER_INSTANCE_KEY: &str = "serverInstanceId";
/// Recently committed pairs
pub const HISTORY_KEY: &str = "currencyPairHistory";

/// Selection filename
const SELECTION_FILENAME: &str = "selection.json";

/// String key-value store.
pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);
}

/// In-memory store, lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}

/// Store persisted as a JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct JsonFileSelectionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl JsonFileSelectionStore {
    /// Open the store at `path`, starting empty if the file is missing or malformed
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values: HashMap<String, String> = load_json(&path).unwrap_or_default();
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    /// Open the store in the data directory
    pub fn open_default() -> Self {
        Self::open(get_file_path(SELECTION_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &HashMap<String, String>) {
        if let Err(e) = save_json(&self.path, values) {
            warn!(path = %self.path.display(), error = %e, "failed to persist selection");
        }
    }
}

impl SelectionStore for JsonFileSelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
            self.flush(&values);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            if values.remove(key).is_some() {
                self.flush(&values);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemorySelectionStore::new();
        assert_eq!(store.get(FROM_CURRENCY_KEY), None);
        store.set(FROM_CURRENCY_KEY, "USD");
        assert_eq!(store.get(FROM_CURRENCY_KEY).as_deref(), Some("USD"));
        store.remove(FROM_CURRENCY_KEY);
        assert_eq!(store.get(FROM_CURRENCY_KEY), None);
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");

        let store = JsonFileSelectionStore::open(&path);
        store.set(FROM_CURRENCY_KEY, "GBP");
        store.set(TO_CURRENCY_KEY, "JPY");
        store.remove(TO_CURRENCY_KEY);

        let reopened = JsonFileSelectionStore::open(&path);
        assert_eq!(reopened.get(FROM_CURRENCY_KEY).as_deref(), Some("GBP"));
        assert_eq!(reopened.get(TO_CURRENCY_KEY), None);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_json_store_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileSelectionStore::open(&path);
        assert_eq!(store.get(FROM_CURRENCY_KEY), None);
    }
}
