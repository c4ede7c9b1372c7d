//! Global settings of the dashboard.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use super::utility::{get_file_path, load_json};

/// Setting filename
const SETTING_FILENAME: &str = "dashboard_setting.json";

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Backend settings
    settings.insert(
        "api.base_url".to_string(),
        SettingValue::String("http://127.0.0.1:5000".to_string()),
    );
    settings.insert("api.timeout_secs".to_string(), SettingValue::Int(30));

    // Cache and load settings
    settings.insert("cache.max_pairs".to_string(), SettingValue::Int(5));
    settings.insert("cooldown.window_ms".to_string(), SettingValue::Int(30_000));
    settings.insert("chart.timeout_ms".to_string(), SettingValue::Int(45_000));
    settings.insert("chart.default_period".to_string(), SettingValue::Int(7));
    settings.insert("swap.debounce_ms".to_string(), SettingValue::Int(100));
    settings.insert("feed.reconnect_secs".to_string(), SettingValue::Int(5));
    settings.insert("history.max_items".to_string(), SettingValue::Int(20));

    // Currency settings
    for (key, code) in [("currency.default_from", "TWD"), ("currency.default_to", "HKD")] {
        settings.insert(key.to_string(), SettingValue::String(code.to_string()));
    }

    // Log settings
    settings.insert("log.level".to_string(), SettingValue::String("info".to_string()));
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(true));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Global settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Create new Settings with defaults, overridden by the settings file if present
    pub fn new() -> Self {
        Self::from_file(&get_file_path(SETTING_FILENAME))
    }

    /// Settings holding only the built-in defaults
    pub fn defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Defaults overridden by the given file
    pub fn from_file(path: &Path) -> Self {
        let settings = Self::defaults();
        if let Some(file_settings) = load_json::<HashMap<String, SettingValue>>(path) {
            settings.update(file_settings);
        }
        settings
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Update settings from a map
    pub fn update(&self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(mut settings) = self.settings.write() {
            for (key, value) in new_settings {
                settings.insert(key, value);
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_value_types() {
        let s = SettingValue::String("test".to_string());
        assert_eq!(s.as_str(), Some("test"));

        let i = SettingValue::Int(42);
        assert_eq!(i.as_int(), Some(42));
        assert_eq!(i.as_str(), None);

        let b = SettingValue::Bool(true);
        assert_eq!(b.as_bool(), Some(true));
        assert_eq!(b.as_int(), None);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::defaults();
        assert_eq!(settings.get_string("log.level").as_deref(), Some("info"));
        assert_eq!(settings.get_int("cache.max_pairs"), Some(5));
        assert_eq!(settings.get_int("cooldown.window_ms"), Some(30_000));
        assert_eq!(settings.get_string("currency.default_from").as_deref(), Some("TWD"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTING_FILENAME);
        let json = r#"{"cooldown.window_ms": 1000, "api.base_url": "http://fx.local"}"#;
        std::fs::write(&path, json).unwrap();

        let settings = Settings::from_file(&path);
        assert_eq!(settings.get_int("cooldown.window_ms"), Some(1000));
        assert_eq!(settings.get_string("api.base_url").as_deref(), Some("http://fx.local"));
        assert_eq!(settings.get_int("chart.timeout_ms"), Some(45_000));
    }
}
