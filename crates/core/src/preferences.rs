//! User preferences kept in a key-value store.
//!
//! `load_preferences` and `save_preferences` only talk to the store they
//! are given, so callers decide where preferences live.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::Result, planner::DEFAULT_WINDOW_SECONDS, provider::DEFAULT_MODEL, types::Platform};

const KEY_API_KEY: &str = "api_key";
const KEY_MODEL: &str = "model";
const KEY_WINDOW_SECONDS: &str = "window_seconds";
const CHANNEL_PREFIX: &str = "channel_url.";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`; a missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("clipcheck")
        .join("preferences.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub api_key: Option<String>,
    pub model: String,
    /// Default channel URL per platform, passed to the model as context
    pub channel_urls: BTreeMap<Platform, String>,
    pub window_seconds: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            channel_urls: BTreeMap::new(),
            window_seconds: DEFAULT_WINDOW_SECONDS,
        }
    }
}

impl Preferences {
    pub fn channel_url(&self, platform: Platform) -> Option<&str> {
        self.channel_urls.get(&platform).map(String::as_str)
    }
}

pub fn load_preferences(store: &dyn PreferenceStore) -> Preferences {
    let defaults = Preferences::default();

    let window_seconds = match store.get(KEY_WINDOW_SECONDS) {
        Some(raw) => raw.trim().parse::<u64>().ok().filter(|w| *w > 0).unwrap_or_else(|| {
            warn!(value = %raw, "invalid stored window size, using default");
            defaults.window_seconds
        }),
        None => defaults.window_seconds,
    };

    let channel_urls = Platform::ALL
        .into_iter()
        .filter_map(|platform| {
            let url = store.get(&format!("{CHANNEL_PREFIX}{}", platform.key()))?;
            Some((platform, url))
        })
        .collect();

    Preferences {
        api_key: store.get(KEY_API_KEY).filter(|k| !k.trim().is_empty()),
        model: store
            .get(KEY_MODEL)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model),
        channel_urls,
        window_seconds,
    }
}

pub fn save_preferences(store: &mut dyn PreferenceStore, prefs: &Preferences) -> Result<()> {
    match &prefs.api_key {
        Some(key) => store.set(KEY_API_KEY, key.clone())?,
        None => store.remove(KEY_API_KEY)?,
    }
    store.set(KEY_MODEL, prefs.model.clone())?;
    store.set(KEY_WINDOW_SECONDS, prefs.window_seconds.to_string())?;

    for platform in Platform::ALL {
        let key = format!("{CHANNEL_PREFIX}{}", platform.key());
        match prefs.channel_urls.get(&platform) {
            Some(url) => store.set(&key, url.clone())?,
            None => store.remove(&key)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Preferences {
        let mut prefs = Preferences {
            api_key: Some("secret".to_string()),
            model: "gemini-2.5-pro".to_string(),
            window_seconds: 600,
            ..Preferences::default()
        };
        prefs
            .channel_urls
            .insert(Platform::Youtube, "https://youtube.com/@acme".to_string());
        prefs
    }

    #[test]
    fn empty_store_gives_defaults() {
        assert_eq!(load_preferences(&MemoryStore::default()), Preferences::default());
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::default();
        save_preferences(&mut store, &sample()).unwrap();
        assert_eq!(load_preferences(&store), sample());
    }

    #[test]
    fn clearing_values_removes_keys() {
        let mut store = MemoryStore::default();
        save_preferences(&mut store, &sample()).unwrap();
        save_preferences(&mut store, &Preferences::default()).unwrap();

        assert_eq!(store.get(KEY_API_KEY), None);
        assert_eq!(store.get("channel_url.youtube"), None);
        assert_eq!(load_preferences(&store), Preferences::default());
    }

    #[test]
    fn garbage_window_size_falls_back() {
        let mut store = MemoryStore::default();
        store.set(KEY_WINDOW_SECONDS, "twenty minutes".to_string()).unwrap();
        assert_eq!(load_preferences(&store).window_seconds, DEFAULT_WINDOW_SECONDS);
        store.set(KEY_WINDOW_SECONDS, "0".to_string()).unwrap();
        assert_eq!(load_preferences(&store).window_seconds, DEFAULT_WINDOW_SECONDS);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut store = FileStore::open(&path);
        save_preferences(&mut store, &sample()).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(load_preferences(&reopened), sample());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(load_preferences(&store), Preferences::default());
    }
}
