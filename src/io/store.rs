use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ops::item_ops::ItemError;

use super::lock::LockError;
use super::workspace_io::{STATE_FILE, WorkspaceError, atomic_write};

pub const KEY_VIEW_MODE: &str = "view_mode";
pub const KEY_HIDE_COMPLETED: &str = "hide_completed";
pub const KEY_SIDEBAR_COLLAPSED: &str = "sidebar_collapsed";
pub const KEY_DARK_MODE: &str = "dark_mode";
/// Prefix for remembered filter values (`filters.status`, ...)
pub const FILTER_KEY_PREFIX: &str = "filters.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize preferences: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error("store rejected the change: {0}")]
    Rejected(String),
}

/// String key-value preferences, injected wherever UI state must persist.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.set(key, if value { "true" } else { "false" })
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Preferences kept in `.workboard/.state.json` as a flat string map.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store. Missing or malformed files start empty.
    pub fn open(board_dir: &Path) -> Self {
        let path = board_dir.join(STATE_FILE);
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        JsonFileStore { path, values }
    }

    fn flush(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.values)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// In-process store for tests and for running without a workspace.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path());
        store.set(KEY_VIEW_MODE, "kanban").unwrap();
        store.set_bool(KEY_DARK_MODE, true).unwrap();
        store.set("filters.status", "Todo").unwrap();

        let reopened = JsonFileStore::open(dir.path());
        assert_eq!(reopened.get(KEY_VIEW_MODE).as_deref(), Some("kanban"));
        assert_eq!(reopened.get_bool(KEY_DARK_MODE), Some(true));
        assert_eq!(reopened.get("filters.status").as_deref(), Some("Todo"));

        let mut store = reopened;
        store.remove("filters.status").unwrap();
        assert!(JsonFileStore::open(dir.path()).get("filters.status").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(JsonFileStore::open(dir.path()).get(KEY_VIEW_MODE).is_none());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "not json {{{").unwrap();
        let store = JsonFileStore::open(dir.path());
        assert!(store.get(KEY_VIEW_MODE).is_none());
    }

    #[test]
    fn memory_store_bools() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get_bool(KEY_SIDEBAR_COLLAPSED), None);
        store.set_bool(KEY_SIDEBAR_COLLAPSED, false).unwrap();
        assert_eq!(store.get_bool(KEY_SIDEBAR_COLLAPSED), Some(false));
        store.set(KEY_SIDEBAR_COLLAPSED, "maybe").unwrap();
        assert_eq!(store.get_bool(KEY_SIDEBAR_COLLAPSED), None);
    }
}
