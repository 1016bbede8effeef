//! Key/value preference stores.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::PreferenceError;

/// String key/value storage for preferences.
pub trait PreferenceStore {
    /// Stored value for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a flat TOML table on disk.
///
/// The whole file is read on open and rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlFileStore {
    /// Opens the store at `path`. A missing file is an empty store; it is
    /// created on the first `set`.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] if the file exists but cannot be read
    /// or is not a flat table of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text)?
        } else {
            log::info!("No preferences file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// File backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(&self.values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl PreferenceStore for TomlFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
