//! Persisted locale preference.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Failed to access preference file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference file '{}' is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store that outlives the page.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// The value could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Non-persistent store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store, starting empty when the file does not exist yet.
    ///
    /// # Errors
    /// The file exists but cannot be read or is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|source| PreferenceError::Corrupt { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Preference file not found, starting empty: {:?}", path);
                BTreeMap::new()
            }
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value.to_string());

        let content = serde_json::to_string_pretty(&values)
            .map_err(|source| PreferenceError::Corrupt { path: self.path.clone(), source })?;
        std::fs::write(&self.path, content)
            .map_err(|source| PreferenceError::Io { path: self.path.clone(), source })?;

        self.values = values;
        Ok(())
    }
}
