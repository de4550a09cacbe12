//! Configuration Sources
//!
//! Where the key storage document comes from. Sources are read on every
//! lookup, so edits take effect on the next dispatch without a restart.

use crate::config::schema::KeyStorage;
use crate::error::ConfigError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit key storage file
pub const CONFIG_PATH_ENV: &str = "KEYROUTE_CONFIG";

/// Default key storage file name
pub const CONFIG_FILE_NAME: &str = "key_storage.json";

/// Supplies the freshest known key storage document.
///
/// Implementations must not block indefinitely. Failures are reported
/// rather than panicking; the credential store turns them into an empty
/// configuration.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<KeyStorage, ConfigError>;
}

/// Reads a JSON document from the filesystem on every load
#[derive(Debug, Clone)]
pub struct FileSource {
    candidates: Vec<PathBuf>,
}

impl FileSource {
    /// Use one specific file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    /// Search the default locations, first existing file wins
    pub fn discover() -> Self {
        Self {
            candidates: Self::default_paths(),
        }
    }

    /// Get list of config paths to check
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Environment variable
        if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        // 2. Current directory
        paths.push(PathBuf::from(CONFIG_FILE_NAME));

        // 3. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("keyroute").join(CONFIG_FILE_NAME));
        }

        // 4. Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".keyroute").join(CONFIG_FILE_NAME));
        }

        paths
    }

    /// Paths this source looks at, in order
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    fn load_from_file(path: &Path) -> Result<KeyStorage, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        KeyStorage::from_json(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<KeyStorage, ConfigError> {
        match self.candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => Err(ConfigError::Missing(self.candidates.clone())),
        }
    }
}

/// Holds a document in memory; it can be swapped at any time
#[derive(Debug, Default)]
pub struct MemorySource {
    storage: RwLock<KeyStorage>,
}

impl MemorySource {
    pub fn new(storage: KeyStorage) -> Self {
        Self {
            storage: RwLock::new(storage),
        }
    }

    /// Replace the document; the next load sees the new one
    pub fn set(&self, storage: KeyStorage) {
        *self.storage.write() = storage;
    }
}

impl ConfigSource for MemorySource {
    fn load(&self) -> Result<KeyStorage, ConfigError> {
        Ok(self.storage.read().clone())
    }
}
