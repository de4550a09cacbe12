//! Credential Store
//!
//! Degrade-safe view over a [`ConfigSource`]. Every lookup reloads the
//! source; a missing or malformed document reads as "no providers".

use crate::config::schema::{Credential, KeyStorage};
use crate::config::source::{ConfigSource, FileSource};
use crate::error::ConfigError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CredentialStore {
    source: Arc<dyn ConfigSource>,
}

impl CredentialStore {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }

    /// Store backed by the default file locations
    pub fn discover() -> Self {
        Self::new(Arc::new(FileSource::discover()))
    }

    /// Load the current document once. Never fails.
    pub fn snapshot(&self) -> KeyStorage {
        match self.source.load() {
            Ok(storage) => storage,
            Err(err @ ConfigError::Missing(_)) => {
                tracing::info!(error = %err, "Key storage not found, using empty key storage");
                KeyStorage::default()
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load key storage, using empty key storage");
                KeyStorage::default()
            }
        }
    }

    /// Ordered credentials for a provider, possibly empty
    pub fn list_credentials(&self, provider: &str) -> Vec<Credential> {
        self.snapshot().credentials(provider)
    }

    /// Configured default model for a provider
    pub fn default_model(&self, provider: &str) -> Option<String> {
        self.snapshot().default_model(provider).map(str::to_string)
    }

    /// First credential of a provider, if any
    pub fn first_credential(&self, provider: &str) -> Option<Credential> {
        self.list_credentials(provider).into_iter().next()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::MemorySource;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(Arc::new(FileSource::new(dir.path().join("absent.json"))));

        assert!(store.snapshot().api_keys.is_empty());
        assert!(store.list_credentials("Gemini").is_empty());
        assert_eq!(store.default_model("Gemini"), None);
    }

    #[test]
    fn test_malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key_storage.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let store = CredentialStore::new(Arc::new(FileSource::new(path)));
        assert!(store.list_credentials("Groq").is_empty());
    }

    #[test]
    fn test_lookups_see_updates() {
        let source = Arc::new(MemorySource::new(
            KeyStorage::default().with_provider("Groq", ["a"], Some("llama-3.1-8b-instant")),
        ));
        let store = CredentialStore::new(source.clone());

        assert_eq!(store.first_credential("Groq"), Some(Credential::new("a")));
        assert_eq!(
            store.default_model("Groq").as_deref(),
            Some("llama-3.1-8b-instant")
        );

        source.set(KeyStorage::default().with_provider("Groq", ["b", "c"], None));
        assert_eq!(
            store.list_credentials("Groq"),
            vec![Credential::new("b"), Credential::new("c")]
        );
        assert_eq!(store.default_model("Groq"), None);
    }
}
