//! Key Storage Schema
//!
//! The credential document: provider name to keys and default model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An API key or token. Opaque to everything except provider adapters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for putting on the wire
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A short form that is safe to log: first and last four characters
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Root of the key storage document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStorage {
    /// Per-provider keys, keyed by provider name
    #[serde(default)]
    pub api_keys: HashMap<String, ProviderKeys>,
}

/// Keys and model settings for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderKeys {
    /// Keys in rotation order
    #[serde(default)]
    pub keys: Vec<Credential>,

    /// Environment variables holding additional keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys_env: Vec<String>,

    /// Model used instead of the adapter's built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl ProviderKeys {
    /// Literal keys exactly as configured, then keys from set environment
    /// variables. Blank or already-listed environment values are skipped.
    pub fn credentials(&self) -> Vec<Credential> {
        let mut keys = self.keys.clone();

        for env_var in &self.keys_env {
            if let Ok(value) = std::env::var(env_var) {
                let key = Credential::new(value.trim());
                if !key.expose().is_empty() && !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        keys
    }
}

impl KeyStorage {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Credentials for a provider, empty when the provider is absent
    pub fn credentials(&self, provider: &str) -> Vec<Credential> {
        self.api_keys
            .get(provider)
            .map(ProviderKeys::credentials)
            .unwrap_or_default()
    }

    /// Configured default model for a provider
    pub fn default_model(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(provider)
            .and_then(|p| p.default_model.as_deref())
            .filter(|m| !m.trim().is_empty())
    }

    /// Builder-style helper used by embedders and tests
    pub fn with_provider<I, K>(mut self, provider: &str, keys: I, default_model: Option<&str>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Credential>,
    {
        self.api_keys.insert(
            provider.to_string(),
            ProviderKeys {
                keys: keys.into_iter().map(Into::into).collect(),
                keys_env: Vec::new(),
                default_model: default_model.map(str::to_string),
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_key_storage() {
        let json = r#"{
            "api_keys": {
                "Gemini": { "keys": ["g-1", "g-2"], "default_model": "gemini-2.5-flash" },
                "Groq": { "keys": ["q-1"] }
            }
        }"#;

        let storage = KeyStorage::from_json(json).unwrap();
        assert_eq!(
            storage.credentials("Gemini"),
            vec![Credential::new("g-1"), Credential::new("g-2")]
        );
        assert_eq!(storage.default_model("Gemini"), Some("gemini-2.5-flash"));
        assert_eq!(storage.default_model("Groq"), None);
        assert!(storage.credentials("OpenRouter").is_empty());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let storage = KeyStorage::from_json("{}").unwrap();
        assert!(storage.api_keys.is_empty());
    }

    #[test]
    fn test_literal_keys_are_kept_as_configured() {
        let storage = KeyStorage::default().with_provider("Groq", ["a", "", "b", "a"], None);
        assert_eq!(
            storage.credentials("Groq"),
            vec![
                Credential::new("a"),
                Credential::new(""),
                Credential::new("b"),
                Credential::new("a"),
            ]
        );
    }

    #[test]
    fn test_keys_env_skips_blank_and_listed_values() {
        std::env::set_var("KEYROUTE_TEST_SCHEMA_DUP", "literal");
        std::env::set_var("KEYROUTE_TEST_SCHEMA_BLANK", "  ");
        let json = r#"{
            "api_keys": {
                "Groq": {
                    "keys": ["literal"],
                    "keys_env": ["KEYROUTE_TEST_SCHEMA_DUP", "KEYROUTE_TEST_SCHEMA_BLANK"]
                }
            }
        }"#;

        let storage = KeyStorage::from_json(json).unwrap();
        assert_eq!(storage.credentials("Groq"), vec![Credential::new("literal")]);
        std::env::remove_var("KEYROUTE_TEST_SCHEMA_DUP");
        std::env::remove_var("KEYROUTE_TEST_SCHEMA_BLANK");
    }

    #[test]
    fn test_keys_env_appends_after_literal_keys() {
        std::env::set_var("KEYROUTE_TEST_SCHEMA_KEY", "env-key");
        let json = r#"{
            "api_keys": {
                "Groq": {
                    "keys": ["literal"],
                    "keys_env": ["KEYROUTE_TEST_SCHEMA_KEY", "KEYROUTE_TEST_SCHEMA_UNSET"]
                }
            }
        }"#;

        let storage = KeyStorage::from_json(json).unwrap();
        assert_eq!(
            storage.credentials("Groq"),
            vec![Credential::new("literal"), Credential::new("env-key")]
        );
        std::env::remove_var("KEYROUTE_TEST_SCHEMA_KEY");
    }

    #[test]
    fn test_blank_default_model_is_ignored() {
        let storage = KeyStorage::default().with_provider("Groq", ["a"], Some("  "));
        assert_eq!(storage.default_model("Groq"), None);
    }

    #[test]
    fn test_credential_masking() {
        let key = Credential::new("sk-abcdefghijklmnop");
        assert_eq!(key.masked(), "sk-a…mnop");
        assert_eq!(Credential::new("short").masked(), "*****");
        assert!(!format!("{:?}", key).contains("efghijkl"));
    }
}
