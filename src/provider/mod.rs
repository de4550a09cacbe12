//! Provider Module
//!
//! The adapter capability and the fixed, ordered registry of backends.

pub mod http;

pub use http::{
    HttpProvider, ProviderSpec, WireFormat, ARLI_AI, GEMINI, GROQ, HUGGING_FACE, OPEN_ROUTER,
    SHALE_PROTOCOL,
};

use crate::client::HttpClient;
use crate::config::Credential;
use crate::error::ProviderError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A backend that turns a prompt into reply text.
///
/// The credential and model travel with each call, so one adapter can be
/// shared freely between tasks.
pub trait Provider: Send + Sync {
    /// Name matching the key storage entry
    fn name(&self) -> &str;

    /// Model used when neither caller nor config names one
    fn fallback_model(&self) -> &str;

    /// Send one prompt. Failures are not retried here.
    fn send<'a>(
        &'a self,
        prompt: &'a str,
        credential: &'a Credential,
        model: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}

/// Ordered list of providers; order decides the pairing sequence
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gemini, HuggingFace, OpenRouter, Groq
    pub fn builtin(client: HttpClient) -> Self {
        Self::from_specs([GEMINI, HUGGING_FACE, OPEN_ROUTER, GROQ], client)
    }

    /// The built-in set plus ArliAI and ShaleProtocol
    pub fn extended(client: HttpClient) -> Self {
        Self::from_specs(
            [GEMINI, HUGGING_FACE, OPEN_ROUTER, GROQ, ARLI_AI, SHALE_PROTOCOL],
            client,
        )
    }

    pub fn from_specs(specs: impl IntoIterator<Item = ProviderSpec>, client: HttpClient) -> Self {
        specs.into_iter().fold(Self::new(), |registry, spec| {
            registry.with(Arc::new(HttpProvider::new(spec, client.clone())))
        })
    }

    /// Append a provider. A provider whose name is already registered is ignored.
    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        if self.get(provider.name()).is_some() {
            tracing::warn!(provider = provider.name(), "Duplicate provider ignored");
        } else {
            self.providers.push(provider);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("Groq").is_none());

        let registry = registry.with(Arc::new(HttpProvider::new(GROQ, HttpClient::new().unwrap())));
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_builtin_order() {
        let registry = ProviderRegistry::builtin(HttpClient::new().unwrap());
        assert_eq!(
            registry.names(),
            vec!["Gemini", "HuggingFace", "OpenRouter", "Groq"]
        );
    }

    #[test]
    fn test_extended_registry() {
        let registry = ProviderRegistry::extended(HttpClient::new().unwrap());
        assert_eq!(registry.len(), 6);
        assert!(registry.get("ShaleProtocol").is_some());
        assert_eq!(registry.get("ArliAI").unwrap().fallback_model(), "arliai-model");
    }

    #[test]
    fn test_duplicate_names_are_ignored() {
        let client = HttpClient::new().unwrap();
        let registry = ProviderRegistry::from_specs([GROQ, GEMINI, GROQ], client);
        assert_eq!(registry.names(), vec!["Groq", "Gemini"]);
    }
}
