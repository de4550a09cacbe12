//! Dispatch Router
//!
//! Delivers a prompt to exactly one working (provider, credential) pair.
//! Each call starts where the previous one left off, walks the pairing
//! sequence forward until a pair answers, and moves the rotation cursor
//! by exactly one whatever the outcome.

use crate::client::{HttpClient, DEFAULT_TIMEOUT};
use crate::config::{CredentialStore, KeyStorage};
use crate::error::{AttemptFailure, DispatchError, ProviderError, Result};
use crate::provider::{Provider, ProviderRegistry};
use crate::router::pairing::{PairingSequence, RotationCursor};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Instruction line put in front of every prompt
pub const DEFAULT_PREAMBLE: &str = "Please answer in English.";

/// Construction-time router settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    /// Bound on each individual HTTP call
    pub request_timeout: Duration,

    /// Bound on a whole dispatch; `None` tries every pair regardless of time
    pub dispatch_deadline: Option<Duration>,

    /// Line prepended to every prompt; empty disables it
    pub preamble: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_TIMEOUT,
            dispatch_deadline: None,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

/// A successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply text from the backend
    pub text: String,

    /// Provider that answered
    pub provider: String,

    /// Model that answered
    pub model: String,

    /// Number of pairs tried, including the successful one
    pub attempts: usize,
}

pub struct Router {
    registry: ProviderRegistry,
    store: CredentialStore,
    settings: RouterSettings,

    /// Held for the whole dispatch, network calls included
    cursor: Mutex<RotationCursor>,
}

impl Router {
    pub fn new(registry: ProviderRegistry, store: CredentialStore, settings: RouterSettings) -> Self {
        Self {
            registry,
            store,
            settings,
            cursor: Mutex::new(RotationCursor::default()),
        }
    }

    /// Built-in providers sharing one HTTP client with the configured timeout
    pub fn with_builtin_providers(
        store: CredentialStore,
        settings: RouterSettings,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = HttpClient::with_timeout(settings.request_timeout)?;
        Ok(Self::new(ProviderRegistry::builtin(client), store, settings))
    }

    /// Start rotation at a given position instead of zero
    pub fn starting_at(mut self, position: usize) -> Self {
        self.cursor = Mutex::new(RotationCursor::new(position));
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Current cursor position. Waits for an in-flight dispatch to finish.
    pub async fn cursor(&self) -> usize {
        self.cursor.lock().await.position()
    }

    /// The pairing sequence as it stands right now, credentials masked
    pub fn pairs(&self) -> Vec<(String, String)> {
        PairingSequence::build(&self.registry, &self.store.snapshot()).describe()
    }

    /// Send a prompt and return the reply text
    pub async fn post_request(&self, prompt: &str, model_override: Option<&str>) -> Result<String> {
        self.dispatch(prompt, model_override)
            .await
            .map(|reply| reply.text)
    }

    /// Send a prompt, trying pairs in rotation order until one answers
    pub async fn dispatch(&self, prompt: &str, model_override: Option<&str>) -> Result<Reply> {
        let mut cursor = self.cursor.lock().await;

        let storage = self.store.snapshot();
        let sequence = PairingSequence::build(&self.registry, &storage);
        if sequence.is_empty() {
            tracing::warn!("No providers or keys configured");
            return Err(DispatchError::NoPairs);
        }

        let total = sequence.len();
        let offset = cursor.offset(total);
        let prompt = self.augment(prompt);
        let started = Instant::now();
        let mut failures = Vec::new();
        let mut expired = false;

        tracing::debug!(total, offset, "Dispatching");

        for (attempt, pair) in sequence.attempt_order(offset).enumerate() {
            let provider = pair.provider.as_ref();
            let model = resolve_model(model_override, &storage, provider);

            let remaining = match self.settings.dispatch_deadline {
                Some(deadline) => match deadline.checked_sub(started.elapsed()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => {
                        expired = true;
                        break;
                    }
                },
                None => None,
            };

            tracing::debug!(
                provider = provider.name(),
                credential = %pair.credential.masked(),
                attempt = attempt + 1,
                total,
                "Calling provider"
            );

            let call = provider.send(&prompt, &pair.credential, &model);
            let result = match remaining {
                Some(left) => match tokio::time::timeout(left, call).await {
                    Ok(result) => result,
                    Err(_) => {
                        expired = true;
                        Err(ProviderError::Timeout {
                            provider: provider.name().to_string(),
                            message: "dispatch deadline exceeded".to_string(),
                        })
                    }
                },
                None => call.await,
            };

            match result.and_then(|text| non_empty(provider, text)) {
                Ok(text) => {
                    cursor.advance(total);
                    tracing::info!(
                        provider = provider.name(),
                        model = %model,
                        attempts = attempt + 1,
                        "Request served"
                    );
                    return Ok(Reply {
                        text,
                        provider: provider.name().to_string(),
                        model,
                        attempts: attempt + 1,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        credential = %pair.credential.masked(),
                        error = %error,
                        "Provider attempt failed"
                    );
                    failures.push(AttemptFailure {
                        provider: provider.name().to_string(),
                        credential: pair.credential.masked(),
                        error,
                    });
                    if expired {
                        break;
                    }
                }
            }
        }

        cursor.advance(total);

        match self.settings.dispatch_deadline {
            Some(deadline) if expired => {
                tracing::error!(?deadline, tried = failures.len(), total, "Dispatch deadline exceeded");
                Err(DispatchError::DeadlineExceeded { deadline, failures })
            }
            _ => {
                tracing::error!(total, "All providers and keys failed");
                Err(DispatchError::Exhausted { failures })
            }
        }
    }

    /// Prepend the preamble line once
    fn augment(&self, prompt: &str) -> String {
        if self.settings.preamble.is_empty() {
            prompt.to_string()
        } else {
            format!("{}\n{}", self.settings.preamble, prompt)
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Caller override, then configured default, then the adapter's own
fn resolve_model(model_override: Option<&str>, storage: &KeyStorage, provider: &dyn Provider) -> String {
    model_override
        .filter(|m| !m.trim().is_empty())
        .or_else(|| storage.default_model(provider.name()))
        .unwrap_or_else(|| provider.fallback_model())
        .to_string()
}

/// Blank replies count as failures so the next pair gets a chance
fn non_empty(provider: &dyn Provider, text: String) -> std::result::Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyReply {
            provider: provider.name().to_string(),
        })
    } else {
        Ok(text)
    }
}
