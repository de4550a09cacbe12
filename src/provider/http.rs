//! HTTP Provider Adapter
//!
//! One adapter type driven by a static [`ProviderSpec`]: endpoint, wire
//! format, auth convention, and fallback model per backend.

use crate::api::{gemini, openai};
use crate::client::{AuthScheme, HttpClient};
use crate::config::Credential;
use crate::error::ProviderError;
use crate::provider::Provider;
use futures::future::BoxFuture;

/// Request/response family a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `messages` array, reply at `choices[0].message.content`
    OpenAiChat,

    /// `contents[].parts[]`, reply at `candidates[0].content.parts[0].text`
    Gemini,
}

impl WireFormat {
    /// Full URL for a call with the given model
    pub fn endpoint(&self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            WireFormat::OpenAiChat => format!("{}/chat/completions", base),
            WireFormat::Gemini => format!("{}{}", base, gemini::generate_path(model)),
        }
    }

    pub fn encode(&self, model: &str, prompt: &str) -> serde_json::Result<String> {
        match self {
            WireFormat::OpenAiChat => openai::encode_request(model, prompt),
            WireFormat::Gemini => gemini::encode_request(prompt),
        }
    }

    pub fn decode(&self, body: &str) -> Option<String> {
        match self {
            WireFormat::OpenAiChat => openai::decode_reply(body),
            WireFormat::Gemini => gemini::decode_reply(body),
        }
    }
}

/// Static description of a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Name used as the key in the key storage document
    pub name: &'static str,
    pub base_url: &'static str,
    pub wire: WireFormat,
    pub auth: AuthScheme,
    /// Model used when neither the caller nor the config names one
    pub fallback_model: &'static str,
}

pub const GEMINI: ProviderSpec = ProviderSpec {
    name: "Gemini",
    base_url: "https://generativelanguage.googleapis.com/v1beta",
    wire: WireFormat::Gemini,
    auth: AuthScheme::Header("x-goog-api-key"),
    fallback_model: "gemini-2.5-pro",
};

pub const HUGGING_FACE: ProviderSpec = ProviderSpec {
    name: "HuggingFace",
    base_url: "https://router.huggingface.co/featherless-ai/v1",
    wire: WireFormat::OpenAiChat,
    auth: AuthScheme::Bearer,
    fallback_model: "Qwen/Qwen2-7B-Instruct",
};

pub const OPEN_ROUTER: ProviderSpec = ProviderSpec {
    name: "OpenRouter",
    base_url: "https://openrouter.ai/api/v1",
    wire: WireFormat::OpenAiChat,
    auth: AuthScheme::Bearer,
    fallback_model: "openrouter-model",
};

pub const GROQ: ProviderSpec = ProviderSpec {
    name: "Groq",
    base_url: "https://api.groq.com/openai/v1",
    wire: WireFormat::OpenAiChat,
    auth: AuthScheme::Bearer,
    fallback_model: "llama2-70b-4096",
};

pub const ARLI_AI: ProviderSpec = ProviderSpec {
    name: "ArliAI",
    base_url: "https://api.arliai.com/v1",
    wire: WireFormat::OpenAiChat,
    auth: AuthScheme::Bearer,
    fallback_model: "arliai-model",
};

pub const SHALE_PROTOCOL: ProviderSpec = ProviderSpec {
    name: "ShaleProtocol",
    base_url: "https://shale.live/v1",
    wire: WireFormat::OpenAiChat,
    auth: AuthScheme::Bearer,
    fallback_model: "shale-model",
};

/// A backend reached over HTTPS
#[derive(Debug, Clone)]
pub struct HttpProvider {
    spec: ProviderSpec,
    base_url: String,
    client: HttpClient,
}

impl HttpProvider {
    pub fn new(spec: ProviderSpec, client: HttpClient) -> Self {
        Self {
            base_url: spec.base_url.to_string(),
            spec,
            client,
        }
    }

    /// Point the adapter at a different host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn call(
        &self,
        prompt: &str,
        credential: &Credential,
        model: &str,
    ) -> Result<String, ProviderError> {
        let name = self.spec.name;
        let url = self.spec.wire.endpoint(&self.base_url, model);
        let body = self
            .spec
            .wire
            .encode(model, prompt)
            .map_err(|e| ProviderError::Encode {
                provider: name.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(provider = name, url = %url, model, "Sending request");

        let response = self
            .client
            .post_json(&url, body, &self.spec.auth, credential, name)
            .await?;

        match self.spec.wire.decode(&response) {
            Some(text) => Ok(text),
            None => Err(ProviderError::Unparsable {
                provider: name.to_string(),
                body: response,
            }),
        }
    }
}

impl Provider for HttpProvider {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn fallback_model(&self) -> &str {
        self.spec.fallback_model
    }

    fn send<'a>(
        &'a self,
        prompt: &'a str,
        credential: &'a Credential,
        model: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.call(prompt, credential, model))
    }
}
