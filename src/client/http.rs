//! HTTP Client
//!
//! Shared reqwest client that posts JSON with a credential attached.
//! No retries here: failover is the router's job.

use crate::config::Credential;
use crate::error::ProviderError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Default timeout applied to each whole HTTP call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How a backend expects its credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,

    /// Custom header carrying the raw key, e.g. `x-goog-api-key`
    Header(&'static str),
}

impl AuthScheme {
    fn apply(
        &self,
        headers: &mut HeaderMap,
        credential: &Credential,
        provider: &str,
    ) -> Result<(), ProviderError> {
        let invalid = |reason: String| ProviderError::InvalidCredential {
            provider: provider.to_string(),
            reason,
        };

        match self {
            AuthScheme::Bearer => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                    .map_err(|e| invalid(e.to_string()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            AuthScheme::Header(name) => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| invalid(format!("header name {:?}: {}", name, e)))?;
                let mut value =
                    HeaderValue::from_str(credential.expose()).map_err(|e| invalid(e.to_string()))?;
                value.set_sensitive(true);
                headers.insert(name, value);
            }
        }
        Ok(())
    }
}

/// HTTP client used by all provider adapters
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,

    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the default timeout
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client whose calls are bounded by `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST a JSON body and return the response body of a successful call.
    ///
    /// Non-success statuses fail with the status code and raw body.
    pub async fn post_json(
        &self,
        url: &str,
        body: String,
        auth: &AuthScheme,
        credential: &Credential,
        provider: &str,
    ) -> Result<String, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        auth.apply(&mut headers, credential, provider)?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, e))?;

        tracing::debug!(provider, status = status.as_u16(), body = %text, "Response");

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: provider.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
