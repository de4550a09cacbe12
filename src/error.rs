//! Keyroute Error Types
//!
//! Configuration, per-attempt provider, and terminal dispatch errors.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to load the credential document.
///
/// Never leaves the credential store: it is logged and replaced by an
/// empty configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found at any searched location
    #[error("no key storage found (searched: {})", display_paths(.0))]
    Missing(Vec<PathBuf>),

    /// The file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid key storage document
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a single (provider, credential) attempt.
///
/// The router swallows these and moves on to the next pair.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Backend answered with a non-success status
    #[error("{provider} API HTTP error: {status} - {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The call did not complete within the request timeout
    #[error("{provider} request timed out: {message}")]
    Timeout { provider: String, message: String },

    /// Connection or other transport failure
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// The credential cannot be carried in a header
    #[error("invalid credential for {provider}: {reason}")]
    InvalidCredential { provider: String, reason: String },

    /// Request body could not be serialized
    #[error("failed to encode {provider} request: {message}")]
    Encode { provider: String, message: String },

    /// Success status, but the reply text is not where the backend puts it
    #[error("failed to parse {provider} response: {body}")]
    Unparsable { provider: String, body: String },

    /// Reply text present but empty
    #[error("{provider} returned an empty reply")]
    EmptyReply { provider: String },
}

impl ProviderError {
    /// Map a reqwest error for the given provider.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        let provider = provider.to_string();
        if err.is_timeout() {
            ProviderError::Timeout {
                provider,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            ProviderError::Transport {
                provider,
                message: format!("Connection failed: {}", err),
            }
        } else {
            ProviderError::Transport {
                provider,
                message: err.to_string(),
            }
        }
    }

    /// Name of the provider the attempt went to
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Status { provider, .. }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::InvalidCredential { provider, .. }
            | ProviderError::Encode { provider, .. }
            | ProviderError::Unparsable { provider, .. }
            | ProviderError::EmptyReply { provider } => provider,
        }
    }
}

/// One failed attempt inside a dispatch.
#[derive(Debug)]
pub struct AttemptFailure {
    /// Provider name
    pub provider: String,

    /// Masked credential
    pub credential: String,

    /// Why the attempt failed
    pub error: ProviderError,
}

/// Terminal failure of a dispatch. The only errors callers see.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The pairing sequence was empty; nothing was attempted
    #[error("no providers or keys configured")]
    NoPairs,

    /// Every pair in the sequence failed
    #[error("all providers and keys failed")]
    Exhausted { failures: Vec<AttemptFailure> },

    /// The overall deadline ran out before any pair succeeded
    #[error("all providers and keys failed: deadline of {deadline:?} exceeded")]
    DeadlineExceeded {
        deadline: Duration,
        failures: Vec<AttemptFailure>,
    },
}

impl DispatchError {
    /// Failed attempts recorded before giving up
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            DispatchError::NoPairs => &[],
            DispatchError::Exhausted { failures }
            | DispatchError::DeadlineExceeded { failures, .. } => failures,
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            DispatchError::NoPairs => {
                "The assistant is not configured. Add API keys and try again."
            }
            DispatchError::Exhausted { .. } | DispatchError::DeadlineExceeded { .. } => {
                "Sorry, I couldn't process your request right now. Please try again later."
            }
        }
    }
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_messages_are_stable() {
        assert_eq!(
            DispatchError::NoPairs.to_string(),
            "no providers or keys configured"
        );
        let exhausted = DispatchError::Exhausted {
            failures: vec![AttemptFailure {
                provider: "Groq".to_string(),
                credential: "gsk_…abcd".to_string(),
                error: ProviderError::Status {
                    provider: "Groq".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                },
            }],
        };
        assert_eq!(exhausted.to_string(), "all providers and keys failed");
        assert_eq!(exhausted.failures().len(), 1);
        assert_ne!(exhausted.user_message(), exhausted.to_string());
    }

    #[test]
    fn test_status_error_carries_code_and_body() {
        let err = ProviderError::Status {
            provider: "Gemini".to_string(),
            status: 403,
            body: "{\"error\":\"denied\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("denied"));
        assert_eq!(err.provider(), "Gemini");
    }

    #[test]
    fn test_missing_config_lists_paths() {
        let err = ConfigError::Missing(vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(
            err.to_string(),
            "no key storage found (searched: a.json, b.json)"
        );
    }
}
