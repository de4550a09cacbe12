//! Keyroute - multi-provider LLM request router
//!
//! Sends a prompt to exactly one working backend among several
//! interchangeable providers. Every (provider, key) pair from the key
//! storage document is tried in round-robin order, failing over to the
//! next pair when a call fails.
//!
//! ```no_run
//! use keyroute::{CredentialStore, Router, RouterSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::with_builtin_providers(CredentialStore::discover(), RouterSettings::default())?;
//! let reply = router.post_request("Summarise my day", None).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod router;

pub use client::HttpClient;
pub use config::{ConfigSource, Credential, CredentialStore, FileSource, KeyStorage, MemorySource};
pub use error::{AttemptFailure, ConfigError, DispatchError, ProviderError, Result};
pub use provider::{HttpProvider, Provider, ProviderRegistry, ProviderSpec, WireFormat};
pub use router::{Reply, Router, RouterSettings};
