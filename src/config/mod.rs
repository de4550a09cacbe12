//! Configuration Module
//!
//! Key storage schema, hot-reloading sources, and the credential store.

pub mod schema;
pub mod source;
pub mod store;

pub use schema::{Credential, KeyStorage, ProviderKeys};
pub use source::{ConfigSource, FileSource, MemorySource, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use store::CredentialStore;
