//! Pairing Sequence and Rotation Cursor
//!
//! Flattens (provider, credential) pairs in registry order and tracks where
//! the next dispatch starts.

use crate::config::{Credential, KeyStorage};
use crate::provider::{Provider, ProviderRegistry};
use std::sync::Arc;

/// One provider with one of its credentials
#[derive(Clone)]
pub struct Pair {
    pub provider: Arc<dyn Provider>,
    pub credential: Credential,
}

impl Pair {
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pair")
            .field("provider", &self.provider.name())
            .field("credential", &self.credential)
            .finish()
    }
}

/// All pairs for one dispatch, built from a single config snapshot
#[derive(Debug, Clone, Default)]
pub struct PairingSequence {
    pairs: Vec<Pair>,
}

impl PairingSequence {
    /// Registry order first, then credential order within each provider
    pub fn build(registry: &ProviderRegistry, storage: &KeyStorage) -> Self {
        let pairs = registry
            .iter()
            .flat_map(|provider| {
                storage
                    .credentials(provider.name())
                    .into_iter()
                    .map(move |credential| Pair {
                        provider: Arc::clone(provider),
                        credential,
                    })
            })
            .collect();

        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    /// Every pair once, starting at `offset` and wrapping around
    pub fn attempt_order(&self, offset: usize) -> impl Iterator<Item = &Pair> {
        let total = self.pairs.len();
        (0..total).map(move |i| &self.pairs[(offset + i) % total])
    }

    /// (provider, masked credential) for display
    pub fn describe(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|p| (p.provider_name().to_string(), p.credential.masked()))
            .collect()
    }
}

/// Process-wide rotation position. Starts at zero, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationCursor(usize);

impl RotationCursor {
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn position(&self) -> usize {
        self.0
    }

    /// Start index for a sequence of `total` pairs. `total` must be non-zero.
    pub fn offset(&self, total: usize) -> usize {
        self.0 % total
    }

    /// Move forward by one, wrapping at the current `total`
    pub fn advance(&mut self, total: usize) {
        self.0 = (self.0 + 1) % total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpClient;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::builtin(HttpClient::new().unwrap())
    }

    #[test]
    fn test_sequence_follows_registry_then_key_order() {
        let storage = KeyStorage::default()
            .with_provider("Groq", ["q1", "q2"], None)
            .with_provider("Gemini", ["g1"], None)
            .with_provider("Unknown", ["x1"], None);

        let sequence = PairingSequence::build(&registry(), &storage);
        let order: Vec<_> = sequence
            .attempt_order(0)
            .map(|p| (p.provider_name().to_string(), p.credential.expose().to_string()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("Gemini".to_string(), "g1".to_string()),
                ("Groq".to_string(), "q1".to_string()),
                ("Groq".to_string(), "q2".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_storage_gives_empty_sequence() {
        let sequence = PairingSequence::build(&registry(), &KeyStorage::default());
        assert!(sequence.is_empty());
        assert_eq!(sequence.attempt_order(3).count(), 0);
    }

    #[test]
    fn test_attempt_order_wraps() {
        let storage = KeyStorage::default().with_provider("Groq", ["a", "b", "c"], None);
        let sequence = PairingSequence::build(&registry(), &storage);

        let keys: Vec<_> = sequence
            .attempt_order(2)
            .map(|p| p.credential.expose().to_string())
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_repeated_key_gets_one_pair_per_entry() {
        let storage = KeyStorage::default().with_provider("Groq", ["k", "k", "j"], None);
        let sequence = PairingSequence::build(&registry(), &storage);

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.get(0).unwrap().credential.expose(), "k");
        assert_eq!(sequence.get(1).unwrap().credential.expose(), "k");
        assert_eq!(sequence.get(2).unwrap().credential.expose(), "j");
        assert!(sequence.get(3).is_none());
    }

    #[test]
    fn test_cursor_wraps_and_tolerates_shrinking_total() {
        let mut cursor = RotationCursor::new(2);
        cursor.advance(3);
        assert_eq!(cursor.position(), 0);

        let cursor = RotationCursor::new(5);
        assert_eq!(cursor.offset(3), 2);
        assert_eq!(cursor.offset(1), 0);
    }

    #[test]
    fn test_describe_masks_credentials() {
        let storage = KeyStorage::default().with_provider("Groq", ["gsk_0123456789abcdef"], None);
        let sequence = PairingSequence::build(&registry(), &storage);
        assert_eq!(
            sequence.describe(),
            vec![("Groq".to_string(), "gsk_…cdef".to_string())]
        );
    }
}
