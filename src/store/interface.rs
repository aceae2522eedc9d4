use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which lookup table a key is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Words,
    Phrases,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Words => "words",
            Table::Phrases => "phrases",
        }
    }
}

/// One known Spanish -> Zapotec mapping, a single word or a multi-word phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPair {
    pub source_phrase: String,
    pub target_phrase: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Decode(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("Unsupported store kind: {0}")]
    UnsupportedKind(String),
}

/// Read-only exact-match lookups against the translation tables
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Look up `key` in `table` by exact match on the source column.
    ///
    /// # Returns
    /// `Ok(None)` when no row matches; errors are reserved for transport
    /// and decoding failures.
    async fn lookup_exact(&self, table: Table, key: &str) -> Result<Option<String>, StoreError>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> Result<bool, StoreError>;
}
