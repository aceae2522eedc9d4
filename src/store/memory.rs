use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::fs;
use tracing::info;

use super::interface::{StoreError, Table, TranslationPair, TranslationStore};

/// In-process translation tables, seeded from a JSON file or filled by hand
#[derive(Debug, Default)]
pub struct MemoryStore {
    words: DashMap<String, String>,
    phrases: DashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    words: Vec<TranslationPair>,
    #[serde(default)]
    phrases: Vec<TranslationPair>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "words": [...], "phrases": [...] }` where each entry is a TranslationPair
    pub fn from_seed_file(path: &str) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let seed: SeedFile = serde_json::from_str(&content)?;

        let store = Self::new();
        for pair in seed.words {
            store.insert(Table::Words, &pair.source_phrase, &pair.target_phrase);
        }
        for pair in seed.phrases {
            store.insert(Table::Phrases, &pair.source_phrase, &pair.target_phrase);
        }
        info!(
            "Seeded memory store from {}: {} words, {} phrases",
            path,
            store.words.len(),
            store.phrases.len()
        );
        Ok(store)
    }

    pub fn insert(&self, table: Table, source: &str, target: &str) {
        self.table(table).insert(source.to_string(), target.to_string());
    }

    fn table(&self, table: Table) -> &DashMap<String, String> {
        match table {
            Table::Words => &self.words,
            Table::Phrases => &self.phrases,
        }
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn lookup_exact(&self, table: Table, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.table(table).get(key).map(|e| e.value().clone()))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
