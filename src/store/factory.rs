use std::sync::Arc;
use tracing::info;

use super::interface::{StoreError, TranslationStore};
use super::memory::MemoryStore;
use super::supabase::SupabaseStore;
use crate::config::StoreConfig;

/// Factory for creating the lookup store backing the translator
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store based on `store.kind`
    ///
    /// # Arguments
    /// * `config` - Store section of the application config
    pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn TranslationStore>, StoreError> {
        info!("Initializing translation store: {}", config.kind);

        match config.kind.as_str() {
            "supabase" => Ok(Arc::new(SupabaseStore::new(config)?)),
            "memory" => match &config.seed_path {
                Some(path) => Ok(Arc::new(MemoryStore::from_seed_file(path)?)),
                None => Ok(Arc::new(MemoryStore::new())),
            },
            other => Err(StoreError::UnsupportedKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_rejected() {
        let config = StoreConfig {
            kind: "sqlite".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(
            StoreFactory::create_store(&config),
            Err(StoreError::UnsupportedKind(kind)) if kind == "sqlite"
        ));
    }

    #[test]
    fn test_memory_without_seed() {
        let config = StoreConfig {
            kind: "memory".to_string(),
            ..StoreConfig::default()
        };
        assert!(StoreFactory::create_store(&config).is_ok());
    }
}
