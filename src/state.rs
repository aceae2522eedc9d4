use std::sync::Arc;

use crate::config::Config;
use crate::store::{StoreFactory, TranslationStore};
use crate::translate::{PhraseTranslator, SystemClock, TranslationCache};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<PhraseTranslator>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = StoreFactory::create_store(&config.store)?;
        Ok(Self::with_store(config, store))
    }

    /// Build the state around an already constructed store
    pub fn with_store(config: Config, store: Arc<dyn TranslationStore>) -> Self {
        let cache = Arc::new(TranslationCache::new(
            config.cache.ttl(),
            Arc::new(SystemClock),
        ));
        let translator = Arc::new(PhraseTranslator::new(
            store,
            cache,
            &config.translator,
            config.store.timeout(),
        ));

        Self {
            config: Arc::new(config),
            translator,
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        self.translator.cache()
    }
}
