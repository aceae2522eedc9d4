//! Heuristic phrase translator.
//!
//! Tokens are consumed by a growing window: each window is looked up in the
//! phrase table and the first hit replaces the whole window. A window that
//! misses and is longer than the phrase threshold, or that has reached the
//! end of input, gives up on its oldest token, which is translated on its own
//! through the word table (or echoed) before the window restarts at the next
//! token. This prefers the shortest known phrase starting at a token, not the
//! longest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::cache::TranslationCache;
use super::interface::{TranslateError, TranslateOutcome};
use super::normalize::{denormalize, normalize, tokenize};
use super::punctuation;
use super::spans::{render, Span};
use crate::config::TranslatorConfig;
use crate::store::{Table, TranslationStore};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Found(String),
    Missing,
    Failed,
}

impl Lookup {
    fn target(&self) -> Option<&str> {
        match self {
            Lookup::Found(target) => Some(target.as_str()),
            Lookup::Missing | Lookup::Failed => None,
        }
    }
}

/// Lookups made while translating one request, keyed by table and source text
type LookupMemo = HashMap<(Table, String), Lookup>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslatorStats {
    pub issued: u64,
    pub failed: u64,
}

pub struct PhraseTranslator {
    store: Arc<dyn TranslationStore>,
    cache: Arc<TranslationCache>,
    phrase_threshold: usize,
    lookup_timeout: Duration,
    lookups_issued: AtomicU64,
    lookups_failed: AtomicU64,
}

impl PhraseTranslator {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        cache: Arc<TranslationCache>,
        config: &TranslatorConfig,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            phrase_threshold: config.phrase_threshold.max(1),
            lookup_timeout,
            lookups_issued: AtomicU64::new(0),
            lookups_failed: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn TranslationStore> {
        &self.store
    }

    pub fn stats(&self) -> TranslatorStats {
        TranslatorStats {
            issued: self.lookups_issued.load(Ordering::Relaxed),
            failed: self.lookups_failed.load(Ordering::Relaxed),
        }
    }

    /// Translate `text`, serving repeated inputs from the cache.
    ///
    /// Lookup misses and store failures leave the affected tokens
    /// untranslated; the only error is an empty input.
    pub async fn translate(&self, text: &str) -> Result<TranslateOutcome, TranslateError> {
        if text.is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let key = normalize(text);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for {:?}", key);
            return Ok(TranslateOutcome {
                original: text.to_string(),
                translation: denormalize(&cached),
                from_cache: true,
            });
        }

        let tokens = tokenize(text);
        let mut memo = LookupMemo::new();
        let spans = self.match_spans(&tokens, &mut memo).await;
        let translated = punctuation::reinsert(text, &render(&tokens, &spans));

        let degraded = memo.values().any(|l| *l == Lookup::Failed);
        if degraded {
            warn!("Not caching degraded translation of {:?}", key);
        } else {
            self.cache.insert(key, translated.clone());
        }

        Ok(TranslateOutcome {
            original: text.to_string(),
            translation: denormalize(&translated),
            from_cache: false,
        })
    }

    /// Walk the tokens left to right and record what replaces each range
    async fn match_spans(&self, tokens: &[String], memo: &mut LookupMemo) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            // Farthest window end the walk can reach before falling back
            let max_end = (start + self.phrase_threshold + 1).min(tokens.len());
            let windows: Vec<(usize, String)> = (start + 1..=max_end)
                .map(|end| (end, tokens[start..end].join(" ")))
                .collect();

            let mut wanted: Vec<(Table, String)> = windows
                .iter()
                .map(|(_, phrase)| (Table::Phrases, phrase.clone()))
                .collect();
            wanted.push((Table::Words, tokens[start].clone()));
            self.prefetch(memo, wanted).await;

            let phrase_hit = windows.iter().find_map(|(end, phrase)| {
                memo.get(&(Table::Phrases, phrase.clone()))
                    .and_then(Lookup::target)
                    .map(|target| (*end, target.to_string()))
            });

            match phrase_hit {
                Some((end, target)) => {
                    spans.push(Span::new(start, end, target));
                    start = end;
                }
                None => {
                    let word = memo
                        .get(&(Table::Words, tokens[start].clone()))
                        .and_then(Lookup::target)
                        .unwrap_or(tokens[start].as_str())
                        .to_string();
                    spans.push(Span::new(start, start + 1, word));
                    start += 1;
                }
            }
        }

        spans
    }

    /// Issue every lookup not already in the memo concurrently and wait for all of them
    async fn prefetch(&self, memo: &mut LookupMemo, wanted: Vec<(Table, String)>) {
        let pending: Vec<(Table, String)> = wanted
            .into_iter()
            .filter(|k| !memo.contains_key(k))
            .collect();

        let results = join_all(pending.iter().map(|(table, key)| self.lookup(*table, key))).await;

        for (k, result) in pending.into_iter().zip(results) {
            memo.insert(k, result);
        }
    }

    async fn lookup(&self, table: Table, key: &str) -> Lookup {
        self.lookups_issued.fetch_add(1, Ordering::Relaxed);

        match tokio::time::timeout(self.lookup_timeout, self.store.lookup_exact(table, key)).await {
            Ok(Ok(Some(target))) => Lookup::Found(target),
            Ok(Ok(None)) => Lookup::Missing,
            Ok(Err(e)) => {
                self.lookups_failed.fetch_add(1, Ordering::Relaxed);
                warn!("Lookup of {:?} in {} failed, leaving untranslated: {}", key, table.as_str(), e);
                Lookup::Failed
            }
            Err(_) => {
                self.lookups_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Lookup of {:?} in {} timed out after {:?}, leaving untranslated",
                    key,
                    table.as_str(),
                    self.lookup_timeout
                );
                Lookup::Failed
            }
        }
    }
}
