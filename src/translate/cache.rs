//! Process-wide translation cache with time-to-live expiry.
//!
//! Keys are normalized input texts. Stale entries read as misses and are
//! dropped lazily on read and in bulk by the periodic sweeper.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::clock::Clock;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub inserted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct TranslationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) <= self.ttl
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if self.is_fresh(&entry, now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        // Only drop it if nobody refreshed the key in the meantime
        self.entries.remove_if(key, |_, entry| !self.is_fresh(entry, now));
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, key: String, value: String) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries.insert(key, entry);
    }

    /// Remove every entry older than the TTL, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = self.is_fresh(entry, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Spawn the periodic sweep task. It stops when the handle is stopped or
    /// dropped, or once the cache itself is gone.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let cache: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    info!("Cache sweep removed {} expired entries", removed);
                } else {
                    debug!("Cache sweep found nothing to remove");
                }
            }
        });

        info!("Started cache sweeper every {:?}", interval);
        SweeperHandle { handle }
    }
}

/// Owns the background sweep task
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        self.handle.abort();
        info!("Stopped cache sweeper");
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::clock::testing::ManualClock;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn cache_with_clock() -> (Arc<TranslationCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(TranslationCache::new(DAY, clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_hit_then_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.insert("hola".to_string(), "padiuxi".to_string());

        clock.advance(DAY);
        assert_eq!(cache.get("hola"), Some("padiuxi".to_string()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("hola"), None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_sweep_removes_only_stale() {
        let (cache, clock) = cache_with_clock();
        cache.insert("viejo".to_string(), "a".to_string());
        clock.advance(Duration::from_secs(23 * 60 * 60));
        cache.insert("nuevo".to_string(), "b".to_string());
        clock.advance(Duration::from_secs(2 * 60 * 60));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("nuevo"), Some("b".to_string()));
    }

    #[test]
    fn test_reinsert_replaces_timestamp() {
        let (cache, clock) = cache_with_clock();
        cache.insert("k".to_string(), "v1".to_string());
        clock.advance(Duration::from_secs(20 * 60 * 60));
        cache.insert("k".to_string(), "v2".to_string());
        clock.advance(Duration::from_secs(20 * 60 * 60));
        assert_eq!(cache.get("k"), Some("v2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_runs_on_interval() {
        let (cache, clock) = cache_with_clock();
        cache.insert("k".to_string(), "v".to_string());
        clock.advance(DAY + Duration::from_secs(1));

        let sweeper = cache.start_sweeper(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_secs(3601)).await;
        tokio::task::yield_now().await;

        assert!(cache.is_empty());
        assert!(sweeper.is_running());
        sweeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_exits_when_cache_dropped() {
        let (cache, _clock) = cache_with_clock();
        let sweeper = cache.start_sweeper(Duration::from_secs(60));
        drop(cache);

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert!(!sweeper.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_not_lost() {
        let (cache, _clock) = cache_with_clock();
        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.insert(format!("key-{}", i), format!("value-{}", i));
                    cache.sweep();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        for i in 0..64 {
            assert_eq!(cache.get(&format!("key-{}", i)), Some(format!("value-{}", i)));
        }
    }
}
