//! Artifact cache store with TTL expiry

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    types::{Artifact, CacheKey, CacheStats},
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Time-expiring map from config hash to generated artifact
///
/// Expired entries are ignored by [`get`](Self::get) but stay in the map,
/// so `len()` only grows unless a capacity is configured or
/// [`purge_expired`](Self::purge_expired) is called. Each widget store owns
/// one instance; clones share the same storage.
#[derive(Clone)]
pub struct ArtifactCache {
    /// Cache configuration
    config: CacheConfig,

    /// Internal storage
    store: Arc<RwLock<CacheStore>>,
}

/// Internal cache storage
struct CacheStore {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry>,

    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,

    /// Current cache statistics
    stats: CacheStats,
}

impl ArtifactCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        debug!("Initializing artifact cache with config: {:?}", config);

        let store = CacheStore {
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        };

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a fresh entry, or `None` when absent or older than the TTL
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut store = self.store.write().await;

        let lookup = store.entries.get_mut(key).map(|entry| {
            if entry.is_expired() {
                debug!("Cache entry stale: {} (age {:?})", key, entry.age());
                None
            } else {
                entry.mark_accessed();
                Some(entry.clone())
            }
        });

        match lookup {
            Some(Some(entry)) => {
                debug!("Cache hit: {}", key);
                store.stats.hits += 1;
                Some(entry)
            }
            Some(None) => {
                store.stats.misses += 1;
                store.stats.stale_misses += 1;
                None
            }
            None => {
                debug!("Cache miss: {}", key);
                store.stats.misses += 1;
                None
            }
        }
    }

    /// Get only the artifact of a fresh entry
    pub async fn get_artifact(&self, key: &str) -> Option<Artifact> {
        self.get(key).await.map(|entry| entry.artifact)
    }

    /// Store an artifact stamped with the current time; the last put wins
    pub async fn put(&self, key: CacheKey, artifact: Artifact) {
        let ttl = self.config.ttl_with_jitter();
        let entry = CacheEntry::new(key.clone(), artifact, ttl);

        let mut store = self.store.write().await;

        if store.entries.contains_key(&key) {
            debug!("Updating existing cache entry: {}", key);
            store.order.retain(|k| k != &key);
        } else {
            self.evict_if_needed(&mut store);
            debug!("Inserting new cache entry: {}", key);
        }

        store.entries.insert(key.clone(), entry);
        store.order.push_back(key);
        store.stats.entries = store.entries.len();
    }

    /// Check if a key exists in the cache, stale or not
    pub async fn contains_key(&self, key: &str) -> bool {
        let store = self.store.read().await;
        store.entries.contains_key(key)
    }

    /// Remove a specific entry from the cache
    pub async fn remove(&self, key: &str) -> Option<Artifact> {
        let mut store = self.store.write().await;
        let removed = Self::remove_entry(&mut store, key);
        if removed.is_some() {
            debug!("Removed cache entry: {}", key);
        }
        removed.map(|entry| entry.artifact)
    }

    /// Clear all entries from the cache
    pub async fn clear(&self) {
        let mut store = self.store.write().await;

        let count = store.entries.len();
        store.entries.clear();
        store.order.clear();
        store.stats.entries = 0;

        info!("Cleared {} entries from cache", count);
    }

    /// Remove every entry older than its TTL, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.store.write().await;

        let expired: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            Self::remove_entry(&mut store, key);
        }
        store.stats.evictions_ttl += expired.len() as u64;

        if !expired.is_empty() {
            debug!("Purged {} expired entries", expired.len());
        }
        expired.len()
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        store.stats.clone()
    }

    /// Get number of entries in cache, stale ones included
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.entries.is_empty()
    }

    fn remove_entry(store: &mut CacheStore, key: &str) -> Option<CacheEntry> {
        let entry = store.entries.remove(key)?;
        store.order.retain(|k| k != key);
        store.stats.entries = store.entries.len();
        Some(entry)
    }

    /// Make room for one new key when a capacity is configured
    fn evict_if_needed(&self, store: &mut CacheStore) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };

        while store.entries.len() >= max_entries {
            let Some(key) = store.order.pop_front() else {
                break;
            };
            debug!("Evicting entry due to max_entries limit: {}", key);
            store.entries.remove(&key);
            store.stats.evictions_capacity += 1;
        }
        store.stats.entries = store.entries.len();
    }
}
