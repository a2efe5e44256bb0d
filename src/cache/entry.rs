//! Cache entry with TTL support

use crate::cache::types::{Artifact, CacheKey};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// A cached artifact stamped with its insertion time
///
/// Age is measured on tokio's clock so a paused test runtime can move
/// entries past their TTL without sleeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cache key
    pub key: CacheKey,

    /// The cached artifact
    pub artifact: Artifact,

    /// Wall-clock creation time, for reporting
    pub created_at: DateTime<Utc>,

    /// Monotonic insertion time used for expiry
    pub inserted_at: Instant,

    /// Time-to-live fixed at insertion
    pub ttl: Duration,

    /// Number of fresh reads served
    pub hits: u64,
}

impl CacheEntry {
    /// Create a new cache entry stamped with the current time
    pub fn new(key: CacheKey, artifact: Artifact, ttl: Duration) -> Self {
        Self {
            key,
            artifact,
            created_at: Utc::now(),
            inserted_at: Instant::now(),
            ttl,
            hits: 0,
        }
    }

    /// Get the age of the entry
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.inserted_at)
    }

    /// Check if the entry is older than its TTL
    pub fn is_expired(&self) -> bool {
        self.age() > self.ttl
    }

    /// Get time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.age())
    }

    /// Record a fresh read
    pub fn mark_accessed(&mut self) {
        self.hits += 1;
    }
}
