//! Core type definitions for the artifact cache

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - `<widget kind>:<config digest>`
pub type CacheKey = String;

/// Generated output for a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Artifact {
    /// Image URL that the endpoint answered successfully
    Url(String),

    /// Inline SVG document
    Svg(String),
}

impl Artifact {
    /// Raw text of the artifact
    pub fn as_str(&self) -> &str {
        match self {
            Artifact::Url(s) | Artifact::Svg(s) => s,
        }
    }

    /// Approximate size in bytes
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn is_svg(&self) -> bool {
        matches!(self, Artifact::Svg(_))
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Url(url) => write!(f, "{}", url),
            Artifact::Svg(svg) => write!(f, "<svg: {} bytes>", svg.len()),
        }
    }
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses (absent or stale)
    pub misses: u64,

    /// Misses caused by an entry older than the TTL
    pub stale_misses: u64,

    /// Number of entries currently in cache, stale ones included
    pub entries: usize,

    /// Number of evictions due to the capacity limit
    pub evictions_capacity: u64,

    /// Number of stale entries removed by an explicit purge
    pub evictions_ttl: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate total evictions
    pub fn total_evictions(&self) -> u64 {
        self.evictions_capacity + self.evictions_ttl
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, stale: {}, hit_rate: {:.2}%, entries: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.stale_misses,
            self.hit_rate(),
            self.entries,
            self.total_evictions()
        )
    }
}
