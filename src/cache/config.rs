//! Configuration for the artifact cache

use crate::error::{Result, WidgetError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a widget's artifact cache
///
/// Image endpoints regenerate slowly and rate-limit aggressively, so entries
/// live for minutes rather than hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cache entries
    pub ttl: Duration,

    /// Maximum number of entries, `None` for unbounded
    /// Unbounded caches keep stale entries until `purge_expired` runs
    pub max_entries: Option<usize>,

    /// TTL jitter factor (0.0 - 1.0)
    /// Spreads expiry of entries written together
    pub ttl_jitter: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 5 minutes
            ttl: Duration::from_secs(300),
            max_entries: None,
            ttl_jitter: 0.0,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(WidgetError::Config("ttl must be greater than 0".to_string()));
        }

        if self.max_entries == Some(0) {
            return Err(WidgetError::Config(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err(WidgetError::Config(
                "ttl_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Calculate actual TTL with jitter applied
    pub fn ttl_with_jitter(&self) -> Duration {
        if self.ttl_jitter == 0.0 {
            return self.ttl;
        }

        let base_secs = self.ttl.as_secs_f64();
        let jitter_range = base_secs * self.ttl_jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_secs = (base_secs + jitter).max(1.0);

        Duration::from_secs_f64(final_secs)
    }
}

/// Preset configurations per widget family
impl CacheConfig {
    /// Remote image cards (stats, languages, streak): 5 minutes
    pub fn remote_image() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            ..Default::default()
        }
    }

    /// Locally drawn SVG (skills, wave): 10 minutes
    pub fn local_svg() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            ..Default::default()
        }
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    ttl: Option<Duration>,
    max_entries: Option<usize>,
    ttl_jitter: Option<f64>,
}

impl CacheConfigBuilder {
    /// Set TTL for cache entries
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Bound the number of entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            ttl: self.ttl.unwrap_or(defaults.ttl),
            max_entries: self.max_entries.or(defaults.max_entries),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
        }
    }
}
