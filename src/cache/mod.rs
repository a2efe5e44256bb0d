//! # Artifact cache
//!
//! In-memory map from a widget's config hash to its generated artifact.
//!
//! - **TTL expiry**: entries older than the configured TTL read as absent
//! - **No implicit eviction**: stale entries stay until purged or displaced
//! - **Optional capacity**: oldest-inserted entries are dropped when full
//! - **Shared safely**: async `RwLock` around the map, last `put` wins
//!
//! ## Example
//!
//! ```rust
//! use readme_forge::cache::{Artifact, ArtifactCache, CacheConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let cache = ArtifactCache::new(
//!     CacheConfig::builder().ttl(Duration::from_secs(300)).build(),
//! );
//!
//! cache.put("stats:abc".to_string(), Artifact::Url("https://example.com".into())).await;
//!
//! if let Some(entry) = cache.get("stats:abc").await {
//!     println!("Cache hit: {}", entry.artifact);
//! }
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use store::ArtifactCache;
pub use types::{Artifact, CacheKey, CacheStats};
