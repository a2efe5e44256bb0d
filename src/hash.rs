//! Stable cache keys derived from widget configuration
//!
//! Only the fields a widget declares in [`WidgetConfig::hash_fields`] take
//! part in the key. Object keys are sorted recursively before serialization so
//! the key never depends on field declaration or insertion order.

use crate::cache::CacheKey;
use crate::widgets::WidgetConfig;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Rebuild a JSON value with every object's keys in sorted order
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical JSON text for a value
///
/// `serde_json` writes a `Map` in its iteration order, which is insertion
/// order once `preserve_order` is enabled anywhere in the dependency graph.
/// Rebuilding through [`canonicalize`] keeps the output sorted either way.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

/// Compute the cache key for a widget configuration
pub fn config_hash<C: WidgetConfig>(config: &C) -> CacheKey {
    let canonical = canonical_json(&config.hash_fields());
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{}:{}", C::KIND, hex::encode(digest))
}
