//! File-backed key/value store for saved widget configs
//!
//! Every public operation fails closed: an unavailable or broken store turns
//! `save`/`remove` into `false` and `load` into the caller's default, with a
//! warning in the log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk wrapper around a saved value
#[derive(Debug, Serialize, Deserialize)]
struct Record<T> {
    key: String,
    saved_at: DateTime<Utc>,
    value: T,
}

#[derive(Debug, Clone)]
pub struct ConfigStorage {
    base_dir: Option<PathBuf>,
}

impl ConfigStorage {
    /// Store rooted at `base_dir`; the directory is created on first save
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Store that keeps nothing
    pub fn unavailable() -> Self {
        Self { base_dir: None }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.base_dir.is_some()
    }

    /// Persist `value` under `key`, returning whether it was written
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(path) => {
                debug!("Saved {} to {:?}", key, path);
                true
            }
            Err(e) => {
                warn!("Failed to save {}: {:#}", key, e);
                false
            }
        }
    }

    /// Value stored under `key`, or `default` when missing or unreadable
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to load {}: {:#}", key, e);
                default
            }
        }
    }

    /// Delete `key`, returning whether anything was removed
    pub fn remove(&self, key: &str) -> bool {
        let Some(path) = self.path_for(key) else {
            return false;
        };
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to remove {:?}: {}", path, e);
                false
            }
        }
    }

    /// Saved keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let Some(dir) = &self.base_dir else {
            return Vec::new();
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        keys.sort();
        keys
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let dir = self.base_dir.as_ref()?;
        Some(dir.join(format!("{}.json", sanitize_key(key))))
    }

    fn try_save<T: Serialize>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let path = self.path_for(key).context("storage is unavailable")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage dir: {:?}", parent))?;
        }

        let record = Record {
            key: key.to_string(),
            saved_at: Utc::now(),
            value,
        };
        let json = serde_json::to_string_pretty(&record)?;

        // write-then-rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(path)
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stored config: {:?}", path))?;
        let record: Record<T> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stored config: {:?}", path))?;
        Ok(Some(record.value))
    }
}

/// File-name-safe form of a key
fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}
