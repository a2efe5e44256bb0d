//! Runtime settings
//!
//! Loaded from `readme-forge.yaml` (or an explicit path) when present, then
//! overridden by `READMEFORGE_*` environment variables. Missing fields fall
//! back to defaults.

use crate::cache::CacheConfig;
use crate::error::{Result, WidgetError};
use crate::generator::GeneratorConfig;
use crate::github::DEFAULT_API_BASE;
use crate::widgets::EndpointUrls;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SETTINGS_FILE: &str = "readme-forge.yaml";
const ENV_PREFIX: &str = "READMEFORGE_";

/// Endpoint base URLs as written in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub stats_url: String,
    pub streak_url: String,
    pub widgets_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        let urls = EndpointUrls::default();
        Self {
            stats_url: urls.stats.to_string(),
            streak_url: urls.streak.to_string(),
            widgets_url: urls.widgets.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoints: EndpointSettings,
    pub github_api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    pub debounce_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// TTL for stats, top languages and streak cards
    pub remote_ttl_secs: u64,
    /// TTL for skills and wave SVGs
    pub local_ttl_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    /// Spread applied to every TTL, in percent (0 - 100)
    pub cache_ttl_jitter_pct: u8,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: EndpointSettings::default(),
            github_api_url: DEFAULT_API_BASE.to_string(),
            github_token: None,
            debounce_ms: 300,
            max_retries: 2,
            backoff_base_ms: 1000,
            remote_ttl_secs: 5 * 60,
            local_ttl_secs: 10 * 60,
            cache_capacity: None,
            cache_ttl_jitter_pct: 0,
            request_timeout_secs: 10,
            storage_dir: None,
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or `readme-forge.yaml` if it exists, then
    /// apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_overrides(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WidgetError::Config(format!("failed to read settings {:?}: {}", path, e))
        })?;
        debug!("Loaded settings from {:?}", path);
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| WidgetError::Config(format!("invalid settings: {}", e)))
    }

    /// Apply `READMEFORGE_*` overrides (plus `GITHUB_TOKEN`) read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("STATS_URL") {
            self.endpoints.stats_url = value;
        }
        if let Some(value) = var("STREAK_URL") {
            self.endpoints.streak_url = value;
        }
        if let Some(value) = var("WIDGETS_URL") {
            self.endpoints.widgets_url = value;
        }
        if let Some(value) = var("GITHUB_API_URL") {
            self.github_api_url = value;
        }
        if let Some(value) = var("GITHUB_TOKEN").or_else(|| lookup("GITHUB_TOKEN")) {
            self.github_token = Some(value);
        }
        if let Some(value) = var("STORAGE_DIR") {
            self.storage_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = var("HOST") {
            self.server.host = value;
        }

        parse_into(&var, "PORT", &mut self.server.port);
        parse_into(&var, "DEBOUNCE_MS", &mut self.debounce_ms);
        parse_into(&var, "MAX_RETRIES", &mut self.max_retries);
        parse_into(&var, "BACKOFF_BASE_MS", &mut self.backoff_base_ms);
        parse_into(&var, "REMOTE_TTL_SECS", &mut self.remote_ttl_secs);
        parse_into(&var, "LOCAL_TTL_SECS", &mut self.local_ttl_secs);
        parse_into(&var, "REQUEST_TIMEOUT_SECS", &mut self.request_timeout_secs);
        parse_into(&var, "CACHE_TTL_JITTER_PCT", &mut self.cache_ttl_jitter_pct);

        if let Some(raw) = var("CACHE_CAPACITY") {
            match raw.parse::<usize>() {
                Ok(0) => self.cache_capacity = None,
                Ok(n) => self.cache_capacity = Some(n),
                Err(_) => warn!("Ignoring {}CACHE_CAPACITY={:?}", ENV_PREFIX, raw),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint_urls()?;
        self.remote_cache_config().validate()?;
        self.local_cache_config().validate()?;
        if self.request_timeout_secs == 0 {
            return Err(WidgetError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint_urls(&self) -> Result<EndpointUrls> {
        EndpointUrls::new(
            &self.endpoints.stats_url,
            &self.endpoints.streak_url,
            &self.endpoints.widgets_url,
        )
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            quiet_period: Duration::from_millis(self.debounce_ms),
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }

    pub fn remote_cache_config(&self) -> CacheConfig {
        self.cache_config(self.remote_ttl_secs)
    }

    pub fn local_cache_config(&self) -> CacheConfig {
        self.cache_config(self.local_ttl_secs)
    }

    fn cache_config(&self, ttl_secs: u64) -> CacheConfig {
        let builder = CacheConfig::builder()
            .ttl(Duration::from_secs(ttl_secs))
            .ttl_jitter(f64::from(self.cache_ttl_jitter_pct) / 100.0);
        match self.cache_capacity {
            Some(max) => builder.max_entries(max).build(),
            None => builder.build(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory for saved configs, `None` when no location is known
    pub fn resolved_storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("readme-forge")))
    }
}

fn parse_into<T, V>(var: &V, name: &str, target: &mut T)
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    if let Some(raw) = var(name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring {}{}={:?}", ENV_PREFIX, name, raw),
        }
    }
}
