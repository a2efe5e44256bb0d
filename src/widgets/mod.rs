//! Widget configuration types
//!
//! Each widget kind is a plain serde record that is replaced wholesale on
//! every edit. The [`WidgetConfig`] trait declares which fields feed the cache
//! key and how the record is validated before any request is made.

pub mod skills;
pub mod stats;
pub mod urls;
pub mod wave;

pub use skills::{Skill, SkillsConfig};
pub use stats::{LanguageLayout, StatsCardConfig, StreakConfig, TopLanguagesConfig};
pub use urls::EndpointUrls;
pub use wave::{WaveAlign, WaveConfig};

use crate::error::{Result, WidgetError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Widget kinds supported by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Stats,
    TopLanguages,
    Streak,
    Skills,
    Wave,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Stats => "stats",
            WidgetKind::TopLanguages => "top_langs",
            WidgetKind::Streak => "streak",
            WidgetKind::Skills => "skills",
            WidgetKind::Wave => "wave",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A widget's display options
pub trait WidgetConfig:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const KIND: WidgetKind;

    /// Fields that affect the generated artifact, and nothing else
    fn hash_fields(&self) -> Value;

    /// Reject input that must never reach an endpoint
    fn validate(&self) -> Result<()>;
}

/// Widgets whose artifact is an image served by an endpoint
pub trait ImageWidget: WidgetConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String;
}

/// Widgets whose artifact is drawn locally
pub trait SvgWidget: WidgetConfig {
    fn render_svg(&self) -> String;
}

/// GitHub login rules: 1-39 chars, alphanumeric or single inner hyphens
pub(crate) fn validate_username(username: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(WidgetError::Validation("username is required".to_string()));
    }
    if username.len() > 39 {
        return Err(WidgetError::Validation(format!(
            "username '{}' is longer than 39 characters",
            username
        )));
    }
    let valid_chars = username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid_chars || username.starts_with('-') || username.ends_with('-') || username.contains("--")
    {
        return Err(WidgetError::Validation(format!(
            "'{}' is not a valid GitHub username",
            username
        )));
    }
    Ok(())
}

/// Sorted copy of a list whose order the renderer ignores
pub(crate) fn sorted(items: &[String]) -> Vec<String> {
    let mut items: Vec<String> = items.iter().map(|s| s.trim().to_lowercase()).collect();
    items.sort();
    items.dedup();
    items
}
