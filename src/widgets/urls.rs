//! Image endpoint URL construction
//!
//! Stores and the markdown synthesizer build URLs from the same config, so a
//! verified artifact URL is byte-identical to the one embedded in markdown.

use crate::error::{Result, WidgetError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Base URLs of the image-generating endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointUrls {
    /// Stats card and top-languages service
    pub stats: Url,

    /// Streak card service
    pub streak: Url,

    /// Self-hosted skills/wave renderer (see `readme-forge serve`)
    pub widgets: Url,
}

impl Default for EndpointUrls {
    fn default() -> Self {
        Self {
            stats: Url::parse("https://github-readme-stats.vercel.app").expect("static url"),
            streak: Url::parse("https://streak-stats.demolab.com").expect("static url"),
            widgets: Url::parse("http://127.0.0.1:8080").expect("static url"),
        }
    }
}

impl EndpointUrls {
    /// Parse endpoint base URLs
    pub fn new(stats: &str, streak: &str, widgets: &str) -> Result<Self> {
        Ok(Self {
            stats: parse_base(stats)?,
            streak: parse_base(streak)?,
            widgets: parse_base(widgets)?,
        })
    }

    /// Build a URL from a base, a path and query pairs
    ///
    /// Values are form-encoded, so `TypeScript:85` becomes `TypeScript%3A85`.
    pub fn build(base: &Url, path: &str, params: &[(&str, String)]) -> String {
        let mut url = base.clone();
        let prefix = base.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", prefix, path));
        url.set_query(None);

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        url.to_string()
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| WidgetError::Config(format!("invalid endpoint url '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(WidgetError::Config(format!(
            "endpoint url '{}' cannot be used as a base",
            raw
        )));
    }
    Ok(url)
}
