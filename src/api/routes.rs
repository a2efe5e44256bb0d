//! Widget endpoint routes

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::cache::{Artifact, ArtifactCache};
use crate::error::WidgetError;
use crate::generator::ArtifactProducer;
use crate::hash::config_hash;
use crate::producer::LocalSvgProducer;
use crate::widgets::{SkillsConfig, SvgWidget, WaveConfig};

/// Application state
pub struct AppState {
    pub skills_cache: ArtifactCache,
    pub wave_cache: ArtifactCache,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body for rejected widget requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Skills query parameters
#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    #[serde(default)]
    pub skills: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub theme: Option<String>,
    pub animated: Option<bool>,
    pub bar_color: Option<String>,
    pub title: Option<String>,
}

impl TryFrom<SkillsQuery> for SkillsConfig {
    type Error = WidgetError;

    fn try_from(query: SkillsQuery) -> Result<Self, Self::Error> {
        let mut config = SkillsConfig::from_query(&query.skills, query.width, query.height, query.theme)?;
        if let Some(animated) = query.animated {
            config.animated = animated;
        }
        config.bar_color = query.bar_color;
        config.title = query.title;
        Ok(config)
    }
}

/// Wave query parameters; colors are comma-separated, `#` optional
#[derive(Debug, Deserialize)]
pub struct WaveQuery {
    pub colors: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub waves: Option<u8>,
    pub amplitude: Option<u32>,
    pub text: Option<String>,
    pub text_color: Option<String>,
    pub animated: Option<bool>,
}

impl From<WaveQuery> for WaveConfig {
    fn from(query: WaveQuery) -> Self {
        let defaults = WaveConfig::default();
        let colors = match query.colors {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| format!("#{}", c.trim_start_matches('#')))
                .collect(),
            None => defaults.colors,
        };

        WaveConfig {
            colors,
            width: query.width.unwrap_or(defaults.width),
            height: query.height.unwrap_or(defaults.height),
            waves: query.waves.unwrap_or(defaults.waves),
            amplitude: query.amplitude.unwrap_or(defaults.amplitude),
            text: query.text.filter(|t| !t.trim().is_empty()),
            text_color: query
                .text_color
                .map(|c| format!("#{}", c.trim_start_matches('#')))
                .unwrap_or(defaults.text_color),
            animated: query.animated.unwrap_or(defaults.animated),
            align: defaults.align,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Skill progress bars as SVG
pub async fn skills(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SkillsQuery>,
) -> Response {
    match SkillsConfig::try_from(params) {
        Ok(config) => render(&app_state.skills_cache, &config).await,
        Err(e) => error_response(e),
    }
}

/// Wave banner as SVG
pub async fn wave(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<WaveQuery>,
) -> Response {
    render(&app_state.wave_cache, &WaveConfig::from(params)).await
}

async fn render<C: SvgWidget>(cache: &ArtifactCache, config: &C) -> Response {
    let key = config_hash(config);
    if let Some(artifact) = cache.get_artifact(&key).await {
        debug!("Serving {} from cache", key);
        return svg_response(cache, artifact);
    }

    match LocalSvgProducer.produce(config).await {
        Ok(artifact) => {
            cache.put(key, artifact.clone()).await;
            svg_response(cache, artifact)
        }
        Err(e) => error_response(e),
    }
}

fn svg_response(cache: &ArtifactCache, artifact: Artifact) -> Response {
    let max_age = format!("public, max-age={}", cache.config().ttl.as_secs());
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CACHE_CONTROL, max_age),
        ],
        artifact.as_str().to_string(),
    )
        .into_response()
}

fn error_response(error: WidgetError) -> Response {
    let status = match error.kind() {
        crate::error::ErrorKind::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    debug!("Rejecting widget request: {}", error);
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            kind: error.kind().to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::WidgetConfig;

    #[test]
    fn test_skills_query_conversion() {
        let query = SkillsQuery {
            skills: "Rust:90,Go:60".to_string(),
            width: Some(500),
            height: None,
            theme: Some("dark".to_string()),
            animated: Some(false),
            bar_color: Some("ff0000".to_string()),
            title: None,
        };
        let config = SkillsConfig::try_from(query).unwrap();

        assert_eq!(config.skills.len(), 2);
        assert_eq!(config.width, 500);
        assert_eq!(config.height, 300);
        assert!(!config.animated);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wave_query_conversion() {
        let query = WaveQuery {
            colors: Some("ff0000, #00ff00,".to_string()),
            width: None,
            height: None,
            waves: Some(2),
            amplitude: None,
            text: Some("  ".to_string()),
            text_color: None,
            animated: None,
        };
        let config = WaveConfig::from(query);

        assert_eq!(config.colors, vec!["#ff0000".to_string(), "#00ff00".to_string()]);
        assert_eq!(config.waves, 2);
        assert!(config.text.is_none());
    }
}
