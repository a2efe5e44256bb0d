//! HTTP server for the locally rendered widgets

use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::cache::{ArtifactCache, CacheConfig};
use crate::settings::Settings;

use super::routes::{health_check, skills, wave, AppState};

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    pub cache: CacheConfig,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cache: CacheConfig::local_svg(),
        }
    }
}

impl From<&Settings> for ApiServerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            cache: settings.local_cache_config(),
        }
    }
}

/// Build the router; shared by [`ApiServer::start`] and tests
pub fn router(cache: CacheConfig) -> Router {
    let app_state = Arc::new(AppState {
        skills_cache: ArtifactCache::new(cache.clone()),
        wave_cache: ArtifactCache::new(cache),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/skills", get(skills))
        .route("/api/wave", get(wave))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ApiServerConfig) -> Self {
        Self { config }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        self.config.cache.validate()?;
        let app = router(self.config.cache);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting widget server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
