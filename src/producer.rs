//! Artifact producers for remote image cards and local SVG widgets

use crate::cache::Artifact;
use crate::error::{Result, WidgetError};
use crate::generator::ArtifactProducer;
use crate::widgets::{EndpointUrls, ImageWidget, SvgWidget};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("readme-forge/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in an error message
const MAX_ERROR_DETAIL: usize = 200;

/// Shared HTTP client for endpoint and GitHub API calls
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WidgetError::Config(format!("failed to build http client: {}", e)))
}

/// Verifies that an image endpoint answers for a config's URL
///
/// The artifact is the URL itself, which is what the markdown embeds.
#[derive(Debug, Clone)]
pub struct HttpImageProducer {
    client: Client,
    urls: EndpointUrls,
}

impl HttpImageProducer {
    pub fn new(client: Client, urls: EndpointUrls) -> Self {
        Self { client, urls }
    }

    pub fn urls(&self) -> &EndpointUrls {
        &self.urls
    }
}

#[async_trait]
impl<C: ImageWidget> ArtifactProducer<C> for HttpImageProducer {
    async fn produce(&self, config: &C) -> Result<Artifact> {
        let url = config.image_url(&self.urls);
        debug!("Requesting {} card: {}", C::KIND, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WidgetError::from_status(status.as_u16(), error_detail(&body)));
        }

        Ok(Artifact::Url(url))
    }
}

/// Draws the SVG locally; never fails for a validated config
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSvgProducer;

#[async_trait]
impl<C: SvgWidget> ArtifactProducer<C> for LocalSvgProducer {
    async fn produce(&self, config: &C) -> Result<Artifact> {
        config.validate()?;
        Ok(Artifact::Svg(config.render_svg()))
    }
}

/// First line of a response body, trimmed to a readable length
pub(crate) fn error_detail(body: &str) -> String {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.is_empty() {
        return "empty response".to_string();
    }
    line.chars().take(MAX_ERROR_DETAIL).collect()
}
