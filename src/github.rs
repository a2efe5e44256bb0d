//! Minimal GitHub user lookup
//!
//! One endpoint, one attempt. Callers such as the CLI's `user` command show
//! the profile numbers next to the generated cards.

use crate::error::{Result, WidgetError};
use crate::producer::error_detail;
use crate::widgets::validate_username;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Public profile numbers for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub login: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub public_gists: u64,
    pub avatar_url: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(client: Client, api_base: &str, token: Option<String>) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| WidgetError::Config(format!("invalid GitHub API url '{}': {}", api_base, e)))?;
        Ok(Self {
            client,
            api_base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// URL of the user resource
    pub fn user_url(&self, username: &str) -> String {
        let mut url = self.api_base.clone();
        let prefix = self.api_base.path().trim_end_matches('/');
        url.set_path(&format!("{}/users/{}", prefix, username.trim()));
        url.to_string()
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// Fetch a user's public stats; any failure reads "failed to fetch"
    pub async fn fetch_user(&self, username: &str) -> Result<UserStats> {
        validate_username(username)?;
        let url = self.user_url(username);
        debug!("Fetching GitHub user {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| WidgetError::Network(format!("failed to fetch {}: {}", username, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WidgetError::from_status(
                status.as_u16(),
                format!("failed to fetch {}: {}", username, error_detail(&body)),
            ));
        }

        response.json::<UserStats>().await.map_err(|e| {
            WidgetError::Serialization(format!("failed to fetch {}: {}", username, e))
        })
    }
}
