//! Error types for widget generation
//!
//! Every failure that can reach a widget store is expressed as a
//! [`WidgetError`]. Stores keep the error in their read state, so the type is
//! `Clone` and carries only owned strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error categories the UI and tests branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Network,
    RateLimited,
    NotFound,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::RateLimited => write!(f, "rate_limited"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Main error type for widget operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure or a server-side (5xx) response
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered 403 or 429
    #[error("Rate limited (status {status}): {detail}")]
    RateLimited { status: u16, detail: String },

    /// Endpoint answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx status
    #[error("Unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Invalid settings or cache configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;

impl WidgetError {
    /// Translate a non-2xx HTTP status into a typed error
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            403 | 429 => WidgetError::RateLimited { status, detail },
            404 => WidgetError::NotFound(detail),
            500..=599 => WidgetError::Network(format!("server returned {}: {}", status, detail)),
            _ => WidgetError::Status { status, detail },
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WidgetError::Validation(_) => ErrorKind::Validation,
            WidgetError::Network(_) => ErrorKind::Network,
            WidgetError::RateLimited { .. } => ErrorKind::RateLimited,
            WidgetError::NotFound(_) => ErrorKind::NotFound,
            WidgetError::Status { .. }
            | WidgetError::Config(_)
            | WidgetError::Serialization(_)
            | WidgetError::Storage(_)
            | WidgetError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Validation | ErrorKind::NotFound)
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => WidgetError::from_status(status.as_u16(), e.to_string()),
            None => WidgetError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(e: serde_json::Error) -> Self {
        WidgetError::Serialization(e.to_string())
    }
}

impl From<String> for WidgetError {
    fn from(s: String) -> Self {
        WidgetError::Other(s)
    }
}

impl From<&str> for WidgetError {
    fn from(s: &str) -> Self {
        WidgetError::Other(s.to_string())
    }
}
