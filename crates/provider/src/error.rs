//! Error types for provider operations.

use thiserror::Error;

/// Errors that can occur while talking to the sentiment provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Fetch(err.to_string())
    }
}

impl ProviderError {
    /// Returns true for login rejections, which abandon the pass after one
    /// re-login attempt rather than being retried by the caller.
    pub fn is_auth(&self) -> bool {
        matches!(self, ProviderError::Auth(_))
    }
}
