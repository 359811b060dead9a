//! Provider Clients
//!
//! HTTP acquisition layer for the two external collaborators: the
//! statistics endpoint and the preferences endpoint. Both are
//! authenticated GETs behind a bearer token supplied by the auth
//! collaborator.
//!
//! The provider is a trait so the dashboard controller can be tested
//! against an in-memory double.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::model::{Preferences, StatisticsPayload};

/// Errors terminal for a dashboard load attempt.
///
/// Preferences failures are deliberately not represented here: they
/// degrade silently to the prior threshold.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The auth collaborator was never wired up
    #[error("Authentication system not available")]
    AuthUnavailable,

    /// The user is not logged in
    #[error("Authentication required. Please log in to view statistics.")]
    AuthRequired,

    /// Logged in but no bearer token on hand
    #[error("Authentication token not available. Please log in again.")]
    TokenMissing,

    /// Network failure or non-2xx response
    #[error("Failed to fetch statistics{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Response parsed but required fields were missing
    #[error("Invalid data structure received from statistics API: {0}")]
    MalformedPayload(String),

    /// A newer load was issued while this one was in flight
    #[error("Load superseded by a newer request")]
    Superseded,

    /// A load is already running; the refresh control is disabled
    #[error("A dashboard load is already in progress")]
    LoadInProgress,
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// The authentication collaborator: login state and bearer token.
pub trait TokenAuth: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn token(&self) -> Option<String>;
}

/// Token sourced from config or the `WARDEN_API_TOKEN` environment
/// variable at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    token: Option<String>,
}

impl StaticTokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl TokenAuth for StaticTokenAuth {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Source of statistics and preferences data.
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Fetch the statistics payload. Any error is terminal for the load.
    async fn fetch_statistics(&self) -> LoadResult<StatisticsPayload>;

    /// Fetch user preferences. Errors here are non-fatal to the caller.
    async fn fetch_preferences(&self) -> LoadResult<Preferences>;
}

/// Configuration for the HTTP provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the warranty service, e.g. "http://localhost:8005"
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8005".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Provider backed by the real REST endpoints.
pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
    auth: Option<Box<dyn TokenAuth>>,
}

impl HttpProvider {
    /// Create a provider; `auth` is `None` when no auth collaborator is
    /// available, which fails every load with [`LoadError::AuthUnavailable`].
    pub fn new(config: ProviderConfig, auth: Option<Box<dyn TokenAuth>>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config, auth }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve the bearer token, surfacing the precise auth failure.
    fn bearer_token(&self) -> LoadResult<String> {
        let auth = self.auth.as_ref().ok_or(LoadError::AuthUnavailable)?;
        if !auth.is_authenticated() {
            return Err(LoadError::AuthRequired);
        }
        auth.token().ok_or(LoadError::TokenMissing)
    }

    async fn get_json(&self, url: &str, token: &str) -> LoadResult<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LoadError::Transport {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl StatisticsProvider for HttpProvider {
    async fn fetch_statistics(&self) -> LoadResult<StatisticsPayload> {
        let token = self.bearer_token()?;
        let url = format!("{}/api/statistics", self.config.base_url);

        tracing::debug!(url = %url, "Fetching statistics");
        let body = self.get_json(&url, &token).await?;

        let payload: StatisticsPayload = serde_json::from_str(&body)
            .map_err(|e| LoadError::MalformedPayload(e.to_string()))?;
        payload.validate().map_err(LoadError::MalformedPayload)?;

        Ok(payload)
    }

    async fn fetch_preferences(&self) -> LoadResult<Preferences> {
        let token = self.bearer_token()?;
        let url = format!("{}/api/auth/preferences", self.config.base_url);

        tracing::debug!(url = %url, "Fetching preferences");
        let body = self.get_json(&url, &token).await?;

        serde_json::from_str(&body).map_err(|e| LoadError::MalformedPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token_auth() {
        let auth = StaticTokenAuth::new(Some("secret".to_string()));
        assert!(auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("secret"));

        let missing = StaticTokenAuth::new(None);
        assert!(!missing.is_authenticated());
        assert_eq!(missing.token(), None);

        // Empty tokens count as missing
        let empty = StaticTokenAuth::new(Some(String::new()));
        assert!(!empty.is_authenticated());
    }

    #[test]
    fn test_bearer_token_error_taxonomy() {
        let no_auth = HttpProvider::new(ProviderConfig::default(), None);
        assert!(matches!(
            no_auth.bearer_token(),
            Err(LoadError::AuthUnavailable)
        ));

        let logged_out = HttpProvider::new(
            ProviderConfig::default(),
            Some(Box::new(StaticTokenAuth::new(None))),
        );
        assert!(matches!(
            logged_out.bearer_token(),
            Err(LoadError::AuthRequired)
        ));

        let logged_in = HttpProvider::new(
            ProviderConfig::default(),
            Some(Box::new(StaticTokenAuth::new(Some("t".to_string())))),
        );
        assert_eq!(logged_in.bearer_token().unwrap(), "t");
    }

    #[test]
    fn test_default_provider_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "http://localhost:8005");
        assert_eq!(config.request_timeout_ms, 10_000);
    }
}
