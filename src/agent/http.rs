//! HTTP client for the agent backend.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{AgentClient, AgentReply, ChatReplyBody, ChatRequest, HealthBanner, Route};
use crate::config::BackendConfig;
use crate::error::{AgentError, Result};

/// reqwest-backed [`AgentClient`].
///
/// # Example
///
/// ```rust,no_run
/// use shop_assistant_widget::agent::{AgentClient, HttpAgentClient, Route};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpAgentClient::new("http://localhost:8000")?;
/// let reply = client.send(&Route::NewSession, "show me headphones").await?;
/// println!("{} (thread {})", reply.text, reply.thread_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpAgentClient {
    /// Create a client with reqwest defaults (no request timeout).
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(AgentError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { base_url, http })
    }

    /// Create a client from the `backend` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(&config.base_url, http)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probe the backend root endpoint.
    pub async fn health(&self) -> Result<HealthBanner> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        let body = Self::success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| AgentError::MalformedResponse(e.to_string()))
    }

    /// Read the body of a successful response, or turn the status into an error.
    async fn success_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(AgentError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait::async_trait]
impl AgentClient for HttpAgentClient {
    async fn send(&self, route: &Route, message: &str) -> Result<AgentReply> {
        let url = route.url(&self.base_url)?;
        debug!(name: "agent.request", url = %url, "POST chat message");

        // `.json` sets `Content-Type: application/json`.
        let response = self
            .http
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        let decoded: ChatReplyBody = serde_json::from_str(&body)
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

        AgentReply::resolve(route, decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_base() {
        let err = HttpAgentClient::new("not a url").unwrap_err();
        assert_eq!(err.kind(), "invalid_url");
    }

    #[test]
    fn test_rejects_cannot_be_a_base() {
        assert!(HttpAgentClient::new("data:text/plain,hi").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig {
            base_url: "http://localhost:8000".into(),
            request_timeout_secs: 5,
        };
        let client = HttpAgentClient::from_config(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }
}
