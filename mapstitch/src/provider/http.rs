//! HTTP client abstraction for testability.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::config::FetchConfig;
use crate::fetch::FetchError;

/// One HTTP GET response, reduced to what the tile fetcher needs.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Type` header value, if present.
    pub content_type: Option<String>,
    /// Full response body.
    pub body: Bytes,
}

impl TileResponse {
    /// Whether the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The declared media type with any parameters (charset etc.) stripped.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(str::trim)
    }
}

/// Trait for async HTTP GET operations.
///
/// This abstraction allows dependency injection: production code uses
/// [`ReqwestClient`], tests use a mock that records calls and never touches
/// the network.
pub trait AsyncHttpClient: Send + Sync {
    /// Perform an HTTP GET and buffer the full response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<TileResponse, FetchError>> + Send;
}

impl<C: AsyncHttpClient> AsyncHttpClient for Arc<C> {
    fn get(&self, url: &str) -> impl Future<Output = Result<TileResponse, FetchError>> + Send {
        (**self).get(url)
    }
}

/// Real HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Build a client with the total-timeout bound from `config`.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<TileResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        Ok(TileResponse {
            status,
            content_type,
            body,
        })
    }
}
