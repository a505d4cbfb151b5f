//! Private HTTP client for KEF speaker communication
//!
//! This crate provides a minimal GET-with-query client for the JSON API that
//! KEF network speakers expose on port 80. Higher layers talk to it through
//! the [`Transport`] trait so the event stream can be driven by a scripted
//! transport in tests.

mod error;

pub use error::HttpError;

use async_trait::async_trait;
use std::time::Duration;

/// Default timeout for establishing a TCP connection to a speaker
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Abstraction over the request/response plumbing used by the event stream.
///
/// Implementations issue a GET for `path` (relative to the speaker's base URL)
/// with the given query parameters and return the raw response body.
///
/// No overall request timeout is imposed here. Long-poll callers bound each
/// request themselves.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and return the response body
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, HttpError>;
}

/// A minimal HTTP client for KEF speaker communication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the speaker at `host` (an IP address or hostname,
    /// optionally with a port)
    pub fn new(host: &str) -> Result<Self, HttpError> {
        Self::with_base_url(format!("http://{}", host))
    }

    /// Create a client rooted at an explicit base URL such as `http://10.0.0.5:8080`
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Config(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a client around an already configured reqwest client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL every request path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, HttpError> {
        let url = self.url_for(path);
        tracing::trace!(url = %url, "GET");

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))
    }
}
