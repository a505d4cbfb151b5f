//! Error types for the HTTP client

use thiserror::Error;

/// Errors that can occur while talking to a speaker over HTTP
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection or protocol level failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The speaker answered with a non-success status code
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The underlying client could not be built
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl HttpError {
    /// Whether this error was caused by a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HttpError::Timeout
        } else if let Some(status) = error.status() {
            HttpError::Status(status.as_u16())
        } else {
            HttpError::Network(error.to_string())
        }
    }
}
