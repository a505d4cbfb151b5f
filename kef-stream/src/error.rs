//! Error types for the kef-stream crate.

use std::time::Duration;

use kef_api::HttpError;

/// Errors from registering a subscription set with the speaker.
///
/// Registration failures are fatal to client construction. Nothing at this
/// layer retries; callers decide whether to try connecting again.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The registration request did not complete
    #[error("Registration request failed: {0}")]
    Transport(#[from] HttpError),

    /// The response body was not a JSON string literal
    #[error("Invalid registration response: {0}")]
    InvalidResponse(String),

    /// The speaker answered with an empty session id
    #[error("Speaker returned an empty session id")]
    EmptySession,

    /// The subscription list could not be serialised
    #[error("Failed to encode subscriptions: {0}")]
    Encode(String),
}

/// A failed poll cycle. Retried until the consecutive error ceiling is hit.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The poll request failed at the HTTP layer
    #[error("Poll request failed: {0}")]
    Http(#[from] HttpError),

    /// The poll request exceeded the per-cycle deadline
    #[error("Poll request timed out after {0:?}")]
    Timeout(Duration),

    /// The poll response was not a JSON array of records
    #[error("Invalid poll response: {0}")]
    Parse(String),
}

/// Errors surfaced by the event stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Session registration failed while connecting
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// `run` was called while the poll loop was already running
    #[error("Poll loop is already running for this session")]
    AlreadyRunning,

    /// The cancellation token fired
    #[error("Event stream cancelled")]
    Cancelled,

    /// Too many poll cycles failed back to back
    #[error("Giving up after {count} consecutive poll failures: {last}")]
    TooManyErrors {
        /// Number of consecutive failures
        count: u32,
        /// The failure that hit the ceiling
        #[source]
        last: TransportError,
    },

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StreamError {
    /// Whether the stream stopped because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

/// Convenience type alias for Results using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_registration_error_display() {
        let error = RegistrationError::EmptySession;
        assert_eq!(error.to_string(), "Speaker returned an empty session id");

        let error = RegistrationError::Transport(HttpError::Status(404));
        assert_eq!(
            error.to_string(),
            "Registration request failed: Unexpected HTTP status: 404"
        );
    }

    #[test]
    fn test_too_many_errors_keeps_source() {
        let error = StreamError::TooManyErrors {
            count: 5,
            last: TransportError::Timeout(Duration::from_secs(15)),
        };
        assert!(error.to_string().starts_with("Giving up after 5 consecutive poll failures"));
        let source = error.source().expect("source");
        assert_eq!(source.to_string(), "Poll request timed out after 15s");
    }

    #[test]
    fn test_error_conversion_from_registration_error() {
        let error: StreamError = RegistrationError::EmptySession.into();
        assert!(matches!(error, StreamError::Registration(RegistrationError::EmptySession)));
        assert!(!error.is_cancelled());
        assert!(StreamError::Cancelled.is_cancelled());
    }
}
