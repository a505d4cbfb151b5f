use http_client::HttpError;
use thiserror::Error;

/// Errors produced while decoding a typed value from its wire form
///
/// Every malformed input maps to one of these variants. Decoding never
/// panics on unexpected JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(String),

    /// The top-level value was not a JSON array
    #[error("Expected a JSON array of typed values")]
    NotAnArray,

    /// The array did not hold exactly one typed value
    #[error("Expected exactly one typed value, found {0}")]
    NotSingleElement(usize),

    /// The typed value was not a JSON object
    #[error("Expected a JSON object")]
    NotAnObject,

    /// The `type` discriminant was absent or not a string
    #[error("Missing type discriminant")]
    MissingType,

    /// The field named by the discriminant was absent or null
    #[error("Missing value field for type '{0}'")]
    MissingField(String),

    /// The value field did not have the shape its tag requires
    #[error("Invalid payload for type '{tag}': {reason}")]
    InvalidPayload {
        /// Wire tag being decoded
        tag: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// The discriminant names a type this codec does not know
    #[error("Unsupported value type '{0}'")]
    UnsupportedType(String),
}

impl DecodeError {
    pub(crate) fn invalid(tag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the value was well formed but of a type this codec does not handle
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DecodeError::UnsupportedType(_))
    }
}

/// Error produced when a value cannot be rendered to its wire form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to encode '{tag}' value: {reason}")]
pub struct EncodeError {
    /// Wire tag being encoded
    pub tag: String,
    /// Underlying serializer message
    pub reason: String,
}

/// High-level API errors for KEF speaker operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The response held a typed value that failed to decode
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The response body had an unexpected structure
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
