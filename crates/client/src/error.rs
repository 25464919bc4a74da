//! Client error types

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Fallback message when neither the body nor the status carries one
const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// A failed API call: the status and whatever body the server sent back
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    pub body: Value,
}

impl ApiFailure {
    /// Build a failure from a status and parsed body.
    ///
    /// The message prefers the body's `message` field, then the status
    /// reason phrase.
    pub fn new(status: StatusCode, body: Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned());

        Self {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(ApiFailure),

    /// Authentication failed or session expired
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ApiFailure),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(ApiFailure),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(ApiFailure),

    /// Server returned any other error status
    #[error("Server error {}: {}", .0.status, .0)]
    ServerError(ApiFailure),

    /// Server answered 2xx but reported `success: false`
    #[error("Request rejected: {0}")]
    Rejected(ApiFailure),

    /// Signed in, but the account lacks the role the operation needs
    #[error("{0}")]
    AccessDenied(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Create error from HTTP status code and parsed body
    pub fn from_status(status: StatusCode, body: Value) -> Self {
        let failure = ApiFailure::new(status, body);
        match status.as_u16() {
            400 => Self::BadRequest(failure),
            401 => Self::AuthenticationFailed(failure),
            403 => Self::Forbidden(failure),
            404 => Self::NotFound(failure),
            _ => Self::ServerError(failure),
        }
    }

    /// Create an error for a 2xx body whose `success` flag is not set
    pub fn rejected(body: Value) -> Self {
        Self::Rejected(ApiFailure::new(StatusCode::OK, body))
    }

    /// The API failure behind this error, if the server answered at all
    pub const fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::BadRequest(failure)
            | Self::AuthenticationFailed(failure)
            | Self::Forbidden(failure)
            | Self::NotFound(failure)
            | Self::ServerError(failure)
            | Self::Rejected(failure) => Some(failure),
            _ => None,
        }
    }

    /// HTTP status attached to the error
    pub fn status(&self) -> Option<u16> {
        self.failure()
            .map(|failure| failure.status)
            .or_else(|| match self {
                Self::Request(err) => err.status().map(|status| status.as_u16()),
                _ => None,
            })
    }

    /// Parsed response body attached to the error
    pub fn body(&self) -> Option<&Value> {
        self.failure().map(|failure| &failure.body)
    }

    /// Whether the session is gone and the user has to sign in again
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_prefers_body_over_reason() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "message": "Email already registered"}),
        );
        assert!(matches!(err, ClientError::BadRequest(_)));
        assert_eq!(err.to_string(), "Bad request: Email already registered");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn message_falls_back_to_reason_phrase() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, Value::Null);
        assert!(err.is_auth_expired());
        assert_eq!(err.failure().unwrap().message, "Unauthorized");
        assert_eq!(err.body(), Some(&Value::Null));
    }

    #[test]
    fn unknown_status_without_reason_uses_default() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = ClientError::from_status(status, Value::String(String::new()));
        assert!(matches!(err, ClientError::ServerError(_)));
        assert_eq!(err.failure().unwrap().message, DEFAULT_FAILURE_MESSAGE);
        assert_eq!(err.status(), Some(599));
    }

    #[test]
    fn rejected_keeps_server_message() {
        let err = ClientError::rejected(json!({"success": false, "message": "Upload failed"}));
        assert_eq!(err.to_string(), "Request rejected: Upload failed");
        assert!(!err.is_auth_expired());
    }
}
