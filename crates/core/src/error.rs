//! Unified error types for the Stellar Photos relay.
//!
//! Every outbound call (image fetch, Unsplash, OAuth, uploads) reports failures
//! through [`Error`]. [`HttpError`] is the classified, outward-facing shape the
//! server renders as `{"detail": ...}` with a status code.

use std::fmt;

use serde::Serialize;

use crate::config::ConfigError;

/// Unified error types for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid request parameters (missing query values, unsafe cache paths).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Outbound request exceeded its timeout.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Outbound request failed before a response arrived.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// External API answered with a status other than 200.
    #[error("UPSTREAM_ERROR: {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Fetched bytes are not an allowed image type.
    #[error("UNSUPPORTED_MIME_TYPE: {0}")]
    UnsupportedMimeType(String),

    /// External API response could not be decoded.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// Image cache read or write failed.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Required configuration is absent or invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

/// A classified failure ready to be shown to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpError {
    /// Status code reused as the outward response status.
    #[serde(skip)]
    pub status: u16,

    /// Human-readable message.
    pub detail: String,

    /// Wrapped cause, such as an upstream response body.
    #[serde(skip)]
    pub cause: Option<String>,
}

impl HttpError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into(), cause: None }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} : {}", self.detail, cause),
            None => f.write_str(&self.detail),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => HttpError::new(400, msg),
            Error::Timeout(msg) => HttpError::new(408, msg),
            Error::Upstream { status, body } => HttpError::new(
                status,
                format!("{status}: request to external API produced an error response"),
            )
            .with_cause(body),
            Error::UnsupportedMimeType(mime) => HttpError::new(
                422,
                format!("only image/jpeg and image/png mime types are supported, got {mime}"),
            ),
            Error::Network(msg) | Error::Decode(msg) | Error::Cache(msg) => HttpError::new(500, msg),
            Error::Config(e) => HttpError::new(500, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Upstream { status: 404, body: "not found".to_string() };
        assert!(err.to_string().contains("UPSTREAM_ERROR"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_upstream_classification() {
        let http: HttpError = Error::Upstream { status: 404, body: "not found".to_string() }.into();
        assert_eq!(http.status, 404);
        assert!(http.detail.contains("404"));
        assert_eq!(http.cause.as_deref(), Some("not found"));
        assert!(http.to_string().ends_with(" : not found"));
    }

    #[test]
    fn test_timeout_is_408() {
        let http: HttpError = Error::Timeout("slow".to_string()).into();
        assert_eq!(http.status, 408);
        assert_eq!(http.to_string(), "slow");
    }

    #[test]
    fn test_network_is_not_408() {
        let http: HttpError = Error::Network("connection refused".to_string()).into();
        assert_eq!(http.status, 500);
    }

    #[test]
    fn test_unsupported_mime_is_422() {
        let http: HttpError = Error::UnsupportedMimeType("image/gif".to_string()).into();
        assert_eq!(http.status, 422);
        assert!(http.detail.contains("image/gif"));
    }

    #[test]
    fn test_missing_config_is_500() {
        let err = Error::from(ConfigError::Missing { field: "unsplash.access_key".into(), hint: "set it".into() });
        let http: HttpError = err.into();
        assert_eq!(http.status, 500);
        assert!(http.detail.contains("unsplash.access_key"));
    }

    #[test]
    fn test_body_serializes_detail_only() {
        let http = HttpError::new(404, "gone").with_cause("body");
        let json = serde_json::to_value(&http).unwrap();
        assert_eq!(json, serde_json::json!({ "detail": "gone" }));
    }
}
