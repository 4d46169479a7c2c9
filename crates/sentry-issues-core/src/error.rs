//! Error types for the Sentry MCP server.

use thiserror::Error;

/// Main error type for Sentry operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived (connect, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Sentry API returned a non-2xx status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Sentry API returned a body we could not decode
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied arguments that do not match the tool schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tool name or resource URI is not known
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an API error from a response status and raw body.
    ///
    /// Sentry reports failures as `{"detail": "..."}`. When the body carries
    /// a detail it becomes the message, otherwise a generic message naming
    /// the status code is used.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .filter(|d| !d.is_empty());

        Error::Api {
            status,
            message: detail
                .unwrap_or_else(|| format!("Request failed with status code {}", status)),
        }
    }

    /// Whether the error came from talking to the Sentry API.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. })
    }

    /// HTTP status of an upstream failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Caller-facing message for upstream failures.
    pub fn upstream_message(&self) -> String {
        let detail = match self {
            Error::Http(message) => message.as_str(),
            Error::Api { message, .. } => message.as_str(),
            other => return other.to_string(),
        };
        format!("Sentry API error: {}", detail)
    }
}

/// Result type alias for Sentry operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_detail() {
        let err = Error::from_status(404, r#"{"detail": "The requested resource does not exist"}"#);
        match &err {
            Error::Api { status, message } => {
                assert_eq!(*status, 404);
                assert_eq!(message, "The requested resource does not exist");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            err.upstream_message(),
            "Sentry API error: The requested resource does not exist"
        );
    }

    #[test]
    fn test_from_status_without_detail() {
        let err = Error::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(
            err.upstream_message(),
            "Sentry API error: Request failed with status code 502"
        );
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_from_status_empty_detail() {
        let err = Error::from_status(403, r#"{"detail": ""}"#);
        assert_eq!(
            err.upstream_message(),
            "Sentry API error: Request failed with status code 403"
        );
    }

    #[test]
    fn test_is_upstream() {
        assert!(Error::Http("timeout".into()).is_upstream());
        assert!(Error::from_status(500, "").is_upstream());
        assert!(!Error::InvalidData("bad json".into()).is_upstream());
        assert!(!Error::Validation("missing".into()).is_upstream());
        assert!(!Error::Config("missing".into()).is_upstream());
    }

    #[test]
    fn test_http_error_has_no_status() {
        let err = Error::Http("operation timed out".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.upstream_message(), "Sentry API error: operation timed out");
    }
}
