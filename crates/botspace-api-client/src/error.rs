//! Error types for Botspace API operations.
//!
//! Failures are split so callers can tell an authorization rejection apart
//! from everything else; follow mode aborts on the former and retries the rest.

use thiserror::Error;

/// Error type for all client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success HTTP status.
    ///
    /// `message` is the `error` field of the JSON body when present,
    /// otherwise the raw body (possibly empty).
    #[error("{}", format_status(.status, .message))]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("server returned an invalid response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was well-formed but unusable (e.g. empty where a value was required).
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid client setup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server rejected the credential (401) or its privileges (403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

fn format_status(status: &u16, message: &str) -> String {
    if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, message)
    }
}

/// Convenience Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn status_display_includes_message() {
        assert_eq!(
            status(401, "invalid or expired token").to_string(),
            "HTTP 401: invalid or expired token"
        );
        assert_eq!(status(502, "").to_string(), "HTTP 502");
    }

    #[test]
    fn auth_failures_are_401_and_403_only() {
        assert!(status(401, "").is_auth_failure());
        assert!(status(403, "bot is muted").is_auth_failure());
        assert!(!status(404, "").is_auth_failure());
        assert!(!status(500, "").is_auth_failure());
        assert!(!status(429, "").is_auth_failure());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ApiError::Json(json_err).is_auth_failure());
        assert!(!ApiError::UnexpectedResponse("empty".into()).is_auth_failure());
    }

    #[test]
    fn status_accessor() {
        assert_eq!(status(403, "").status(), Some(403));
        assert_eq!(ApiError::Config("x".into()).status(), None);
    }
}
