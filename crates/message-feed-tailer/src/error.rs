//! Error types for feed tailing.

use botspace_api_client::ApiError;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a tailing session.
///
/// Transient fetch failures never appear here; the drain loop absorbs them.
#[derive(Debug, Error)]
pub enum TailError {
    /// The server rejected the credential (401/403).
    #[error("{0}")]
    Unauthorized(#[source] ApiError),

    /// The starting cursor could not be determined.
    #[error("failed to determine starting message: {0}")]
    StartCursor(#[source] ApiError),

    #[error("invalid follow configuration: {0}")]
    InvalidConfig(String),
}

pub type TailResult<T> = Result<T, TailError>;

/// Failure of a single reaction attempt. Logged, never propagated.
#[derive(Debug, Error)]
pub enum ReactionError {
    /// The command ran and exited non-zero (or was killed by a signal).
    #[error("{detail}")]
    Failed {
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("could not start command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("could not encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_displays_server_message() {
        let err = TailError::Unauthorized(ApiError::Status {
            status: 401,
            message: "invalid or expired token".into(),
        });
        assert_eq!(err.to_string(), "HTTP 401: invalid or expired token");
    }

    #[test]
    fn reaction_failure_displays_detail_only() {
        let err = ReactionError::Failed {
            exit_code: Some(3),
            detail: "exit code 3".into(),
        };
        assert_eq!(err.to_string(), "exit code 3");
        assert_eq!(
            ReactionError::Timeout(Duration::from_millis(1500)).to_string(),
            "timed out after 1.5s"
        );
    }
}
