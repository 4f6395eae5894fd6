//! Core error types for the Botspace client.

use thiserror::Error;

/// Failures while resolving settings or touching the local state file.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required setting is missing or a flag value is out of range.
    /// The message is shown to the user as-is.
    #[error("{0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `--api-url` / `BOTSPACE_API_URL` is not an absolute URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to look for the account file in.
    #[error("Path error: {0}")]
    Path(String),

    /// The state file exists but is unreadable, malformed, or not writable.
    #[error("{0}")]
    State(String),
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
