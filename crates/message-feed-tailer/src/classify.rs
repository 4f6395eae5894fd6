//! Fetch failure classification.

use botspace_api_client::ApiError;

/// What the drain loop does with a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// End the session and hand the error to the caller.
    Fatal,
    /// Warn, keep the cursor, sleep one interval, try again.
    Transient,
}

/// Only an authorization rejection is fatal. Transport errors, server errors
/// and malformed payloads are all retried.
pub fn classify(err: &ApiError) -> FailureClass {
    if err.is_auth_failure() {
        FailureClass::Fatal
    } else {
        FailureClass::Transient
    }
}
