//! Completion backend error types

use thiserror::Error;

/// Errors from the completion backend boundary
///
/// `Configuration` is a server-side setup problem and must never be shown
/// verbatim to an end user. `Upstream`/`Api`/`EmptyResponse` are retryable
/// from the caller's point of view; this crate itself never retries.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion backend is not configured: {0}")]
    Configuration(String),

    #[error("upstream network error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("empty response from completion backend")]
    EmptyResponse,
}

impl CompletionError {
    /// Whether a caller may reasonably retry the request later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::Upstream(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            // Callers treat an empty answer the same as an upstream failure
            Self::EmptyResponse => true,
        }
    }
}
