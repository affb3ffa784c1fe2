//! Errors from the generative-language collaborator.

use thiserror::Error;

/// Result type alias for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Everything a generation request can fail with.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key configured.
    #[error("AI integration is not configured")]
    NotConfigured,

    /// Transport failure (connect, timeout, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// The API answered but produced no text.
    #[error("the model returned no text{}", .reason.as_ref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyResponse {
        /// Finish or block reason, when the API gave one.
        reason: Option<String>,
    },
}
