//! # AI Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Generation Failures                                 │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Content             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NotConfigured  │  │  Request        │  │  MalformedResponse      │ │
//! │  │                 │  │  Status         │  │  EmptyResult            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries a message fit to show the user; the API layer
//! passes it through as-is.

use thiserror::Error;

/// Result type alias for generation operations.
pub type AiResult<T> = Result<T, AiError>;

/// Ways a generation request can fail.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key was configured for the generation service.
    #[error("AI generation is not configured on this server")]
    NotConfigured,

    /// The request never got a response (DNS, TLS, timeout, ...).
    #[error("Could not reach the AI service: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("AI service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response didn't contain the expected JSON.
    #[error("AI service returned an unexpected response: {0}")]
    MalformedResponse(String),

    /// The response parsed, but no usable card survived filtering.
    #[error("AI service did not return any usable flashcards")]
    EmptyResult,
}

impl AiError {
    /// Returns true if trying again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Request(_) => true,
            AiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Request("request timed out".to_string())
        } else if err.is_decode() {
            AiError::MalformedResponse(err.to_string())
        } else {
            AiError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::MalformedResponse(err.to_string())
    }
}
