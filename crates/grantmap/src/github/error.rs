//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;
use crate::platform::PlatformError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// API returned an unsuccessful status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rate-limit rejections persisted past the retry bound.
    #[error("Rate limit exceeded after {attempts} attempts. Resets at {reset_at}")]
    RateLimitExhausted {
        attempts: u32,
        reset_at: DateTime<Utc>,
    },

    /// A list endpoint never returned a short page.
    #[error("Pagination for {resource} did not terminate within {max_pages} pages")]
    PageLimitExceeded { resource: String, max_pages: u32 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Unexpected/internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GitHubError {
    /// Whether the failure happened below HTTP (connection, timeout) and may
    /// succeed on a plain retry.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<HttpError> for GitHubError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Transport(message) => Self::Transport(message),
            // A missing mock is a test wiring bug, never worth retrying.
            other @ HttpError::NoMockResponse { .. } => Self::Internal(other.to_string()),
        }
    }
}

impl From<GitHubError> for PlatformError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Transport(message) => PlatformError::Network { message },
            GitHubError::Json(e) => PlatformError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            GitHubError::Api { status, message } => match status {
                401 => PlatformError::AuthRequired { message },
                404 => PlatformError::NotFound { resource: message },
                _ => PlatformError::Api { status, message },
            },
            GitHubError::RateLimitExhausted { attempts, reset_at } => {
                PlatformError::RateLimited { reset_at, attempts }
            }
            GitHubError::PageLimitExceeded {
                resource,
                max_pages,
            } => PlatformError::PageLimitExceeded {
                resource,
                max_pages,
            },
            GitHubError::Config(message) | GitHubError::Internal(message) => {
                PlatformError::Internal { message }
            }
        }
    }
}
