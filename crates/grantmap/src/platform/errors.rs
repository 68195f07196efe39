use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to the organization API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The API answered with an unsuccessful status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit still in force after the retry budget was spent.
    #[error("Rate limit exceeded after {attempts} attempts. Resets at {reset_at}")]
    RateLimited {
        reset_at: DateTime<Utc>,
        attempts: u32,
    },

    /// Authentication required or failed.
    #[error("Authentication failed: {message}")]
    AuthRequired { message: String },

    /// Resource not found (org, team, repo).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// A list endpoint kept returning full pages past the page ceiling.
    #[error("Pagination for {resource} did not terminate within {max_pages} pages")]
    PageLimitExceeded { resource: String, max_pages: u32 },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    /// Create an API error.
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if this error is a rate limit error.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status carried by the error, if the API produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::AuthRequired { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps multi-line API
/// bodies out of progress lines.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
