//! Platform-agnostic types and the client trait the mapping engine runs on.
//!
//! # Example
//!
//! ```ignore
//! use grantmap::platform::{OrgAccessClient, PlatformError};
//!
//! async fn count_grants<C: OrgAccessClient>(client: &C) -> Result<usize, PlatformError> {
//!     let repos = client.list_repositories(None).await?;
//!     let mut granted = 0;
//!     for repo in &repos {
//!         if client.probe_access("developers", &repo.owner, &repo.name).await?.is_some() {
//!             granted += 1;
//!         }
//!     }
//!     Ok(granted)
//! }
//! ```

mod errors;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use types::{
    Capabilities, DetailLevel, OrgAccessClient, PermissionGrant, PermissionLevel, Repository,
    Team, UNKNOWN_ROLE, UnknownPermission, display_name_from_slug,
};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_platform_error_api() {
        let err = PlatformError::api(422, "Validation Failed");
        assert!(err.to_string().contains("API error (422)"));
        assert!(err.to_string().contains("Validation Failed"));
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_platform_error_not_found() {
        let err = PlatformError::not_found("orgs/acme");
        assert!(err.to_string().contains("Not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_platform_error_rate_limited() {
        let err = PlatformError::RateLimited {
            reset_at: Utc::now(),
            attempts: 6,
        };
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("after 6 attempts"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_platform_error_page_limit() {
        let err = PlatformError::PageLimitExceeded {
            resource: "acme/teams".to_string(),
            max_pages: 3,
        };
        assert!(err.to_string().contains("within 3 pages"));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = PlatformError::api(500, "boom\nstack trace");
        assert_eq!(short_error_message(&err), "API error (500): boom");
    }
}
