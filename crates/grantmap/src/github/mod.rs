//! GitHub API client for organization access operations.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Wire types for the endpoints in use
//! - [`client`] - Client creation and the rate-limit-aware executor
//! - `pagination` - Page-by-page collection fetching
//! - `access` - Probe and write operations, plus the [`OrgAccessClient`] impl
//! - `convert` - Wire type to platform type conversion
//!
//! [`OrgAccessClient`]: crate::platform::OrgAccessClient
//!
//! # Example
//!
//! ```ignore
//! use grantmap::github::{ClientOptions, GitHubClient, DEFAULT_API_URL};
//! use grantmap::mapping::{build_mapping, MappingOptions};
//!
//! let client = GitHubClient::new(DEFAULT_API_URL, &token, "acme", ClientOptions::default())?;
//! let report = build_mapping(&client, &MappingOptions::default(), None).await?;
//! ```

mod access;
pub mod client;
mod convert;
pub mod error;
mod pagination;
pub mod types;

pub use client::{
    API_VERSION, ClientOptions, DEFAULT_API_URL, DEFAULT_MAX_PAGES,
    DEFAULT_MAX_RATE_LIMIT_RETRIES, GitHubClient, RateLimitSignal, detect_rate_limit,
};
pub use convert::{DEFAULT_TEAM_PERMISSION, to_repository, to_team};
pub use error::GitHubError;
pub use pagination::{PAGE_SIZE, PaginatedFetchConfig};
