//! Grantmap - team × repository permission mapping for GitHub organizations.
//!
//! The library fetches every repository and team of an organization, probes
//! each (team, repository) pair for access, and assembles the results into a
//! [`MappingReport`] with three consistent views of the same grants. It can
//! also apply validated permission assignments in bulk.
//!
//! # Features
//!
//! - `github` (default) - the reqwest-backed [`github::GitHubClient`]. Without
//!   it, the mapping engine still runs against any [`OrgAccessClient`].
//!
//! # Example
//!
//! ```ignore
//! use grantmap::github::{ClientOptions, GitHubClient, DEFAULT_API_URL};
//! use grantmap::mapping::{build_mapping, render_summary, MappingOptions};
//!
//! let client = GitHubClient::new(DEFAULT_API_URL, &token, "acme", ClientOptions::default())?;
//! let report = build_mapping(&client, &MappingOptions::default(), None).await?;
//! print!("{}", render_summary(&report));
//! ```

pub mod assignment;
pub mod http;
pub mod mapping;
pub mod platform;
pub mod progress;

#[cfg(feature = "github")]
pub mod retry;

#[cfg(feature = "github")]
pub mod github;

pub use assignment::{AssignmentRequest, BulkOptions, BulkResult, ValidationError};
pub use mapping::{MappingOptions, MappingReport, SnapshotError};
pub use platform::{
    OrgAccessClient, PermissionGrant, PermissionLevel, PlatformError, Repository, Team,
};
pub use progress::{MappingProgress, ProgressCallback};
