//! GitHub API wire types.
//!
//! Only the fields the mapper reads are modelled; unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account that owns a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// Repository entry from `GET /orgs/{org}/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub owner: GitHubOwner,
}

/// Team entry from `GET /orgs/{org}/teams`.
///
/// The list endpoint omits counts and timestamps; they are only present on
/// the single-team endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubTeam {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub members_count: Option<u32>,
    #[serde(default)]
    pub repos_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Capability flags as GitHub reports them; absent flags read as false.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GitHubPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub maintain: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub triage: bool,
    #[serde(default)]
    pub pull: bool,
}

/// Body of a 200 from
/// `GET /orgs/{org}/teams/{team_slug}/repos/{owner}/{repo}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRepoResponse {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<GitHubPermissions>,
}

/// Body of `PUT /orgs/{org}/teams/{team_slug}/repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize)]
pub struct SetPermissionBody<'a> {
    pub permission: &'a str,
}
