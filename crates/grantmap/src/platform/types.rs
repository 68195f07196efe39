use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressCallback;

use super::errors::Result;

/// A repository owned by the organization, as fetched at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Platform numeric ID.
    pub id: u64,
    /// Repository name (unique within the organization).
    pub name: String,
    /// Fully-qualified `owner/name`.
    pub full_name: String,
    /// Whether the repository is private.
    pub private: bool,
    /// Repository description.
    pub description: Option<String>,
    /// Default branch name.
    pub default_branch: String,
    /// When the repository was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the repository was last updated.
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning account login.
    pub owner: String,
}

/// A team within the organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Platform numeric ID.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Stable lowercase-hyphenated key used in every cross-reference.
    pub slug: String,
    /// Team description.
    pub description: Option<String>,
    /// Privacy mode (`closed`, `secret`).
    pub privacy: String,
    /// Organization-default permission label.
    pub permission: String,
    /// Number of members.
    pub members_count: u32,
    /// Number of repositories the team can reach.
    pub repos_count: u32,
    /// When the team was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the team was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Team {
    /// The authoritative team name, or the slug-derived fallback when the
    /// upstream record carried an empty name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            display_name_from_slug(&self.slug)
        } else {
            self.name.clone()
        }
    }
}

/// Approximate a team display name from its slug.
///
/// Fallback only: `platform-infra` becomes `Platform Infra`, which may not
/// match the real name (casing, punctuation and spaces are lost in slugs).
#[must_use]
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The five independent capability flags of a grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
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

impl Capabilities {
    /// Read access only.
    #[must_use]
    pub fn pull_only() -> Self {
        Self {
            pull: true,
            ..Self::default()
        }
    }

    /// Names of the flags that are set, highest tier first.
    #[must_use]
    pub fn granted(&self) -> Vec<&'static str> {
        [
            ("admin", self.admin),
            ("maintain", self.maintain),
            ("push", self.push),
            ("triage", self.triage),
            ("pull", self.pull),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Whether a grant's flags are individually known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Flags were read from the API response.
    Detailed,
    /// Only "some access" is known; read access is assumed.
    Basic,
}

impl DetailLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Basic => "basic",
        }
    }
}

/// Evidence that a team has access to a repository.
///
/// Serializes with the field names of a snapshot's `permissions_matrix`
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub team_slug: String,
    /// Best-effort display name (see [`display_name_from_slug`]).
    pub team_name: String,
    pub repo_name: String,
    pub repo_full_name: String,
    #[serde(rename = "permission_level")]
    pub detail_level: DetailLevel,
    pub role_name: String,
    pub permissions: Capabilities,
}

/// Role label used when the API does not name one.
pub const UNKNOWN_ROLE: &str = "unknown";

impl PermissionGrant {
    /// A grant whose flags came from the API response.
    #[must_use]
    pub fn detailed(
        team_slug: &str,
        repo_name: &str,
        repo_full_name: impl Into<String>,
        role_name: Option<String>,
        permissions: Capabilities,
    ) -> Self {
        Self {
            team_slug: team_slug.to_string(),
            team_name: display_name_from_slug(team_slug),
            repo_name: repo_name.to_string(),
            repo_full_name: repo_full_name.into(),
            detail_level: DetailLevel::Detailed,
            role_name: role_name.unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
            permissions,
        }
    }

    /// A grant known only to exist; carries read access and nothing else.
    #[must_use]
    pub fn basic(team_slug: &str, owner: &str, repo_name: &str) -> Self {
        Self {
            team_slug: team_slug.to_string(),
            team_name: display_name_from_slug(team_slug),
            repo_name: repo_name.to_string(),
            repo_full_name: format!("{owner}/{repo_name}"),
            detail_level: DetailLevel::Basic,
            role_name: UNKNOWN_ROLE.to_string(),
            permissions: Capabilities::pull_only(),
        }
    }

    /// Replace the slug-derived display name with an authoritative one.
    #[must_use]
    pub fn with_team_name(mut self, name: impl Into<String>) -> Self {
        self.team_name = name.into();
        self
    }
}

/// Target permission level of a write, ordered from least to most access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

impl PermissionLevel {
    /// Every accepted level, in ascending order.
    pub const ALL: [PermissionLevel; 5] = [
        PermissionLevel::Pull,
        PermissionLevel::Triage,
        PermissionLevel::Push,
        PermissionLevel::Maintain,
        PermissionLevel::Admin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Triage => "triage",
            Self::Push => "push",
            Self::Maintain => "maintain",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a permission label outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid permission '{0}' (expected one of: pull, triage, push, maintain, admin)")]
pub struct UnknownPermission(pub String);

impl FromStr for PermissionLevel {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Client for the organization endpoints the mapping engine depends on.
///
/// Implementations own pagination, rate-limit handling and error
/// classification; callers see only ordered collections, probe outcomes and
/// write results.
#[async_trait]
pub trait OrgAccessClient: Send + Sync {
    /// The organization this client is bound to.
    fn organization(&self) -> &str;

    /// List every repository of the organization, in upstream page order.
    async fn list_repositories(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Repository>>;

    /// List every team of the organization, in upstream page order.
    async fn list_teams(&self, on_progress: Option<&ProgressCallback>) -> Result<Vec<Team>>;

    /// Check whether a team can access a repository.
    ///
    /// `Ok(None)` means the team has no access; errors are reserved for
    /// failed requests.
    async fn probe_access(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Option<PermissionGrant>>;

    /// Create or update a team's permission on a repository.
    async fn set_permission(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
        level: PermissionLevel,
    ) -> Result<()>;
}
