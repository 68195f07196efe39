use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{Capabilities, DetailLevel, PermissionGrant};

use super::keyed::Keyed;

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total_repositories: usize,
    pub total_teams: usize,
    pub total_permissions_checked: usize,
    pub total_access_granted: usize,
}

/// A team entry in a repository's access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAccessEntry {
    pub team_slug: String,
    pub team_name: String,
    pub role_name: String,
    pub permissions: Capabilities,
}

/// By-repository view of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAccess {
    pub id: u64,
    pub full_name: String,
    pub private: bool,
    pub description: Option<String>,
    pub default_branch: String,
    pub teams_with_access: Vec<TeamAccessEntry>,
}

/// A repository entry in a team's access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAccessEntry {
    pub repo_name: String,
    pub repo_full_name: String,
    pub role_name: String,
    pub permissions: Capabilities,
}

/// By-team view of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAccess {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub privacy: String,
    pub default_permission: String,
    pub members_count: u32,
    pub repos_count: u32,
    pub repositories_with_access: Vec<RepositoryAccessEntry>,
}

/// The complete team × repository access picture of one organization.
///
/// The same grants are held three ways: the flat `permissions_matrix`, the
/// by-repository view keyed by repository name, and the by-team view keyed by
/// slug. Keyed views serialize in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub organization: String,
    pub generated_at: DateTime<Utc>,
    pub summary: MappingSummary,
    pub repositories: Keyed<RepositoryAccess>,
    pub teams: Keyed<TeamAccess>,
    pub permissions_matrix: Vec<PermissionGrant>,
}

impl MappingReport {
    /// Describe every way the three views or the counters disagree.
    ///
    /// Empty for any report produced by the matrix builder; useful for
    /// snapshots loaded from disk.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let summary = &self.summary;

        if summary.total_repositories != self.repositories.len() {
            issues.push(format!(
                "total_repositories is {} but {} repositories are listed",
                summary.total_repositories,
                self.repositories.len()
            ));
        }
        if summary.total_teams != self.teams.len() {
            issues.push(format!(
                "total_teams is {} but {} teams are listed",
                summary.total_teams,
                self.teams.len()
            ));
        }
        match summary.total_teams.checked_mul(summary.total_repositories) {
            Some(expected) if expected == summary.total_permissions_checked => {}
            Some(_) => issues.push(format!(
                "total_permissions_checked is {} but {} teams x {} repositories were expected",
                summary.total_permissions_checked, summary.total_teams, summary.total_repositories
            )),
            None => issues.push(format!(
                "total_teams x total_repositories overflows ({} x {})",
                summary.total_teams, summary.total_repositories
            )),
        }
        if summary.total_access_granted != self.permissions_matrix.len() {
            issues.push(format!(
                "total_access_granted is {} but the matrix holds {} grants",
                summary.total_access_granted,
                self.permissions_matrix.len()
            ));
        }

        for grant in &self.permissions_matrix {
            let pair = format!("{} -> {}", grant.team_slug, grant.repo_name);

            if grant.detail_level == DetailLevel::Basic
                && grant.permissions != Capabilities::pull_only()
            {
                issues.push(format!("{pair}: basic grant carries more than pull"));
            }

            match self.repositories.get(&grant.repo_name) {
                None => issues.push(format!("{pair}: repository is not listed")),
                Some(repo) => {
                    let entries: Vec<_> = repo
                        .teams_with_access
                        .iter()
                        .filter(|e| e.team_slug == grant.team_slug)
                        .collect();
                    match entries.as_slice() {
                        [entry] if entry.permissions == grant.permissions => {}
                        [_] => issues.push(format!(
                            "{pair}: repository view has different permissions"
                        )),
                        _ => issues.push(format!(
                            "{pair}: repository view lists the team {} times",
                            entries.len()
                        )),
                    }
                }
            }

            match self.teams.get(&grant.team_slug) {
                None => issues.push(format!("{pair}: team is not listed")),
                Some(team) => {
                    let entries: Vec<_> = team
                        .repositories_with_access
                        .iter()
                        .filter(|e| e.repo_name == grant.repo_name)
                        .collect();
                    match entries.as_slice() {
                        [entry] if entry.permissions == grant.permissions => {}
                        [_] => issues.push(format!("{pair}: team view has different permissions")),
                        _ => issues.push(format!(
                            "{pair}: team view lists the repository {} times",
                            entries.len()
                        )),
                    }
                }
            }
        }

        let repo_entries: usize = self
            .repositories
            .values()
            .map(|r| r.teams_with_access.len())
            .sum();
        let team_entries: usize = self
            .teams
            .values()
            .map(|t| t.repositories_with_access.len())
            .sum();
        if repo_entries != self.permissions_matrix.len() {
            issues.push(format!(
                "repository view holds {} entries for {} grants",
                repo_entries,
                self.permissions_matrix.len()
            ));
        }
        if team_entries != self.permissions_matrix.len() {
            issues.push(format!(
                "team view holds {} entries for {} grants",
                team_entries,
                self.permissions_matrix.len()
            ));
        }

        issues
    }

    pub fn is_consistent(&self) -> bool {
        self.consistency_issues().is_empty()
    }
}
