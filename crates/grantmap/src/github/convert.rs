//! Conversion from GitHub wire types to platform types.

use crate::platform::{Capabilities, PermissionGrant, Repository, Team};

use super::types::{GitHubPermissions, GitHubRepo, GitHubTeam, TeamRepoResponse};

/// Team permission reported when the list endpoint leaves it out.
pub const DEFAULT_TEAM_PERMISSION: &str = "pull";

/// Convert a GitHub repository to a platform-agnostic [`Repository`].
pub fn to_repository(repo: GitHubRepo) -> Repository {
    Repository {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        private: repo.private,
        description: repo.description,
        default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        owner: repo.owner.login,
    }
}

/// Convert a GitHub team to a platform-agnostic [`Team`].
pub fn to_team(team: GitHubTeam) -> Team {
    Team {
        id: team.id,
        name: team.name,
        slug: team.slug,
        description: team.description,
        privacy: team.privacy.unwrap_or_else(|| "closed".to_string()),
        permission: team
            .permission
            .unwrap_or_else(|| DEFAULT_TEAM_PERMISSION.to_string()),
        members_count: team.members_count.unwrap_or(0),
        repos_count: team.repos_count.unwrap_or(0),
        created_at: team.created_at,
        updated_at: team.updated_at,
    }
}

fn to_capabilities(perms: GitHubPermissions) -> Capabilities {
    Capabilities {
        admin: perms.admin,
        maintain: perms.maintain,
        push: perms.push,
        triage: perms.triage,
        pull: perms.pull,
    }
}

/// Build a detailed grant from a 200 probe body.
pub fn to_detailed_grant(
    team_slug: &str,
    owner: &str,
    repo: &str,
    body: TeamRepoResponse,
) -> PermissionGrant {
    let full_name = body
        .full_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("{owner}/{repo}"));
    PermissionGrant::detailed(
        team_slug,
        repo,
        full_name,
        body.role_name,
        to_capabilities(body.permissions.unwrap_or_default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::GitHubOwner;
    use crate::platform::DetailLevel;

    #[test]
    fn repository_defaults_branch_to_main() {
        let repo = to_repository(GitHubRepo {
            id: 42,
            name: "api".into(),
            full_name: "acme/api".into(),
            private: true,
            description: None,
            default_branch: None,
            created_at: None,
            updated_at: None,
            owner: GitHubOwner {
                login: "acme".into(),
            },
        });

        assert_eq!(repo.default_branch, "main");
        assert_eq!(repo.owner, "acme");
        assert!(repo.private);
    }

    #[test]
    fn team_defaults_permission_and_counts() {
        let team = to_team(GitHubTeam {
            id: 1,
            name: "Core Devs".into(),
            slug: "core-devs".into(),
            description: Some("Core".into()),
            privacy: None,
            permission: None,
            members_count: None,
            repos_count: Some(4),
            created_at: None,
            updated_at: None,
        });

        assert_eq!(team.permission, DEFAULT_TEAM_PERMISSION);
        assert_eq!(team.members_count, 0);
        assert_eq!(team.repos_count, 4);
        assert_eq!(team.privacy, "closed");
    }

    #[test]
    fn detailed_grant_falls_back_to_owner_repo() {
        let grant = to_detailed_grant(
            "core-devs",
            "acme",
            "api",
            TeamRepoResponse {
                full_name: None,
                role_name: Some("maintain".into()),
                permissions: Some(GitHubPermissions {
                    maintain: true,
                    push: true,
                    triage: true,
                    pull: true,
                    ..GitHubPermissions::default()
                }),
            },
        );

        assert_eq!(grant.detail_level, DetailLevel::Detailed);
        assert_eq!(grant.repo_full_name, "acme/api");
        assert_eq!(grant.role_name, "maintain");
        assert!(grant.permissions.maintain);
        assert!(!grant.permissions.admin);
    }

    #[test]
    fn detailed_grant_without_permissions_has_no_flags() {
        let grant = to_detailed_grant("ops", "acme", "web", TeamRepoResponse::default());
        assert_eq!(grant.permissions, Capabilities::default());
        assert_eq!(grant.role_name, "unknown");
    }
}
