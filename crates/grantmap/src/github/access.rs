//! Team ⇄ repository access operations and the [`OrgAccessClient`] impl.

use async_trait::async_trait;
use url::Url;

use super::client::{GitHubClient, REPOSITORY_MEDIA_TYPE, api_error};
use super::convert::{to_detailed_grant, to_repository, to_team};
use super::error::GitHubError;
use super::pagination::PaginatedFetchConfig;
use super::types::{GitHubRepo, GitHubTeam, SetPermissionBody, TeamRepoResponse};
use crate::http::HttpMethod;
use crate::platform::{
    self, OrgAccessClient, PermissionGrant, PermissionLevel, Repository, Team,
};
use crate::progress::ProgressCallback;

impl GitHubClient {
    fn team_repo_url(&self, team_slug: &str, owner: &str, repo: &str) -> Result<Url, GitHubError> {
        self.endpoint(
            &["orgs", self.org(), "teams", team_slug, "repos", owner, repo],
            &[],
        )
    }

    /// List every repository of the bound organization.
    pub async fn list_org_repos(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<GitHubRepo>, GitHubError> {
        self.fetch_pages(&PaginatedFetchConfig::org_repos(self.org()), on_progress)
            .await
    }

    /// List every team of the bound organization.
    pub async fn list_org_teams(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<GitHubTeam>, GitHubError> {
        self.fetch_pages(&PaginatedFetchConfig::org_teams(self.org()), on_progress)
            .await
    }

    /// Check whether a team has access to a repository.
    ///
    /// Asks for the repository media type so GitHub includes the role and
    /// permission flags; servers that still answer with an empty 2xx yield a
    /// basic grant.
    ///
    /// - 200 with a body: a detailed grant built from the body
    /// - any other 2xx: a basic grant (read access only)
    /// - 404: no access
    /// - anything else: an error
    pub async fn check_team_repo(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Option<PermissionGrant>, GitHubError> {
        let url = self.team_repo_url(team_slug, owner, repo)?;
        let response = self
            .execute_accepting(HttpMethod::Get, &url, None, REPOSITORY_MEDIA_TYPE)
            .await?;

        match response.status {
            200 if !response.body.trim_ascii().is_empty() => {
                let body: TeamRepoResponse = serde_json::from_slice(&response.body)?;
                Ok(Some(to_detailed_grant(team_slug, owner, repo, body)))
            }
            status if (200..300).contains(&status) => {
                Ok(Some(PermissionGrant::basic(team_slug, owner, repo)))
            }
            404 => Ok(None),
            _ => Err(api_error(&response)),
        }
    }

    /// Create or update a team's permission on a repository.
    ///
    /// The endpoint is create-or-update, so repeating a write is harmless.
    pub async fn set_team_repo_permission(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
        level: PermissionLevel,
    ) -> Result<(), GitHubError> {
        let url = self.team_repo_url(team_slug, owner, repo)?;
        let body = serde_json::to_value(SetPermissionBody {
            permission: level.as_str(),
        })?;
        let response = self.execute(HttpMethod::Put, &url, Some(&body)).await?;

        if response.is_success() {
            Ok(())
        } else {
            Err(api_error(&response))
        }
    }
}

#[async_trait]
impl OrgAccessClient for GitHubClient {
    fn organization(&self) -> &str {
        self.org()
    }

    async fn list_repositories(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> platform::Result<Vec<Repository>> {
        let repos = self.list_org_repos(on_progress).await?;
        Ok(repos.into_iter().map(to_repository).collect())
    }

    async fn list_teams(&self, on_progress: Option<&ProgressCallback>) -> platform::Result<Vec<Team>> {
        let teams = self.list_org_teams(on_progress).await?;
        Ok(teams.into_iter().map(to_team).collect())
    }

    async fn probe_access(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
    ) -> platform::Result<Option<PermissionGrant>> {
        Ok(self.check_team_repo(team_slug, owner, repo).await?)
    }

    async fn set_permission(
        &self,
        team_slug: &str,
        owner: &str,
        repo: &str,
        level: PermissionLevel,
    ) -> platform::Result<()> {
        Ok(self
            .set_team_repo_permission(team_slug, owner, repo, level)
            .await?)
    }
}
