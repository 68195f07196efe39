//! The team × repository matrix builder.

use std::time::Duration;

use chrono::Utc;

use crate::platform::{self, OrgAccessClient, Repository, Team};
use crate::progress::{MappingProgress, ProgressCallback, emit};

use super::keyed::Keyed;
use super::report::{
    MappingReport, MappingSummary, RepositoryAccess, RepositoryAccessEntry, TeamAccess,
    TeamAccessEntry,
};

/// Pause after every probe.
pub const DEFAULT_PROBE_DELAY: Duration = Duration::from_millis(100);

/// Options for [`build_mapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOptions {
    /// Fixed pause after every probe, on top of rate-limit handling.
    pub probe_delay: Duration,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            probe_delay: DEFAULT_PROBE_DELAY,
        }
    }
}

impl MappingOptions {
    #[must_use]
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }
}

fn repository_view(repo: &Repository) -> RepositoryAccess {
    RepositoryAccess {
        id: repo.id,
        full_name: repo.full_name.clone(),
        private: repo.private,
        description: repo.description.clone(),
        default_branch: repo.default_branch.clone(),
        teams_with_access: Vec::new(),
    }
}

fn team_view(team: &Team) -> TeamAccess {
    TeamAccess {
        id: team.id,
        name: team.name.clone(),
        slug: team.slug.clone(),
        description: team.description.clone(),
        privacy: team.privacy.clone(),
        default_permission: team.permission.clone(),
        members_count: team.members_count,
        repos_count: team.repos_count,
        repositories_with_access: Vec::new(),
    }
}

/// Build the full access report for the client's organization.
///
/// Fetches repositories then teams, probes every (team, repository) pair with
/// teams as the outer loop, and records each grant in all three views. Any
/// failed probe aborts the run; no partial report is returned.
pub async fn build_mapping<C: OrgAccessClient + ?Sized>(
    client: &C,
    options: &MappingOptions,
    on_progress: Option<&ProgressCallback>,
) -> platform::Result<MappingReport> {
    let organization = client.organization().to_string();
    let generated_at = Utc::now();
    tracing::info!("Starting team-repository mapping for {}", organization);

    let repositories = client.list_repositories(on_progress).await?;
    let teams = client.list_teams(on_progress).await?;

    let mut repo_views: Keyed<RepositoryAccess> = repositories
        .iter()
        .map(|r| (r.name.clone(), repository_view(r)))
        .collect();
    let mut team_views: Keyed<TeamAccess> = teams
        .iter()
        .map(|t| (t.slug.clone(), team_view(t)))
        .collect();

    let total = teams.len() * repositories.len();
    tracing::info!(
        "Checking permissions for {} teams across {} repositories",
        teams.len(),
        repositories.len()
    );
    emit(
        on_progress,
        MappingProgress::ProbingMatrix {
            teams: teams.len(),
            repositories: repositories.len(),
            total,
        },
    );

    let mut summary = MappingSummary {
        total_repositories: repositories.len(),
        total_teams: teams.len(),
        ..MappingSummary::default()
    };
    let mut matrix = Vec::new();

    for team in &teams {
        let team_name = team.display_name();
        for repo in &repositories {
            tracing::debug!("Checking {} access to {}", team.slug, repo.name);
            let outcome = client
                .probe_access(&team.slug, &repo.owner, &repo.name)
                .await?;
            summary.total_permissions_checked += 1;

            let granted = outcome.is_some();
            if let Some(grant) = outcome {
                let grant = grant.with_team_name(team_name.clone());
                summary.total_access_granted += 1;

                if let Some(view) = repo_views.get_mut(&repo.name) {
                    view.teams_with_access.push(TeamAccessEntry {
                        team_slug: team.slug.clone(),
                        team_name: team_name.clone(),
                        role_name: grant.role_name.clone(),
                        permissions: grant.permissions,
                    });
                }
                if let Some(view) = team_views.get_mut(&team.slug) {
                    view.repositories_with_access.push(RepositoryAccessEntry {
                        repo_name: repo.name.clone(),
                        repo_full_name: repo.full_name.clone(),
                        role_name: grant.role_name.clone(),
                        permissions: grant.permissions,
                    });
                }
                matrix.push(grant);
            }

            emit(
                on_progress,
                MappingProgress::Probed {
                    team_slug: team.slug.clone(),
                    repo_name: repo.name.clone(),
                    granted,
                },
            );

            if !options.probe_delay.is_zero() {
                tokio::time::sleep(options.probe_delay).await;
            }
        }
    }

    tracing::info!(
        "Mapping completed: {} access grants found, {} permissions checked",
        summary.total_access_granted,
        summary.total_permissions_checked
    );
    emit(
        on_progress,
        MappingProgress::MatrixComplete {
            checked: summary.total_permissions_checked,
            granted: summary.total_access_granted,
        },
    );

    Ok(MappingReport {
        organization,
        generated_at,
        summary,
        repositories: repo_views,
        teams: team_views,
        permissions_matrix: matrix,
    })
}
