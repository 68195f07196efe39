//! Quick organization overview: collections only, no probing.

use crate::platform::{self, OrgAccessClient, Repository, Team};
use crate::progress::ProgressCallback;

/// Number of entries shown per collection in an overview.
pub const OVERVIEW_PREVIEW: usize = 5;

/// Repositories and teams of an organization, without access data.
#[derive(Debug, Clone)]
pub struct OrgOverview {
    pub organization: String,
    pub repositories: Vec<Repository>,
    pub teams: Vec<Team>,
}

impl OrgOverview {
    /// The first `n` repositories and how many were left out.
    pub fn repository_preview(&self, n: usize) -> (&[Repository], usize) {
        preview(&self.repositories, n)
    }

    /// The first `n` teams and how many were left out.
    pub fn team_preview(&self, n: usize) -> (&[Team], usize) {
        preview(&self.teams, n)
    }
}

fn preview<T>(items: &[T], n: usize) -> (&[T], usize) {
    let shown = n.min(items.len());
    (&items[..shown], items.len() - shown)
}

/// Fetch repositories then teams for the client's organization.
pub async fn fetch_overview<C: OrgAccessClient + ?Sized>(
    client: &C,
    on_progress: Option<&ProgressCallback>,
) -> platform::Result<OrgOverview> {
    tracing::info!("Analyzing organization {}", client.organization());
    let repositories = client.list_repositories(on_progress).await?;
    let teams = client.list_teams(on_progress).await?;
    tracing::info!(
        "Found {} repositories and {} teams",
        repositories.len(),
        teams.len()
    );

    Ok(OrgOverview {
        organization: client.organization().to_string(),
        repositories,
        teams,
    })
}
