use std::sync::Arc;

use console::style;
use grantmap::mapping::{OVERVIEW_PREVIEW, OrgOverview, fetch_overview};
use grantmap::{OrgAccessClient, Repository, Team};

use crate::progress::ProgressReporter;
use crate::shutdown::until_interrupted;

#[derive(Debug, Clone, tabled::Tabled)]
struct RepositoryRow {
    #[tabled(rename = "Repository")]
    name: String,
    #[tabled(rename = "Visibility")]
    visibility: &'static str,
    #[tabled(rename = "Default branch")]
    default_branch: String,
}

impl From<&Repository> for RepositoryRow {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.full_name.clone(),
            visibility: if repo.private { "private" } else { "public" },
            default_branch: repo.default_branch.clone(),
        }
    }
}

#[derive(Debug, Clone, tabled::Tabled)]
struct TeamRow {
    #[tabled(rename = "Team")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Members")]
    members: u32,
    #[tabled(rename = "Privacy")]
    privacy: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            name: team.display_name(),
            slug: team.slug.clone(),
            members: team.members_count,
            privacy: team.privacy.clone(),
        }
    }
}

fn preview_table<R: tabled::Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

fn remaining_line(remaining: usize) -> Option<String> {
    (remaining > 0).then(|| format!("   ... and {remaining} more"))
}

/// Counts plus the first few repositories and teams.
fn render_overview(overview: &OrgOverview) -> String {
    let mut lines = vec![format!(
        "Organization: {}",
        style(&overview.organization).cyan().bold()
    )];

    let (repos, more_repos) = overview.repository_preview(OVERVIEW_PREVIEW);
    lines.push(String::new());
    lines.push(format!("Repositories: {}", overview.repositories.len()));
    if !repos.is_empty() {
        lines.push(preview_table(repos.iter().map(RepositoryRow::from)));
    }
    lines.extend(remaining_line(more_repos));

    let (teams, more_teams) = overview.team_preview(OVERVIEW_PREVIEW);
    lines.push(String::new());
    lines.push(format!("Teams: {}", overview.teams.len()));
    if !teams.is_empty() {
        lines.push(preview_table(teams.iter().map(TeamRow::from)));
    }
    lines.extend(remaining_line(more_teams));

    lines.join("\n")
}

pub(crate) async fn handle_overview<C: OrgAccessClient + ?Sized>(
    client: &C,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let result = until_interrupted("overview", fetch_overview(client, Some(&callback))).await;
    reporter.finish();
    let overview = result??;

    println!("{}", render_overview(&overview));
    Ok(())
}
