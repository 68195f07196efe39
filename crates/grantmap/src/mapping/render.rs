//! Plain-text rendering of a [`MappingReport`].

use std::fmt::Write as _;

use super::report::MappingReport;

const RULE_WIDTH: usize = 80;

/// Render the human-readable summary of a report.
///
/// Sections: header, summary counters, teams, repositories and the
/// per-grant permission details, each in report order.
pub fn render_summary(report: &MappingReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "TEAM-REPOSITORY MAPPING REPORT");
    let _ = writeln!(out, "Organization: {}", report.organization);
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{rule}");

    let summary = &report.summary;
    let _ = writeln!(out, "\nSUMMARY:");
    let _ = writeln!(out, "   Total Repositories: {}", summary.total_repositories);
    let _ = writeln!(out, "   Total Teams: {}", summary.total_teams);
    let _ = writeln!(
        out,
        "   Total Permissions Checked: {}",
        summary.total_permissions_checked
    );
    let _ = writeln!(out, "   Total Access Grants: {}", summary.total_access_granted);

    let _ = writeln!(out, "\nTEAMS:");
    for (slug, team) in report.teams.iter() {
        let _ = writeln!(out, "   {} ({})", team.name, slug);
        let _ = writeln!(out, "      Members: {}", team.members_count);
        let _ = writeln!(
            out,
            "      Repositories with access: {}",
            team.repositories_with_access.len()
        );
        let _ = writeln!(out, "      Privacy: {}", team.privacy);
        let _ = writeln!(out, "      Default permission: {}", team.default_permission);
    }

    let _ = writeln!(out, "\nREPOSITORIES:");
    for repo in report.repositories.values() {
        let visibility = if repo.private { "Private" } else { "Public" };
        let _ = writeln!(out, "   {} [{}]", repo.full_name, visibility);
        let _ = writeln!(out, "      Teams with access: {}", repo.teams_with_access.len());
        let _ = writeln!(out, "      Default branch: {}", repo.default_branch);
    }

    let _ = writeln!(out, "\nPERMISSION DETAILS:");
    for grant in &report.permissions_matrix {
        let _ = writeln!(out, "   {} -> {}", grant.team_name, grant.repo_name);
        let _ = writeln!(out, "      Role: {}", grant.role_name);
        let _ = writeln!(
            out,
            "      Permissions: {}",
            grant.permissions.granted().join(", ")
        );
    }

    out
}
