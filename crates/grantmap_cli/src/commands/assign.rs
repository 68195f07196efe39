use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use console::{Term, style};
use grantmap::assignment::{BulkOptions, apply_assignments, read_assignments};
use grantmap::{AssignmentRequest, BulkResult};

use crate::commands::shared::github_client;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::until_interrupted;

/// Options for `grantmap assign`.
#[derive(Debug, Clone)]
pub(crate) struct AssignOptions {
    pub file: PathBuf,
    pub yes: bool,
    pub dry_run: bool,
    pub results: Option<PathBuf>,
    pub write_delay: Duration,
}

#[derive(Debug, Clone, tabled::Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Permission")]
    permission: String,
}

fn render_plan(requests: &[AssignmentRequest]) -> String {
    let rows = requests.iter().enumerate().map(|(i, r)| PlanRow {
        index: i + 1,
        team: r.team_slug.clone(),
        repository: r.repo_full_name(),
        permission: r.permission.to_string(),
    });
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

fn confirm(count: usize) -> io::Result<bool> {
    print!(
        "{} Apply {} permission change(s)? [y/N] ",
        style("⚠").yellow().bold(),
        count
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn write_results(path: &Path, result: &BulkResult) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)
        .map_err(|e| format!("failed to write results to {}: {}", path.display(), e))?;
    Ok(())
}

pub(crate) async fn handle_assign(
    opts: AssignOptions,
    config: &Config,
    org: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validation covers the whole file before anything touches the network
    let requests = read_assignments(&opts.file)?;
    let is_tty = Term::stdout().is_term();

    if is_tty {
        println!(
            "{} valid assignment(s) in {}",
            requests.len(),
            style(opts.file.display()).cyan()
        );
        println!("{}", render_plan(&requests));
    } else {
        tracing::info!(
            count = requests.len(),
            file = %opts.file.display(),
            "Loaded assignments"
        );
    }

    if opts.dry_run {
        if is_tty {
            println!("Dry run: nothing was written.");
        } else {
            tracing::info!("Dry run, nothing written");
        }
        return Ok(());
    }

    if !opts.yes {
        if !is_tty {
            return Err("refusing to write permissions without --yes when not attached to a terminal".into());
        }
        if !confirm(requests.len())? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let client = github_client(config, org)?;
    let options = BulkOptions::default().with_write_delay(opts.write_delay);
    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let result = until_interrupted(
        "assignment",
        apply_assignments(&client, &requests, &options, Some(&callback)),
    )
    .await;
    reporter.finish();
    let result = result?;

    println!();
    print!("{}", result.render());

    if let Some(path) = &opts.results {
        write_results(path, &result)?;
        if is_tty {
            println!("Results written to {}", style(path.display()).cyan());
        }
    }

    if result.failed > 0 {
        return Err(format!("{} of {} assignment(s) failed", result.failed, result.total).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use grantmap::PermissionLevel;
    use grantmap::assignment::AssignmentOutcome;

    use super::*;

    #[test]
    fn plan_lists_requests_in_order() {
        let plan = render_plan(&[
            AssignmentRequest::new("developers", "acme", "api", PermissionLevel::Push),
            AssignmentRequest::new("admins", "acme", "infra", PermissionLevel::Admin),
        ]);

        let developers = plan.find("developers").expect("first row");
        let admins = plan.find("admins").expect("second row");
        assert!(developers < admins);
        assert!(plan.contains("acme/infra"));
        assert!(plan.contains("admin"));
    }

    #[test]
    fn results_file_is_json() {
        let path = std::env::temp_dir().join(format!("grantmap-results-{}.json", std::process::id()));
        let result = BulkResult {
            total: 1,
            successful: 0,
            failed: 1,
            details: vec![AssignmentOutcome {
                team_slug: "qa".to_string(),
                repo_owner: "acme".to_string(),
                repo_name: "web".to_string(),
                permission: PermissionLevel::Triage,
                success: false,
                error: Some("API error (404): Not Found".to_string()),
            }],
        };

        write_results(&path, &result).expect("results written");
        let back: BulkResult =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read back"))
                .expect("valid json");
        assert_eq!(back, result);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn invalid_file_fails_before_any_client_is_built() {
        let path = std::env::temp_dir().join(format!("grantmap-invalid-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "team_slug,repo_owner,repo_name,permission\nowners,acme,api,owner\n",
        )
        .expect("write csv");

        // No token configured: reaching the client would fail differently
        let opts = AssignOptions {
            file: path.clone(),
            yes: true,
            dry_run: false,
            results: None,
            write_delay: Duration::ZERO,
        };
        let err = handle_assign(opts, &Config::default(), Some("acme"))
            .await
            .expect_err("owner is rejected");
        assert!(err.to_string().contains("invalid permission 'owner'"));

        let _ = std::fs::remove_file(&path);
    }
}
