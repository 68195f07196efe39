use std::path::Path;

use console::style;
use grantmap::MappingReport;
use grantmap::mapping::render_summary;

/// Print the summary of a saved snapshot, flagging views that disagree.
pub(crate) fn handle_report(snapshot: &Path, check: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = MappingReport::from_path(snapshot)?;
    print!("{}", render_summary(&report));

    let issues = report.consistency_issues();
    if issues.is_empty() {
        return Ok(());
    }

    eprintln!();
    for issue in &issues {
        eprintln!("{} {}", style("Warning:").yellow().bold(), issue);
    }

    if check {
        return Err(format!(
            "{} is inconsistent ({} issue(s))",
            snapshot.display(),
            issues.len()
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_snapshot(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("grantmap-{name}-{}.json", std::process::id()));
        std::fs::write(&path, json).expect("write snapshot");
        path
    }

    const EMPTY: &str = r#"{
        "organization": "acme",
        "generated_at": "2024-03-09T14:05:07Z",
        "summary": {"total_repositories": 0, "total_teams": 0,
                    "total_permissions_checked": 0, "total_access_granted": 0},
        "repositories": {},
        "teams": {},
        "permissions_matrix": []
    }"#;

    #[test]
    fn consistent_snapshot_passes_check() {
        let path = write_snapshot("report-ok", EMPTY);
        handle_report(&path, true).expect("consistent snapshot");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn miscounted_snapshot_fails_check_only() {
        let json = EMPTY.replace("\"total_teams\": 0", "\"total_teams\": 3");
        let path = write_snapshot("report-bad", &json);

        handle_report(&path, false).expect("warnings only");
        let err = handle_report(&path, true).expect_err("check fails");
        assert!(err.to_string().contains("inconsistent"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn oversized_counters_fail_check_without_panicking() {
        let json = EMPTY
            .replace("\"total_teams\": 0", "\"total_teams\": 10000000000")
            .replace("\"total_repositories\": 0", "\"total_repositories\": 10000000000");
        let path = write_snapshot("report-huge", &json);

        let err = handle_report(&path, true).expect_err("check fails");
        assert!(err.to_string().contains("inconsistent"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        assert!(handle_report(Path::new("/nonexistent/snapshot.json"), false).is_err());
    }
}
