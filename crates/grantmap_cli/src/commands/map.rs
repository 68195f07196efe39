use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use console::{Term, style};
use grantmap::mapping::{MappingOptions, build_mapping, default_snapshot_name, render_summary};
use grantmap::{MappingReport, OrgAccessClient};

use crate::progress::ProgressReporter;
use crate::shutdown::until_interrupted;

/// Where, if anywhere, to write the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Export {
    Skip,
    /// An explicit path, or the timestamped default when `None`.
    To(Option<PathBuf>),
}

impl Export {
    fn path_for(&self, report: &MappingReport) -> Option<PathBuf> {
        match self {
            Self::Skip => None,
            Self::To(Some(path)) => Some(path.clone()),
            Self::To(None) => Some(PathBuf::from(default_snapshot_name(
                &report.organization,
                report.generated_at.with_timezone(&Local).naive_local(),
            ))),
        }
    }
}

pub(crate) async fn handle_map<C: OrgAccessClient + ?Sized>(
    client: &C,
    probe_delay: Duration,
    export: Export,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = MappingOptions::default().with_probe_delay(probe_delay);
    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let result = until_interrupted(
        "mapping",
        build_mapping(client, &options, Some(&callback)),
    )
    .await;
    reporter.finish();
    let report = result??;

    print!("{}", render_summary(&report));

    for issue in report.consistency_issues() {
        tracing::warn!("Inconsistent mapping: {}", issue);
    }

    if let Some(path) = export.path_for(&report) {
        report.write_snapshot(&path)?;
        if Term::stdout().is_term() {
            println!(
                "\n{} Snapshot written to {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        } else {
            tracing::info!(path = %path.display(), "Snapshot written");
        }
    }

    Ok(())
}
