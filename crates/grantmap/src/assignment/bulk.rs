//! Applying validated assignments one by one.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::{OrgAccessClient, PermissionLevel, short_error_message};
use crate::progress::{MappingProgress, ProgressCallback, emit};

use super::AssignmentRequest;

/// Pause after every write attempt.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(200);

/// Options for [`apply_assignments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOptions {
    /// Fixed pause after every attempt, successful or not.
    pub write_delay: Duration,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            write_delay: DEFAULT_WRITE_DELAY,
        }
    }
}

impl BulkOptions {
    #[must_use]
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }
}

/// Result of one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub team_slug: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub permission: PermissionLevel,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tally of a bulk run. `successful + failed == total == details.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub details: Vec<AssignmentOutcome>,
}

impl BulkResult {
    fn record(&mut self, outcome: AssignmentOutcome) {
        if outcome.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.details.push(outcome);
    }

    /// Failed outcomes, in request order.
    pub fn failures(&self) -> impl Iterator<Item = &AssignmentOutcome> {
        self.details.iter().filter(|d| !d.success)
    }

    /// Plain-text summary: totals, then each failed assignment.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Bulk assignment completed");
        let _ = writeln!(out, "   Total: {}", self.total);
        let _ = writeln!(out, "   Successful: {}", self.successful);
        let _ = writeln!(out, "   Failed: {}", self.failed);

        if self.failed > 0 {
            let _ = writeln!(out, "\nFAILED ASSIGNMENTS:");
            for failure in self.failures() {
                let _ = write!(
                    out,
                    "   {} -> {}/{} ({})",
                    failure.team_slug, failure.repo_owner, failure.repo_name, failure.permission
                );
                match &failure.error {
                    Some(error) => {
                        let _ = writeln!(out, ": {error}");
                    }
                    None => out.push('\n'),
                }
            }
        }

        out
    }
}

/// Apply each request in order, recording per-item failures without
/// stopping.
pub async fn apply_assignments<C: OrgAccessClient + ?Sized>(
    client: &C,
    requests: &[AssignmentRequest],
    options: &BulkOptions,
    on_progress: Option<&ProgressCallback>,
) -> BulkResult {
    tracing::info!(
        "Starting bulk permission assignment for {} assignments",
        requests.len()
    );
    emit(
        on_progress,
        MappingProgress::AssigningPermissions {
            count: requests.len(),
        },
    );

    let mut result = BulkResult {
        total: requests.len(),
        ..BulkResult::default()
    };

    for request in requests {
        tracing::debug!(
            "Assigning {} permission to {} for {}",
            request.permission,
            request.team_slug,
            request.repo_full_name()
        );

        let outcome = client
            .set_permission(
                &request.team_slug,
                &request.repo_owner,
                &request.repo_name,
                request.permission,
            )
            .await;

        let error = match outcome {
            Ok(()) => {
                emit(
                    on_progress,
                    MappingProgress::Assigned {
                        team_slug: request.team_slug.clone(),
                        owner: request.repo_owner.clone(),
                        repo: request.repo_name.clone(),
                        permission: request.permission.to_string(),
                    },
                );
                None
            }
            Err(e) => {
                let message = short_error_message(&e);
                tracing::warn!(
                    "Failed to assign {} to {} on {}: {}",
                    request.permission,
                    request.team_slug,
                    request.repo_full_name(),
                    message
                );
                emit(
                    on_progress,
                    MappingProgress::AssignError {
                        team_slug: request.team_slug.clone(),
                        owner: request.repo_owner.clone(),
                        repo: request.repo_name.clone(),
                        error: message.clone(),
                    },
                );
                Some(message)
            }
        };

        result.record(AssignmentOutcome {
            team_slug: request.team_slug.clone(),
            repo_owner: request.repo_owner.clone(),
            repo_name: request.repo_name.clone(),
            permission: request.permission,
            success: error.is_none(),
            error,
        });

        if !options.write_delay.is_zero() {
            tokio::time::sleep(options.write_delay).await;
        }
    }

    tracing::info!(
        "Bulk assignment completed: {} successful, {} failed",
        result.successful,
        result.failed
    );
    emit(
        on_progress,
        MappingProgress::AssignmentComplete {
            successful: result.successful,
            failed: result.failed,
        },
    );

    result
}
