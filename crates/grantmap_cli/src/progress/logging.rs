use grantmap::MappingProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: MappingProgress) {
        match event {
            MappingProgress::FetchingCollection {
                organization,
                collection,
            } => {
                tracing::info!(
                    organization = %organization,
                    collection = collection.as_str(),
                    "Fetching collection"
                );
            }

            MappingProgress::FetchedPage {
                collection,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(collection = collection.as_str(), page, count, total_so_far, "Fetched page");
            }

            MappingProgress::FetchComplete { collection, total } => {
                tracing::info!(collection = collection.as_str(), total, "Fetch complete");
            }

            MappingProgress::ProbingMatrix {
                teams,
                repositories,
                total,
            } => {
                tracing::info!(teams, repositories, total, "Checking team access");
            }

            MappingProgress::Probed {
                team_slug,
                repo_name,
                granted,
            } => {
                tracing::debug!(team = %team_slug, repo = %repo_name, granted, "Checked access");
            }

            MappingProgress::MatrixComplete { checked, granted } => {
                tracing::info!(checked, granted, "Access check complete");
            }

            MappingProgress::AssigningPermissions { count } => {
                tracing::info!(count, "Assigning permissions");
            }

            MappingProgress::Assigned {
                team_slug,
                owner,
                repo,
                permission,
            } => {
                tracing::info!(
                    team = %team_slug,
                    repo = %format!("{}/{}", owner, repo),
                    permission = %permission,
                    "Assigned"
                );
            }

            MappingProgress::AssignError {
                team_slug,
                owner,
                repo,
                error,
            } => {
                tracing::warn!(
                    team = %team_slug,
                    repo = %format!("{}/{}", owner, repo),
                    error = %error,
                    "Failed to assign"
                );
            }

            MappingProgress::AssignmentComplete { successful, failed } => {
                tracing::info!(successful, failed, "Assignment complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
