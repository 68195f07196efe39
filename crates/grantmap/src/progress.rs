//! Progress reporting types for mapping and assignment runs.
//!
//! The library never prints; it emits these events and lets the caller
//! decide between progress bars, structured logs, or nothing.

/// Which organization collection a fetch event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Repositories,
    Teams,
}

impl Collection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::Teams => "teams",
        }
    }
}

/// Progress events emitted by the fetcher, matrix builder and bulk writer.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MappingProgress {
    /// Starting to page through a collection.
    FetchingCollection {
        /// The organization being read.
        organization: String,
        /// Which collection.
        collection: Collection,
    },

    /// Fetched one page of a collection.
    FetchedPage {
        collection: Collection,
        /// Page number (1-indexed).
        page: u32,
        /// Items on this page.
        count: usize,
        /// Running total across pages.
        total_so_far: usize,
    },

    /// A collection has been fully read.
    FetchComplete { collection: Collection, total: usize },

    /// Starting the team × repository probe.
    ProbingMatrix {
        teams: usize,
        repositories: usize,
        /// Number of probes that will be issued.
        total: usize,
    },

    /// One (team, repository) pair was probed.
    Probed {
        team_slug: String,
        repo_name: String,
        /// Whether the team has access.
        granted: bool,
    },

    /// All pairs have been probed.
    MatrixComplete { checked: usize, granted: usize },

    /// Starting a bulk permission write.
    AssigningPermissions { count: usize },

    /// One assignment was applied.
    Assigned {
        team_slug: String,
        owner: String,
        repo: String,
        permission: String,
    },

    /// One assignment failed; the run continues.
    AssignError {
        team_slug: String,
        owner: String,
        repo: String,
        error: String,
    },

    /// Bulk write finished.
    AssignmentComplete { successful: usize, failed: usize },
}

/// Callback for progress updates.
pub type ProgressCallback = Box<dyn Fn(MappingProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: MappingProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(
            None,
            MappingProgress::MatrixComplete {
                checked: 4,
                granted: 1,
            },
        );
    }

    #[test]
    fn emit_invokes_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_capture = Arc::clone(&calls);
        let callback: ProgressCallback = Box::new(move |event| {
            if matches!(event, MappingProgress::FetchComplete { total: 7, .. }) {
                calls_capture.fetch_add(1, Ordering::SeqCst);
            }
        });

        emit(
            Some(&callback),
            MappingProgress::FetchComplete {
                collection: Collection::Teams,
                total: 7,
            },
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn collection_names() {
        assert_eq!(Collection::Repositories.as_str(), "repositories");
        assert_eq!(Collection::Teams.as_str(), "teams");
    }
}
