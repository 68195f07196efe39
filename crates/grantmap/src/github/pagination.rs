//! Paginated collection fetching.

use serde::de::DeserializeOwned;

use crate::progress::{Collection, MappingProgress, ProgressCallback, emit};

use super::client::GitHubClient;
use super::error::GitHubError;

/// Items requested per page; a shorter page ends the collection.
pub const PAGE_SIZE: usize = 100;

/// Configuration for a paginated fetch operation.
pub struct PaginatedFetchConfig<'a> {
    /// Which collection is being read (for progress and errors).
    pub collection: Collection,
    /// Namespace identifier (used for progress reporting).
    pub namespace: &'a str,
    /// Path segments of the list endpoint.
    pub segments: Vec<&'a str>,
}

impl<'a> PaginatedFetchConfig<'a> {
    /// Create config for fetching organization repositories.
    pub fn org_repos(org: &'a str) -> Self {
        Self {
            collection: Collection::Repositories,
            namespace: org,
            segments: vec!["orgs", org, "repos"],
        }
    }

    /// Create config for fetching organization teams.
    pub fn org_teams(org: &'a str) -> Self {
        Self {
            collection: Collection::Teams,
            namespace: org,
            segments: vec!["orgs", org, "teams"],
        }
    }

    fn resource(&self) -> String {
        format!("{}/{}", self.namespace, self.collection.as_str())
    }
}

impl GitHubClient {
    /// Fetch every page of a list endpoint, in page order.
    ///
    /// Requests `page=n&per_page=100` from n = 1 and stops at the first page
    /// holding fewer than 100 items. Reaching the client's page ceiling
    /// without a short page is an error rather than a truncated result.
    pub async fn fetch_pages<T: DeserializeOwned>(
        &self,
        config: &PaginatedFetchConfig<'_>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<T>, GitHubError> {
        let max_pages = self.options().max_pages.max(1);
        let mut all_items: Vec<T> = Vec::new();

        emit(
            on_progress,
            MappingProgress::FetchingCollection {
                organization: config.namespace.to_string(),
                collection: config.collection,
            },
        );

        for page in 1..=max_pages {
            let url = self.endpoint(
                &config.segments,
                &[
                    ("page", page.to_string()),
                    ("per_page", PAGE_SIZE.to_string()),
                ],
            )?;
            let items: Vec<T> = self.get_json(&url).await?;
            let count = items.len();
            all_items.extend(items);

            emit(
                on_progress,
                MappingProgress::FetchedPage {
                    collection: config.collection,
                    page,
                    count,
                    total_so_far: all_items.len(),
                },
            );

            if count < PAGE_SIZE {
                tracing::debug!(
                    "Fetched {} {} for {} in {} page(s)",
                    all_items.len(),
                    config.collection.as_str(),
                    config.namespace,
                    page
                );
                emit(
                    on_progress,
                    MappingProgress::FetchComplete {
                        collection: config.collection,
                        total: all_items.len(),
                    },
                );
                return Ok(all_items);
            }
        }

        Err(GitHubError::PageLimitExceeded {
            resource: config.resource(),
            max_pages,
        })
    }
}
