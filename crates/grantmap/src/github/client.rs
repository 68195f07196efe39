//! GitHub API client and the rate-limit-aware request executor.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::GitHubError;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, with_retry};

/// Public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Default media type sent in `Accept`.
pub const DEFAULT_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type under which the team-repository check returns the team's role
/// and permission flags instead of an empty 204.
pub const REPOSITORY_MEDIA_TYPE: &str = "application/vnd.github.v3.repository+json";

/// Default number of rate-limit retries before giving up.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Default page ceiling for list endpoints.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Wait used when a rate-limit rejection carries no timing headers.
const FALLBACK_RATE_LIMIT_WAIT_SECS: i64 = 3601;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tunables for a [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Rate-limit rejections tolerated per request before failing.
    pub max_rate_limit_retries: u32,
    /// Page ceiling for list endpoints (at least 1).
    pub max_pages: u32,
    /// Backoff for transport failures.
    pub transport_retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            max_pages: DEFAULT_MAX_PAGES,
            transport_retry: RetryConfig::default(),
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    #[must_use]
    pub fn with_transport_retry(mut self, retry: RetryConfig) -> Self {
        self.transport_retry = retry;
        self
    }
}

/// A rate-limit rejection and how long to wait before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSignal {
    pub wait: StdDuration,
    pub reset_at: DateTime<Utc>,
}

/// Classify a response as a rate-limit rejection.
///
/// A 429, or a 403 whose body mentions "rate limit", is a rejection. The wait
/// is `X-RateLimit-Reset - now + 1s`, else `Retry-After`, else one hour plus
/// one second, and never less than one second.
///
/// The reset header wins when both are present, so a secondary-limit 403
/// that also advertises a short `Retry-After` waits for the primary window.
pub fn detect_rate_limit(response: &HttpResponse, now: DateTime<Utc>) -> Option<RateLimitSignal> {
    let limited = match response.status {
        429 => true,
        403 => response.text().to_lowercase().contains("rate limit"),
        _ => false,
    };
    if !limited {
        return None;
    }

    let reset_header = response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0));

    let wait_secs = match reset_header {
        Some(reset) => (reset - now).num_seconds() + 1,
        None => response
            .header("retry-after")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(FALLBACK_RATE_LIMIT_WAIT_SECS),
    }
    .max(1);

    Some(RateLimitSignal {
        wait: StdDuration::from_secs(wait_secs.unsigned_abs()),
        reset_at: reset_header.unwrap_or_else(|| now + chrono::Duration::seconds(wait_secs)),
    })
}

/// Turn an unsuccessful response into an API error carrying status and body.
pub(crate) fn api_error(response: &HttpResponse) -> GitHubError {
    GitHubError::Api {
        status: response.status,
        message: response.text(),
    }
}

/// GitHub API client bound to one organization.
///
/// Credentials, base URL and transport travel with the value; there is no
/// process-wide header state.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    token: String,
    org: String,
    options: ClientOptions,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("org", &self.org)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a new GitHub client using the reqwest transport.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GitHubClient::new(DEFAULT_API_URL, &token, "acme", ClientOptions::default())?;
    /// let repos = client.list_repositories(None).await?;
    /// ```
    pub fn new(
        api_url: &str,
        token: &str,
        org: &str,
        options: ClientOptions,
    ) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
                .map_err(|e| GitHubError::Config(e.to_string()))?;

        Self::new_with_transport(api_url, token, org, options, Arc::new(transport))
    }

    pub fn new_with_transport(
        api_url: &str,
        token: &str,
        org: &str,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, GitHubError> {
        if token.trim().is_empty() {
            return Err(GitHubError::Config("a GitHub token is required".to_string()));
        }
        if org.trim().is_empty() {
            return Err(GitHubError::Config(
                "an organization name is required".to_string(),
            ));
        }

        let base_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| GitHubError::Config(format!("invalid API URL '{api_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubError::Config(format!(
                "API URL '{api_url}' cannot be used as a base"
            )));
        }

        let options = ClientOptions {
            max_pages: options.max_pages.max(1),
            ..options
        };

        Ok(Self {
            transport,
            base_url,
            token: token.to_string(),
            org: org.to_string(),
            options,
        })
    }

    /// The organization this client is bound to.
    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Build an endpoint URL from path segments (percent-encoded) and query
    /// pairs, relative to the API base URL.
    pub(crate) fn endpoint(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GitHubError::Config(format!("invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn headers(&self, accept: &str, with_body: bool) -> HttpHeaders {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.token),
            ),
            ("Accept".to_string(), accept.to_string()),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
            ("User-Agent".to_string(), "grantmap".to_string()),
        ];
        if with_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }

    /// Perform one logical API call.
    ///
    /// Rate-limit rejections are absorbed by sleeping until the advertised
    /// reset and re-sending the identical request, at most
    /// `max_rate_limit_retries` times. Every other status is handed back to
    /// the caller untouched.
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, GitHubError> {
        self.execute_accepting(method, url, body, DEFAULT_MEDIA_TYPE)
            .await
    }

    /// [`execute`](Self::execute) with a different `Accept` media type.
    pub async fn execute_accepting(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&serde_json::Value>,
        accept: &str,
    ) -> Result<HttpResponse, GitHubError> {
        let payload = body.map(serde_json::to_vec).transpose()?.unwrap_or_default();
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers(accept, body.is_some()),
            body: payload,
        };

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let response = self.send_with_retry(&request).await?;
            tracing::debug!("{} {} -> {}", method, url.path(), response.status);

            let Some(signal) = detect_rate_limit(&response, Utc::now()) else {
                return Ok(response);
            };

            if attempts > self.options.max_rate_limit_retries {
                return Err(GitHubError::RateLimitExhausted {
                    attempts,
                    reset_at: signal.reset_at,
                });
            }

            tracing::warn!(
                "Rate limit exceeded on {} {}; waiting {}s until {} (retry {}/{})",
                method,
                url.path(),
                signal.wait.as_secs(),
                signal.reset_at.format("%H:%M:%S UTC"),
                attempts,
                self.options.max_rate_limit_retries
            );
            tokio::time::sleep(signal.wait).await;
        }
    }

    async fn send_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse, GitHubError> {
        let label = format!("{} {}", request.method, request.url);
        with_retry(
            || {
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                async move { transport.send(request).await.map_err(GitHubError::from) }
            },
            GitHubError::is_transport,
            &self.options.transport_retry,
            &label,
        )
        .await
    }

    /// GET an endpoint and decode a successful JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, GitHubError> {
        let response = self.execute(HttpMethod::Get, url, None).await?;
        if !response.is_success() {
            return Err(api_error(&response));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}
