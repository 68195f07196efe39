use grantmap::github::{ClientOptions, GitHubClient};

use crate::config::Config;

const MISSING_TOKEN: &str = "No GitHub token configured. Set GRANTMAP_GITHUB__TOKEN or GITHUB_TOKEN, \
or add a [github] token to the config file.";

const MISSING_ORG: &str = "No organization given. Pass --org, set GRANTMAP_GITHUB__ORG or GITHUB_ORG, \
or add a [github] org to the config file.";

/// Client options from the `[mapping]` section.
pub(crate) fn client_options(config: &Config) -> ClientOptions {
    ClientOptions::default()
        .with_max_rate_limit_retries(config.mapping.max_rate_limit_retries)
        .with_max_pages(config.mapping.max_pages)
}

/// Build a GitHub client for the configured (or overridden) organization.
pub(crate) fn github_client(
    config: &Config,
    org: Option<&str>,
) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let token = config.github_token().ok_or(MISSING_TOKEN)?;
    let org = config.organization(org).ok_or(MISSING_ORG)?;

    let client = GitHubClient::new(&config.api_url(), &token, &org, client_options(config))?;
    tracing::debug!("Using {} for organization {}", config.api_url(), client.org());
    Ok(client)
}
