//! Configuration file support for grantmap.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GRANTMAP_`, sections joined with
//!    `__`, e.g. `GRANTMAP_GITHUB__TOKEN`)
//! 3. Config file (./grantmap.toml, then ~/.config/grantmap/config.toml)
//! 4. `GITHUB_TOKEN` / `GITHUB_ORG`
//! 5. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use GRANTMAP_GITHUB__TOKEN
//! org = "acme"
//! api_url = "https://api.github.com"
//!
//! [mapping]
//! probe_delay_ms = 100
//! write_delay_ms = 200
//! max_pages = 1000
//! max_rate_limit_retries = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::builder::{ConfigBuilder as Builder, DefaultState};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use grantmap::github::{DEFAULT_API_URL, DEFAULT_MAX_PAGES, DEFAULT_MAX_RATE_LIMIT_RETRIES};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub connection settings.
    pub github: GitHubConfig,
    /// Pacing and limits for mapping and assignment runs.
    pub mapping: MappingConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    pub token: Option<String>,
    /// Organization to operate on.
    pub org: Option<String>,
    /// API base URL, for GitHub Enterprise Server.
    pub api_url: Option<String>,
}

/// Mapping and assignment pacing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Pause after every access check.
    pub probe_delay_ms: u64,
    /// Pause after every permission write.
    pub write_delay_ms: u64,
    /// Page ceiling per collection.
    pub max_pages: u32,
    /// Rate-limit waits before a request fails.
    pub max_rate_limit_retries: u32,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            probe_delay_ms: 100,
            write_delay_ms: 200,
            max_pages: DEFAULT_MAX_PAGES,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/grantmap/config.toml)
    /// 3. Local config file (./grantmap.toml)
    /// 4. Environment variables with GRANTMAP_ prefix
    ///
    /// `GITHUB_TOKEN` and `GITHUB_ORG` fill in whatever is still unset.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("grantmap.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./grantmap.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GRANTMAP_MAPPING__PROBE_DELAY_MS -> mapping.probe_delay_ms
        builder = builder.add_source(
            Environment::with_prefix("GRANTMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder).with_fallbacks(
            std::env::var("GITHUB_TOKEN").ok(),
            std::env::var("GITHUB_ORG").ok(),
        )
    }

    fn from_builder(builder: Builder<DefaultState>) -> Self {
        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Fill an unset token or organization from the plain GitHub variables.
    fn with_fallbacks(mut self, token: Option<String>, org: Option<String>) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        self.github.token = non_empty(self.github.token.take()).or_else(|| non_empty(token));
        self.github.org = non_empty(self.github.org.take()).or_else(|| non_empty(org));
        self
    }

    /// Get the GitHub token.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    /// The organization, preferring an explicit override.
    pub fn organization(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .or_else(|| self.github.org.clone())
    }

    /// API base URL, defaulting to the public GitHub API.
    pub fn api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.mapping.probe_delay_ms)
    }

    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.mapping.write_delay_ms)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "grantmap").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
