//! Grantmap CLI - map and manage team access across a GitHub organization.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::{Term, style};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grantmap")]
#[command(version)]
#[command(about = "Map team access across the repositories of a GitHub organization")]
#[command(
    long_about = "Grantmap lists every repository and team of a GitHub organization, \
checks each team against each repository, and reports who can access what. \
It exports the result as a JSON snapshot and can apply permission changes in \
bulk from a CSV or JSON file."
)]
#[command(after_long_help = r#"EXAMPLES
    Show the repositories and teams of an organization:
        $ grantmap --org acme overview

    Build the full access map and export a snapshot:
        $ grantmap --org acme map

    Build the map without writing a snapshot:
        $ grantmap --org acme map --no-export

    Validate an assignment file without writing anything:
        $ grantmap --org acme assign assignments.csv --dry-run

    Apply assignments without prompting:
        $ grantmap --org acme assign assignments.csv --yes

    Print the summary of an earlier snapshot:
        $ grantmap report acme_team_repo_mapping_20240101_120000.json

    Generate shell completions:
        $ grantmap completions bash > ~/.local/share/bash-completion/completions/grantmap

ASSIGNMENT FILES
    CSV with the header row team_slug,repo_owner,repo_name,permission
    (lines starting with # are comments), or a JSON array of objects with
    the same keys. Permission is one of pull, triage, push, maintain, admin.

CONFIGURATION
    Grantmap reads configuration from:
      1. ~/.config/grantmap/config.toml (or $XDG_CONFIG_HOME/grantmap/config.toml)
      2. ./grantmap.toml
      3. Environment variables (GRANTMAP_ prefix, sections joined with __)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GRANTMAP_GITHUB__TOKEN                 GitHub personal access token
    GRANTMAP_GITHUB__ORG                   Organization to operate on
    GRANTMAP_GITHUB__API_URL               API base URL (default: https://api.github.com)
    GRANTMAP_MAPPING__PROBE_DELAY_MS       Pause between access checks (default: 100)
    GRANTMAP_MAPPING__WRITE_DELAY_MS       Pause between permission writes (default: 200)
    GRANTMAP_MAPPING__MAX_PAGES            Page ceiling per collection (default: 1000)
    GRANTMAP_MAPPING__MAX_RATE_LIMIT_RETRIES
                                           Rate-limit waits before giving up (default: 5)
    GITHUB_TOKEN, GITHUB_ORG               Used when the GRANTMAP_ values are unset
"#)]
struct Cli {
    /// GitHub organization (overrides the configured one)
    #[arg(short = 'O', long, global = true)]
    org: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show repository and team counts with a short preview of each
    Overview,
    /// Check every team against every repository and report the access found
    Map {
        /// Snapshot file to write (default: {org}_team_repo_mapping_{timestamp}.json)
        #[arg(short, long, conflicts_with = "no_export")]
        output: Option<PathBuf>,

        /// Print the summary only, without writing a snapshot
        #[arg(long)]
        no_export: bool,

        /// Pause between access checks in milliseconds (default from config or 100)
        #[arg(long)]
        probe_delay_ms: Option<u64>,
    },
    /// Apply team permissions from a CSV or JSON file
    Assign {
        /// Assignment file (.json for JSON, anything else is read as CSV)
        file: PathBuf,

        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Validate and show the plan without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Write the per-assignment results as JSON to this file
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Pause between permission writes in milliseconds (default from config or 200)
        #[arg(long)]
        write_delay_ms: Option<u64>,
    },
    /// Print the summary of a previously exported snapshot
    Report {
        /// Snapshot file written by `grantmap map`
        snapshot: PathBuf,

        /// Exit with an error if the snapshot's views disagree
        #[arg(long)]
        check: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("grantmap=info,grantmap_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    // Commands that need neither credentials nor network
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    if let Err(e) = run(cli, &config).await {
        if e.downcast_ref::<shutdown::Interrupted>().is_some() {
            std::process::exit(shutdown::INTERRUPTED_EXIT_CODE);
        }
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli, config: &config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let org = cli.org.as_deref();

    match cli.command {
        Commands::Overview => {
            let client = commands::shared::github_client(config, org)?;
            commands::overview::handle_overview(&client).await?;
        }
        Commands::Map {
            output,
            no_export,
            probe_delay_ms,
        } => {
            let client = commands::shared::github_client(config, org)?;
            let probe_delay = probe_delay_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| config.probe_delay());
            let export = if no_export {
                commands::map::Export::Skip
            } else {
                commands::map::Export::To(output)
            };
            commands::map::handle_map(&client, probe_delay, export).await?;
        }
        Commands::Assign {
            file,
            yes,
            dry_run,
            results,
            write_delay_ms,
        } => {
            let write_delay = write_delay_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| config.write_delay());
            let opts = commands::assign::AssignOptions {
                file,
                yes,
                dry_run,
                results,
                write_delay,
            };
            commands::assign::handle_assign(opts, config, org).await?;
        }
        Commands::Report { snapshot, check } => {
            commands::report::handle_report(&snapshot, check)?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
