use std::collections::HashMap;
use std::sync::Mutex;

use grantmap::MappingProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Fetch bars by collection name.
    fetch_bars: HashMap<&'static str, ProgressBar>,
    /// Single bar for the access checks.
    probe_bar: Option<ProgressBar>,
    /// Grants found so far.
    granted: usize,
    /// Single bar for permission writes.
    assign_bar: Option<ProgressBar>,
    /// Failed writes so far.
    failed: usize,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: MappingProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            MappingProgress::FetchingCollection {
                organization,
                collection,
            } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb.set_prefix(format!("{:12}", capitalize(collection.as_str())));
                pb.set_message(format!("Fetching {} of {}...", collection.as_str(), organization));
                state.fetch_bars.insert(collection.as_str(), pb);
            }

            MappingProgress::FetchedPage {
                collection,
                page,
                total_so_far,
                ..
            } => {
                if let Some(pb) = state.fetch_bars.get(collection.as_str()) {
                    pb.set_message(format!(
                        "Page {} ({} {})",
                        page,
                        total_so_far,
                        collection.as_str()
                    ));
                }
            }

            MappingProgress::FetchComplete { collection, total } => {
                if let Some(pb) = state.fetch_bars.get(collection.as_str()) {
                    pb.finish_with_message(format!("✓ {} {}", total, collection.as_str()));
                }
            }

            MappingProgress::ProbingMatrix {
                teams,
                repositories,
                total,
            } => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:12}", "Checking"));
                pb.set_message(format!("{} teams × {} repositories", teams, repositories));
                state.probe_bar = Some(pb);
                state.granted = 0;
            }

            MappingProgress::Probed {
                team_slug,
                repo_name,
                granted,
            } => {
                if granted {
                    state.granted += 1;
                }
                if let Some(ref pb) = state.probe_bar {
                    pb.inc(1);
                    pb.set_message(format!(
                        "{} → {} ({} granted)",
                        team_slug, repo_name, state.granted
                    ));
                }
            }

            MappingProgress::MatrixComplete { checked, granted } => {
                if let Some(ref pb) = state.probe_bar {
                    pb.finish_with_message(format!("✓ {} checked, {} granted", checked, granted));
                }
            }

            MappingProgress::AssigningPermissions { count } => {
                let pb = self.multi.add(ProgressBar::new(count as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:12}", "Assigning"));
                pb.set_message("Writing permissions...");
                state.assign_bar = Some(pb);
                state.failed = 0;
            }

            MappingProgress::Assigned {
                team_slug,
                owner,
                repo,
                permission,
            } => {
                if let Some(ref pb) = state.assign_bar {
                    pb.inc(1);
                    pb.set_message(format!("{} → {}/{} ({})", team_slug, owner, repo, permission));
                }
            }

            MappingProgress::AssignError {
                team_slug,
                owner,
                repo,
                error,
            } => {
                state.failed += 1;
                if let Some(ref pb) = state.assign_bar {
                    pb.inc(1);
                    pb.set_message(format!("{} failed", state.failed));
                }
                self.multi
                    .println(format!("  ✗ {} → {}/{}: {}", team_slug, owner, repo, error))
                    .ok();
            }

            MappingProgress::AssignmentComplete { successful, failed } => {
                if let Some(ref pb) = state.assign_bar {
                    pb.finish_with_message(format!("✓ {} applied, {} failed", successful, failed));
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in state.fetch_bars.values() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
        if let Some(ref pb) = state.probe_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
        if let Some(ref pb) = state.assign_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantmap::progress::Collection;

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("repositories"), "Repositories");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn probe_events_advance_the_bar() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(MappingProgress::ProbingMatrix {
            teams: 2,
            repositories: 2,
            total: 4,
        });
        for (repo, granted) in [("api", true), ("web", false), ("api", false)] {
            reporter.handle(MappingProgress::Probed {
                team_slug: "core-devs".into(),
                repo_name: repo.into(),
                granted,
            });
        }

        let state = reporter.state.lock().expect("lock");
        let pb = state.probe_bar.as_ref().expect("probe bar");
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.length(), Some(4));
        assert_eq!(state.granted, 1);
    }

    #[test]
    fn fetch_bar_is_finished_on_completion() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(MappingProgress::FetchingCollection {
            organization: "acme".into(),
            collection: Collection::Teams,
        });
        reporter.handle(MappingProgress::FetchComplete {
            collection: Collection::Teams,
            total: 12,
        });

        let state = reporter.state.lock().expect("lock");
        assert!(state.fetch_bars["teams"].is_finished());
    }
}
