//! Integration tests for the matrix builder, the bulk writer and snapshots.
//!
//! Runs the engine against an in-memory organization so the cross-product,
//! consistency and partial-failure behaviour can be checked without HTTP.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grantmap::assignment::{
    AssignmentRequest, BulkOptions, RawAssignment, apply_assignments, validate_assignments,
};
use grantmap::mapping::{MappingOptions, MappingReport, build_mapping, fetch_overview};
use grantmap::platform::{
    self, Capabilities, DetailLevel, OrgAccessClient, PermissionGrant, PermissionLevel,
    PlatformError, Repository, Team,
};
use grantmap::progress::{MappingProgress, ProgressCallback};

type Pair = (String, String);

/// An organization held in memory.
#[derive(Default)]
struct FakeOrg {
    repos: Vec<Repository>,
    teams: Vec<Team>,
    grants: Mutex<HashMap<Pair, PermissionGrant>>,
    failing_probes: HashSet<Pair>,
    failing_writes: HashSet<Pair>,
    probes: AtomicUsize,
    writes: AtomicUsize,
}

fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        full_name: format!("acme/{name}"),
        private: id % 2 == 0,
        description: None,
        default_branch: "main".to_string(),
        created_at: None,
        updated_at: None,
        owner: "acme".to_string(),
    }
}

fn team(id: u64, name: &str, slug: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        privacy: "closed".to_string(),
        permission: "pull".to_string(),
        members_count: 3,
        repos_count: 0,
        created_at: None,
        updated_at: None,
    }
}

fn pair(team: &str, repo: &str) -> Pair {
    (team.to_string(), repo.to_string())
}

fn capabilities_for(level: PermissionLevel) -> Capabilities {
    Capabilities {
        admin: level >= PermissionLevel::Admin,
        maintain: level >= PermissionLevel::Maintain,
        push: level >= PermissionLevel::Push,
        triage: level >= PermissionLevel::Triage,
        pull: true,
    }
}

impl FakeOrg {
    fn new(repos: Vec<Repository>, teams: Vec<Team>) -> Self {
        Self {
            repos,
            teams,
            ..Self::default()
        }
    }

    fn grant_detailed(&self, team_slug: &str, repo_name: &str, level: PermissionLevel) {
        let grant = PermissionGrant::detailed(
            team_slug,
            repo_name,
            format!("acme/{repo_name}"),
            Some(level.to_string()),
            capabilities_for(level),
        );
        self.grants
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pair(team_slug, repo_name), grant);
    }

    fn grant_basic(&self, team_slug: &str, repo_name: &str) {
        self.grants
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                pair(team_slug, repo_name),
                PermissionGrant::basic(team_slug, "acme", repo_name),
            );
    }
}

#[async_trait]
impl OrgAccessClient for FakeOrg {
    fn organization(&self) -> &str {
        "acme"
    }

    async fn list_repositories(
        &self,
        _on_progress: Option<&ProgressCallback>,
    ) -> platform::Result<Vec<Repository>> {
        Ok(self.repos.clone())
    }

    async fn list_teams(&self, _on_progress: Option<&ProgressCallback>) -> platform::Result<Vec<Team>> {
        Ok(self.teams.clone())
    }

    async fn probe_access(
        &self,
        team_slug: &str,
        _owner: &str,
        repo: &str,
    ) -> platform::Result<Option<PermissionGrant>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let key = pair(team_slug, repo);
        if self.failing_probes.contains(&key) {
            return Err(PlatformError::api(500, "Internal Server Error"));
        }
        Ok(self
            .grants
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned())
    }

    async fn set_permission(
        &self,
        team_slug: &str,
        _owner: &str,
        repo: &str,
        level: PermissionLevel,
    ) -> platform::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.contains(&pair(team_slug, repo)) {
            return Err(PlatformError::not_found(format!(
                "orgs/acme/teams/{team_slug}/repos/acme/{repo}"
            )));
        }
        self.grant_detailed(team_slug, repo, level);
        Ok(())
    }
}

fn sample_org() -> FakeOrg {
    let org = FakeOrg::new(
        vec![repo(1, "api"), repo(2, "web"), repo(3, "infra")],
        vec![
            team(10, "Core Devs", "core-devs"),
            team(11, "QA & Release", "qa-release"),
        ],
    );
    org.grant_detailed("core-devs", "api", PermissionLevel::Push);
    org.grant_detailed("core-devs", "infra", PermissionLevel::Admin);
    org.grant_basic("qa-release", "web");
    org
}

fn no_delay() -> MappingOptions {
    MappingOptions::default().with_probe_delay(std::time::Duration::ZERO)
}

// ─── Matrix builder ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn probes_every_pair_and_counts_grants() {
    let org = sample_org();

    let report = build_mapping(&org, &MappingOptions::default(), None)
        .await
        .expect("mapping succeeds");

    assert_eq!(org.probes.load(Ordering::SeqCst), 6);
    assert_eq!(report.summary.total_teams, 2);
    assert_eq!(report.summary.total_repositories, 3);
    assert_eq!(report.summary.total_permissions_checked, 6);
    assert_eq!(report.summary.total_access_granted, 3);
    assert_eq!(report.permissions_matrix.len(), 3);
    assert!(report.is_consistent(), "{:?}", report.consistency_issues());
}

#[tokio::test]
async fn views_follow_fetch_order_and_probe_order() {
    let org = sample_org();

    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("mapping succeeds");

    assert_eq!(
        report.repositories.keys().collect::<Vec<_>>(),
        vec!["api", "web", "infra"]
    );
    assert_eq!(
        report.teams.keys().collect::<Vec<_>>(),
        vec!["core-devs", "qa-release"]
    );

    let order: Vec<(&str, &str)> = report
        .permissions_matrix
        .iter()
        .map(|g| (g.team_slug.as_str(), g.repo_name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("core-devs", "api"),
            ("core-devs", "infra"),
            ("qa-release", "web")
        ]
    );

    let core = report.teams.get("core-devs").expect("core team");
    let repos: Vec<_> = core
        .repositories_with_access
        .iter()
        .map(|e| e.repo_name.as_str())
        .collect();
    assert_eq!(repos, vec!["api", "infra"]);
}

#[tokio::test]
async fn authoritative_team_name_replaces_slug_fallback() {
    let org = sample_org();

    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("mapping succeeds");

    let qa = report
        .permissions_matrix
        .iter()
        .find(|g| g.team_slug == "qa-release")
        .expect("qa grant");
    assert_eq!(qa.team_name, "QA & Release");

    let web = report.repositories.get("web").expect("web repo");
    assert_eq!(web.teams_with_access[0].team_name, "QA & Release");
}

#[tokio::test]
async fn basic_grants_carry_pull_only() {
    let org = sample_org();

    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("mapping succeeds");

    let basic: Vec<_> = report
        .permissions_matrix
        .iter()
        .filter(|g| g.detail_level == DetailLevel::Basic)
        .collect();
    assert_eq!(basic.len(), 1);
    assert_eq!(basic[0].permissions, Capabilities::pull_only());
    assert_eq!(basic[0].role_name, "unknown");
}

#[tokio::test]
async fn absence_is_not_failure() {
    let org = FakeOrg::new(vec![repo(1, "api")], vec![team(10, "Core", "core")]);

    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("no grants is still a report");

    assert_eq!(report.summary.total_permissions_checked, 1);
    assert_eq!(report.summary.total_access_granted, 0);
    assert!(report.permissions_matrix.is_empty());
    assert!(report.repositories.get("api").expect("api").teams_with_access.is_empty());
}

#[tokio::test]
async fn empty_organization_yields_empty_report() {
    let org = FakeOrg::new(Vec::new(), vec![team(10, "Core", "core")]);

    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("mapping succeeds");

    assert_eq!(report.summary.total_permissions_checked, 0);
    assert_eq!(org.probes.load(Ordering::SeqCst), 0);
    assert!(report.is_consistent());
}

#[tokio::test]
async fn failed_probe_aborts_mapping() {
    let mut org = sample_org();
    org.failing_probes.insert(pair("qa-release", "api"));

    let err = build_mapping(&org, &no_delay(), None)
        .await
        .expect_err("probe failure aborts");

    assert_eq!(err.status(), Some(500));
    assert_eq!(org.probes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn mapping_emits_progress_events() {
    let org = sample_org();
    let events: Arc<Mutex<Vec<MappingProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let events_capture = Arc::clone(&events);
    let callback: ProgressCallback = Box::new(move |event| {
        events_capture
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    });

    build_mapping(&org, &no_delay(), Some(&callback))
        .await
        .expect("mapping succeeds");

    let events = events.lock().unwrap_or_else(|e| e.into_inner());
    assert!(matches!(
        events.first(),
        Some(MappingProgress::ProbingMatrix { total: 6, .. })
    ));
    let probed = events
        .iter()
        .filter(|e| matches!(e, MappingProgress::Probed { .. }))
        .count();
    assert_eq!(probed, 6);
    assert!(matches!(
        events.last(),
        Some(MappingProgress::MatrixComplete {
            checked: 6,
            granted: 3
        })
    ));
}

#[tokio::test]
async fn overview_lists_collections_without_probing() {
    let org = sample_org();

    let overview = fetch_overview(&org, None).await.expect("overview succeeds");

    assert_eq!(overview.organization, "acme");
    assert_eq!(overview.repositories.len(), 3);
    assert_eq!(overview.teams.len(), 2);
    assert_eq!(org.probes.load(Ordering::SeqCst), 0);
}

// ─── Bulk writer ────────────────────────────────────────────────────────────────

fn requests() -> Vec<AssignmentRequest> {
    vec![
        AssignmentRequest::new("core-devs", "acme", "web", PermissionLevel::Push),
        AssignmentRequest::new("qa-release", "acme", "missing", PermissionLevel::Triage),
        AssignmentRequest::new("qa-release", "acme", "api", PermissionLevel::Pull),
    ]
}

#[tokio::test(start_paused = true)]
async fn bulk_partial_failure_continues() {
    let mut org = sample_org();
    org.failing_writes.insert(pair("qa-release", "missing"));

    let result = apply_assignments(&org, &requests(), &BulkOptions::default(), None).await;

    assert_eq!(result.total, 3);
    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.details.len(), 3);
    assert!(result.details[0].success);
    assert!(!result.details[1].success);
    assert!(result.details[2].success);
    assert!(
        result.details[1]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Not found"))
    );
    assert_eq!(org.writes.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn bulk_all_failures_still_balances() {
    let mut org = sample_org();
    for request in requests() {
        org.failing_writes
            .insert(pair(&request.team_slug, &request.repo_name));
    }

    let result = apply_assignments(&org, &requests(), &BulkOptions::default(), None).await;

    assert_eq!(result.successful, 0);
    assert_eq!(result.failed, 3);
    assert_eq!(result.successful + result.failed, result.total);
}

#[tokio::test(start_paused = true)]
async fn repeated_write_is_idempotent() {
    let org = sample_org();
    let request = vec![AssignmentRequest::new(
        "qa-release",
        "acme",
        "infra",
        PermissionLevel::Maintain,
    )];

    let first = apply_assignments(&org, &request, &BulkOptions::default(), None).await;
    let second = apply_assignments(&org, &request, &BulkOptions::default(), None).await;
    assert_eq!(first.successful, 1);
    assert_eq!(second.successful, 1);

    let report = build_mapping(&org, &MappingOptions::default(), None)
        .await
        .expect("mapping succeeds");
    let grants: Vec<_> = report
        .permissions_matrix
        .iter()
        .filter(|g| g.team_slug == "qa-release" && g.repo_name == "infra")
        .collect();
    assert_eq!(grants.len(), 1);
    assert!(grants[0].permissions.maintain);
    assert!(!grants[0].permissions.admin);
}

#[tokio::test]
async fn invalid_permission_is_rejected_before_any_write() {
    let org = sample_org();
    let raw = vec![
        RawAssignment {
            team_slug: "core-devs".into(),
            repo_owner: "acme".into(),
            repo_name: "web".into(),
            permission: "push".into(),
        },
        RawAssignment {
            team_slug: "qa-release".into(),
            repo_owner: "acme".into(),
            repo_name: "api".into(),
            permission: "owner".into(),
        },
    ];

    let outcome = validate_assignments(&raw);
    assert!(outcome.is_err());
    if let Ok(requests) = outcome {
        apply_assignments(&org, &requests, &BulkOptions::default(), None).await;
    }
    assert_eq!(org.writes.load(Ordering::SeqCst), 0);
}

// ─── Snapshots ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_round_trip_preserves_order_and_field_names() {
    let org = sample_org();
    let report = build_mapping(&org, &no_delay(), None)
        .await
        .expect("mapping succeeds");

    let path = std::env::temp_dir().join(format!(
        "grantmap-snapshot-{}.json",
        std::process::id()
    ));
    report.write_snapshot(&path).expect("snapshot written");

    let raw = std::fs::read_to_string(&path).expect("snapshot readable");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("snapshot is json");
    for key in [
        "organization",
        "generated_at",
        "summary",
        "repositories",
        "teams",
        "permissions_matrix",
    ] {
        assert!(value.get(key).is_some(), "missing top-level key {key}");
    }
    assert_eq!(value["permissions_matrix"][0]["permission_level"], "detailed");
    assert_eq!(value["teams"]["core-devs"]["default_permission"], "pull");
    assert_eq!(
        value["repositories"]["api"]["teams_with_access"][0]["permissions"]["push"],
        true
    );
    assert!(raw.find("\"api\"").expect("api") < raw.find("\"web\"").expect("web"));
    assert!(raw.find("\"web\":").expect("web key") < raw.find("\"infra\":").expect("infra key"));

    let loaded = MappingReport::from_path(&path).expect("snapshot reloads");
    assert_eq!(loaded, report);
    assert_eq!(
        loaded.repositories.keys().collect::<Vec<_>>(),
        vec!["api", "web", "infra"]
    );
    assert!(loaded.is_consistent());

    let _ = std::fs::remove_file(&path);
}
