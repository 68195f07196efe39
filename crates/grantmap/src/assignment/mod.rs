//! Permission assignments: loading, validation and bulk application.
//!
//! Raw records arrive as four string columns and are validated in full
//! before any of them reaches the network.

mod bulk;
mod load;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::PermissionLevel;

pub use bulk::{AssignmentOutcome, BulkOptions, BulkResult, DEFAULT_WRITE_DELAY, apply_assignments};
pub use load::{
    AssignmentFileError, AssignmentFormat, load_assignments, parse_csv, parse_json,
    read_assignments,
};

/// An unvalidated assignment record as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssignment {
    #[serde(default)]
    pub team_slug: String,
    #[serde(default)]
    pub repo_owner: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub permission: String,
}

/// A validated request to give a team a permission level on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub team_slug: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub permission: PermissionLevel,
}

impl AssignmentRequest {
    pub fn new(
        team_slug: impl Into<String>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
        permission: PermissionLevel,
    ) -> Self {
        Self {
            team_slug: team_slug.into(),
            repo_owner: repo_owner.into(),
            repo_name: repo_name.into(),
            permission,
        }
    }

    /// `owner/name` of the target repository.
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

/// One rejected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAssignment {
    /// 1-based position in the input.
    pub record: usize,
    pub team_slug: String,
    pub reasons: Vec<String>,
}

impl fmt::Display for InvalidAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let team = if self.team_slug.is_empty() {
            "<missing>"
        } else {
            &self.team_slug
        };
        write!(
            f,
            "record {} (team {}): {}",
            self.record,
            team,
            self.reasons.join("; ")
        )
    }
}

fn list_invalid(invalid: &[InvalidAssignment]) -> String {
    invalid
        .iter()
        .map(|i| format!("  {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a set of assignments was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no assignments to apply")]
    Empty,

    #[error("{} invalid assignment(s):\n{}", .0.len(), list_invalid(.0))]
    Invalid(Vec<InvalidAssignment>),
}

/// Validate every record, collecting all problems before failing.
///
/// Fields are trimmed; empty fields and permissions outside
/// `pull|triage|push|maintain|admin` are rejected.
pub fn validate_assignments(
    raw: &[RawAssignment],
) -> Result<Vec<AssignmentRequest>, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut valid = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();

    for (idx, record) in raw.iter().enumerate() {
        let team_slug = record.team_slug.trim();
        let repo_owner = record.repo_owner.trim();
        let repo_name = record.repo_name.trim();
        let permission = record.permission.trim();

        let mut reasons = Vec::new();
        for (field, value) in [
            ("team_slug", team_slug),
            ("repo_owner", repo_owner),
            ("repo_name", repo_name),
            ("permission", permission),
        ] {
            if value.is_empty() {
                reasons.push(format!("{field} is empty"));
            }
        }

        let level = if permission.is_empty() {
            None
        } else {
            match permission.parse::<PermissionLevel>() {
                Ok(level) => Some(level),
                Err(e) => {
                    reasons.push(e.to_string());
                    None
                }
            }
        };

        match level {
            Some(level) if reasons.is_empty() => valid.push(AssignmentRequest::new(
                team_slug, repo_owner, repo_name, level,
            )),
            _ => invalid.push(InvalidAssignment {
                record: idx + 1,
                team_slug: team_slug.to_string(),
                reasons,
            }),
        }
    }

    if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(ValidationError::Invalid(invalid))
    }
}
