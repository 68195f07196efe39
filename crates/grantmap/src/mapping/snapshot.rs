//! Snapshot files: pretty JSON exports of a [`MappingReport`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use super::report::MappingReport;

/// Errors reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Default snapshot file name, `{org}_team_repo_mapping_{YYYYmmdd_HHMMSS}.json`.
pub fn default_snapshot_name(org: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_team_repo_mapping_{}.json",
        org,
        at.format("%Y%m%d_%H%M%S")
    )
}

impl MappingReport {
    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report to `path` as a snapshot.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json_pretty().map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json + "\n").map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Mapping exported to {}", path.display());
        Ok(())
    }

    /// Load a previously written snapshot.
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_name_uses_org_and_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 2))
            .expect("valid date");
        assert_eq!(
            default_snapshot_name("acme", at),
            "acme_team_repo_mapping_20240309_070502.json"
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MappingReport::from_path(Path::new("/nonexistent/grantmap/snapshot.json"))
            .expect_err("file does not exist");
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/grantmap/snapshot.json"));
    }

    #[test]
    fn malformed_file_is_json_error() {
        let path = std::env::temp_dir().join(format!(
            "grantmap-malformed-{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").expect("temp file written");

        let err = MappingReport::from_path(&path).expect_err("malformed snapshot");
        assert!(matches!(err, SnapshotError::Json { .. }));

        let _ = fs::remove_file(&path);
    }
}
