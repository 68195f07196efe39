//! Reading assignment files (CSV or JSON).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{AssignmentRequest, RawAssignment, ValidationError, validate_assignments};

/// Assignment file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentFormat {
    /// Header row `team_slug,repo_owner,repo_name,permission`; `#` starts a
    /// comment line.
    Csv,
    /// A JSON array of objects with the same four keys.
    Json,
}

impl AssignmentFormat {
    /// `.json` files are JSON; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Errors loading an assignment file.
#[derive(Debug, Error)]
pub enum AssignmentFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parse CSV assignment records.
pub fn parse_csv(content: &str) -> Result<Vec<RawAssignment>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize::<RawAssignment>().collect()
}

/// Parse a JSON array of assignment records.
pub fn parse_json(content: &str) -> Result<Vec<RawAssignment>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read raw records from a file, choosing the format by extension.
pub fn load_assignments(path: &Path) -> Result<Vec<RawAssignment>, AssignmentFileError> {
    let content = fs::read_to_string(path).map_err(|source| AssignmentFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match AssignmentFormat::from_path(path) {
        AssignmentFormat::Csv => parse_csv(&content).map_err(|source| AssignmentFileError::Csv {
            path: path.to_path_buf(),
            source,
        }),
        AssignmentFormat::Json => {
            parse_json(&content).map_err(|source| AssignmentFileError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Load and validate an assignment file.
pub fn read_assignments(path: &Path) -> Result<Vec<AssignmentRequest>, AssignmentFileError> {
    let raw = load_assignments(path)?;
    tracing::debug!("Loaded {} assignment record(s) from {}", raw.len(), path.display());
    Ok(validate_assignments(&raw)?)
}
