//! Building, exporting and rendering the team × repository access report.
//!
//! # Example
//!
//! ```ignore
//! use grantmap::mapping::{build_mapping, render_summary, MappingOptions};
//!
//! let report = build_mapping(&client, &MappingOptions::default(), None).await?;
//! println!("{}", render_summary(&report));
//! report.write_snapshot(Path::new("acme.json"))?;
//! ```

mod keyed;
mod matrix;
mod overview;
mod render;
mod report;
mod snapshot;

pub use keyed::Keyed;
pub use matrix::{DEFAULT_PROBE_DELAY, MappingOptions, build_mapping};
pub use overview::{OVERVIEW_PREVIEW, OrgOverview, fetch_overview};
pub use render::render_summary;
pub use report::{
    MappingReport, MappingSummary, RepositoryAccess, RepositoryAccessEntry, TeamAccess,
    TeamAccessEntry,
};
pub use snapshot::{SnapshotError, default_snapshot_name};
