//! Shared types for the repotrail application.
//!
//! This crate holds the data model and the pure, I/O-free stages of a
//! discovery run: merging sightings from several GitHub APIs into one record
//! per repository, and ordering those records for display.
//!
//! # Overview
//!
//! - [`record`]: [`RepositorySnapshot`], [`RepositoryRecord`] and their enums
//! - [`merge`]: [`RecordSet`], the identity-keyed merge target
//! - [`grouping`]: [`SortField`] and [`group_records`] for report layout
//! - [`error`]: Error types for parsing user-facing names
//!
//! # Examples
//!
//! ```
//! use repotrail_protocol::{
//!     ContributionType, RecordSet, RepositorySnapshot, SortField, Visibility,
//!     VisibilityFilter, group_records,
//! };
//!
//! let mut set = RecordSet::new();
//! for (identity, owner) in [("acme/x", "acme"), ("acme/y", "acme"), ("zeta/z", "zeta")] {
//!     let snapshot = RepositorySnapshot::new(identity, Visibility::Public, owner, false, None);
//!     set.merge(snapshot, ContributionType::Commit, VisibilityFilter::Both);
//! }
//!
//! let rows = group_records(set, SortField::OwnerLogin, false);
//! assert_eq!(rows.len(), 4);
//! assert!(rows[2].is_separator());
//! ```

pub mod error;
pub mod grouping;
pub mod merge;
pub mod record;

// Re-export primary types at crate root for convenience
pub use error::{ProtocolError, Result};
pub use grouping::{Row, SortField, group_records, yes_no};
pub use merge::{Inconsistency, MergeOutcome, RecordSet};
pub use record::{
    ContributionType, RepositoryRecord, RepositorySnapshot, UNKNOWN_OWNER, Visibility,
    VisibilityFilter,
};
