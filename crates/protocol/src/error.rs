//! Error types for the repotrail-protocol crate.
//!
//! These errors only arise when parsing user-facing names (sort fields,
//! visibility filters, contribution codes) from strings.

use thiserror::Error;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The sort field name is not recognized.
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    /// The visibility filter name is not recognized.
    #[error("unknown visibility filter: {0} (expected public, private or both)")]
    UnknownVisibility(String),

    /// The contribution type code is not recognized.
    #[error("unknown contribution type: {0}")]
    UnknownContributionType(String),
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
