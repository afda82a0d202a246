//! Error types for GitHub API operations.
//!
//! Only failures that halt a discovery run are represented here. Rate limits
//! are waited out by the executor, pagination limits end a listing normally,
//! and per-item GraphQL problems are logged and skipped.

/// Errors that can occur during GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP call itself failed (connection, TLS, client setup).
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// GitHub answered with a status that cannot be recovered from.
    #[error("GitHub returned HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, for diagnostics.
        body: String,
    },

    /// The response does not have the shape the query asked for.
    #[error("unexpected response shape: {reason}")]
    Structural {
        /// What was missing or malformed.
        reason: String,
    },

    /// The GraphQL endpoint reported an error that is not a per-item skip.
    #[error("GraphQL query failed: {message}")]
    GraphQl {
        /// The error message reported by GitHub.
        message: String,
    },

    /// The response body is not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn structural(reason: impl Into<String>) -> Self {
        Self::Structural {
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, Error>;
