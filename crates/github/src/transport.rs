//! The single-call boundary between discovery logic and the network.
//!
//! A [`Transport`] performs exactly one HTTP call for a [`Request`] and hands
//! back the parts of the response that matter for classification. The
//! production implementation is [`GitHubClient`](crate::GitHubClient); tests
//! substitute scripted transports.

use std::future::Future;

use crate::error::Result;

/// Path of the GraphQL endpoint, relative to the API base URL.
pub const GRAPHQL_PATH: &str = "/graphql";

/// An API call to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `GET` on a REST path with query parameters.
    RestGet {
        /// Path relative to the API base URL, e.g. `/user/repos`.
        path: String,
        /// Query parameters, in order.
        query: Vec<(String, String)>,
    },
    /// `POST` of a GraphQL document to [`GRAPHQL_PATH`].
    GraphQl {
        /// The GraphQL document.
        query: String,
        /// Variables for the document.
        variables: serde_json::Value,
    },
}

impl Request {
    /// Builds a REST `GET` request.
    ///
    /// # Examples
    ///
    /// ```
    /// use repotrail_github::Request;
    ///
    /// let request = Request::rest_get("/user/repos", [("page", 2), ("per_page", 100)]);
    /// assert_eq!(request.uri(), "/user/repos?page=2&per_page=100");
    /// ```
    #[must_use]
    pub fn rest_get<K, V>(path: impl Into<String>, query: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ToString,
        V: ToString,
    {
        Self::RestGet {
            path: path.into(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Builds a GraphQL request.
    #[must_use]
    pub fn graphql(query: impl Into<String>, variables: serde_json::Value) -> Self {
        Self::GraphQl {
            query: query.into(),
            variables,
        }
    }

    /// Returns the request target relative to the API base URL.
    ///
    /// Query values are integers and fixed names, so no escaping is applied.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::RestGet { path, query } if query.is_empty() => path.clone(),
            Self::RestGet { path, query } => {
                let params = query
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                format!("{path}?{params}")
            }
            Self::GraphQl { .. } => GRAPHQL_PATH.to_string(),
        }
    }
}

/// The parts of an HTTP response the executor looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `X-RateLimit-Remaining` header, if present.
    pub rate_limit_remaining: Option<String>,
    /// Value of the `X-RateLimit-Reset` header (epoch seconds), if present
    /// and numeric.
    pub rate_limit_reset: Option<i64>,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response with no rate-limit headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            rate_limit_remaining: None,
            rate_limit_reset: None,
            body: body.into(),
        }
    }

    /// Attaches rate-limit headers.
    #[must_use]
    pub fn with_rate_limit(mut self, remaining: impl Into<String>, reset: i64) -> Self {
        self.rate_limit_remaining = Some(remaining.into());
        self.rate_limit_reset = Some(reset);
        self
    }
}

/// Performs one authenticated API call.
///
/// Implementations must not retry: classification and retry decisions belong
/// to [`QueryExecutor`](crate::QueryExecutor).
pub trait Transport {
    /// Sends `request` and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received at all.
    fn send(&self, request: &Request) -> impl Future<Output = Result<RawResponse>> + Send;
}
