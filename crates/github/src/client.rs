//! GitHub API client implementation.
//!
//! This module provides the [`GitHubClient`] struct, the production
//! [`Transport`] backed by an authenticated octocrab client.

use http::HeaderMap;
use http::header::ACCEPT;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::transport::{RawResponse, Request, Transport};

/// Media type requested for every call.
pub const API_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Base URL of the public GitHub API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Authenticated GitHub API client.
///
/// Issues raw calls so that status codes and rate-limit headers reach the
/// executor untouched.
///
/// # Security
///
/// Tokens are taken as [`SecretString`] to prevent accidental logging
/// or exposure in debug output.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use repotrail_github::{GitHubClient, QueryExecutor};
///
/// # async fn example() -> repotrail_github::Result<()> {
/// let token = SecretString::from("ghp_your_token".to_string());
/// let client = GitHubClient::new(token).await?;
/// let executor = QueryExecutor::new(client);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitHubClient {
    /// The underlying octocrab client.
    inner: Octocrab,
}

impl GitHubClient {
    /// Creates a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the octocrab client fails to initialize.
    pub async fn new(token: SecretString) -> Result<Self> {
        Self::with_base_uri(token, GITHUB_API_URL).await
    }

    /// Creates a client that talks to the API at `base_uri`.
    ///
    /// Octocrab's own retries are disabled: every [`Transport::send`] is
    /// exactly one HTTP call, and retrying is left to the executor.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_uri` is not a valid URI or the octocrab
    /// client fails to initialize.
    #[instrument(skip(token))]
    pub async fn with_base_uri(token: SecretString, base_uri: &str) -> Result<Self> {
        debug!("creating authenticated GitHub client");
        let inner = Octocrab::builder()
            .base_uri(base_uri)
            .map_err(Error::Api)?
            .personal_token(token.expose_secret())
            .add_header(ACCEPT, API_MEDIA_TYPE.to_string())
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(Error::Api)?;

        Ok(Self { inner })
    }
}

impl Transport for GitHubClient {
    async fn send(&self, request: &Request) -> Result<RawResponse> {
        let uri = request.uri();
        let response = match request {
            Request::RestGet { .. } => self.inner._get(uri).await?,
            Request::GraphQl { query, variables } => {
                let payload = serde_json::json!({ "query": query, "variables": variables });
                self.inner._post(uri, Some(&payload)).await?
            }
        };

        let status = response.status().as_u16();
        let rate_limit_remaining =
            header_value(response.headers(), "x-ratelimit-remaining").map(String::from);
        let rate_limit_reset = header_value(response.headers(), "x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok());
        let body = self.inner.body_to_string(response).await?;

        debug!(status, remaining = ?rate_limit_remaining, "received response");
        Ok(RawResponse {
            status,
            rate_limit_remaining,
            rate_limit_reset,
            body,
        })
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
