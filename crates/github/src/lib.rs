//! GitHub data collection for repotrail.
//!
//! This crate fetches every repository the authenticated account can reach
//! or has contributed to, and normalizes them into a
//! [`RecordSet`](repotrail_protocol::RecordSet).
//!
//! # Overview
//!
//! - [`GitHubClient`]: an authenticated [`Transport`] backed by octocrab
//! - [`QueryExecutor`]: sends one [`Request`], waits out rate limits and
//!   classifies the response into an [`Outcome`]
//! - [`RestPaginator`]: walks `/user/repos` page by page
//! - [`ContributionAggregator`]: runs the contributions query and follows
//!   cursor-paged categories
//! - [`Discovery`]: runs both sources concurrently and merges the results
//! - [`Error`]: error types for GitHub API operations
//!
//! # Authentication
//!
//! A personal access token is required. It is held as a
//! [`secrecy::SecretString`] and never logged.
//!
//! # Examples
//!
//! ```no_run
//! use secrecy::SecretString;
//! use repotrail_github::{Discovery, DiscoveryOptions, GitHubClient, QueryExecutor};
//! use repotrail_protocol::VisibilityFilter;
//!
//! # async fn example() -> repotrail_github::Result<()> {
//! let token = SecretString::from("ghp_your_token_here".to_string());
//! let client = GitHubClient::new(token).await?;
//!
//! let options = DiscoveryOptions {
//!     visibility: VisibilityFilter::Private,
//!     has_access_only: false,
//! };
//! let records = Discovery::new(QueryExecutor::new(client), options).run().await?;
//! println!("found {} repositories", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! Any [`Transport`] can stand in for the network, which is how the crate is
//! tested.

pub mod client;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod graphql;
pub mod payload;
pub mod rest;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use client::GitHubClient;
pub use discovery::{Discovery, DiscoveryOptions, merge_accessible};
pub use error::{Error, Result};
pub use executor::{Classified, Outcome, QueryExecutor, classify, rate_limit_wait};
pub use graphql::{Category, ContributionAggregator};
pub use payload::{GraphqlRepository, Owner, Parent, RestRepository};
pub use rest::RestPaginator;
pub use transport::{RawResponse, Request, Transport};
