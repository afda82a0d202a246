//! A complete discovery run over both APIs.
//!
//! The REST listing and the GraphQL contributions are fetched concurrently,
//! each into a record set it owns exclusively, then combined in one final
//! pass. Neither stage ever writes to the other's records.

use repotrail_protocol::{ContributionType, MergeOutcome, RecordSet, VisibilityFilter};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::graphql::ContributionAggregator;
use crate::payload::RestRepository;
use crate::rest::RestPaginator;
use crate::transport::Transport;

/// Options for a discovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Which repositories to keep.
    pub visibility: VisibilityFilter,
    /// Only list repositories from `/user/repos`, skipping contributions.
    pub has_access_only: bool,
}

/// Merges a REST listing into a new record set, tagged
/// [`ContributionType::DirectAccess`].
///
/// A repository listed twice with different scalars is logged at `warn`.
#[must_use]
pub fn merge_accessible(repositories: Vec<RestRepository>, filter: VisibilityFilter) -> RecordSet {
    let mut records = RecordSet::new();
    for repository in repositories {
        let outcome = records.merge(repository.into(), ContributionType::DirectAccess, filter);
        if let MergeOutcome::Updated { conflicts, .. } = outcome {
            for inconsistency in conflicts {
                warn!(%inconsistency, "repository listing disagrees with itself");
            }
        }
    }
    records
}

/// Runs discovery against GitHub.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use repotrail_github::{Discovery, DiscoveryOptions, GitHubClient, QueryExecutor};
///
/// # async fn example() -> repotrail_github::Result<()> {
/// let client = GitHubClient::new(SecretString::from("ghp_xxx".to_string())).await?;
/// let discovery = Discovery::new(QueryExecutor::new(client), DiscoveryOptions::default());
///
/// let records = discovery.run().await?;
/// for record in records.iter() {
///     println!("{} ({})", record.identity(), record.contribution_summary());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Discovery<T> {
    executor: QueryExecutor<T>,
    options: DiscoveryOptions,
}

impl<T: Transport> Discovery<T> {
    /// Creates a discovery run.
    pub fn new(executor: QueryExecutor<T>, options: DiscoveryOptions) -> Self {
        Self { executor, options }
    }

    /// Returns the executor, e.g. to inspect its transport.
    pub fn executor(&self) -> &QueryExecutor<T> {
        &self.executor
    }

    /// Fetches both sources and returns one record per repository.
    ///
    /// # Errors
    ///
    /// Fails if either source fails with a structural or fatal error. An
    /// empty result is not an error.
    #[instrument(skip(self), fields(
        visibility = ?self.options.visibility,
        has_access_only = self.options.has_access_only,
    ))]
    pub async fn run(&self) -> Result<RecordSet> {
        let filter = self.options.visibility;

        let accessible = async {
            let repositories = RestPaginator::new(&self.executor).fetch_all().await?;
            Ok(merge_accessible(repositories, filter))
        };
        let contributed = async {
            if self.options.has_access_only {
                return Ok(RecordSet::new());
            }
            ContributionAggregator::new(&self.executor)
                .collect(filter)
                .await
        };

        let (mut records, contributed) = tokio::try_join!(accessible, contributed)?;
        for inconsistency in records.absorb(contributed) {
            warn!(%inconsistency, "data inconsistency between REST and GraphQL");
        }

        info!(count = records.len(), "discovery complete");
        Ok(records)
    }
}
