//! Contribution discovery through the GraphQL API.
//!
//! A single composite query asks `viewer.contributionsCollection` for five
//! categories of contributions. Three are delivered as plain lists of
//! `{ repository }` entries; the other two are paged connections whose
//! further pages are followed with cursors. Every repository found is
//! tagged with its category and folded into a [`RecordSet`].
//!
//! GitHub may return partial data alongside `errors`. Errors caused by SAML
//! enforcement on an organization are skipped with a warning, as are `null`
//! entries they leave behind; any other error aborts the aggregation.

use repotrail_protocol::{ContributionType, MergeOutcome, RecordSet, VisibilityFilter};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::executor::{Outcome, QueryExecutor};
use crate::payload::GraphqlRepository;
use crate::transport::{Request, Transport};

/// Page size for the paged categories, and repository cap for the others.
pub const PAGE_SIZE: usize = 100;

const REPOSITORY_FRAGMENT: &str = "
fragment RepositoryFields on Repository {
  nameWithOwner
  isPrivate
  isFork
  owner { login }
  parent { owner { login } }
}";

/// The composite query covering all five categories.
pub const CONTRIBUTIONS_QUERY: &str = "
query {
  viewer {
    contributionsCollection {
      commitContributionsByRepository(maxRepositories: 100) {
        repository { ...RepositoryFields }
      }
      pullRequestContributionsByRepository(maxRepositories: 100) {
        repository { ...RepositoryFields }
      }
      issueContributionsByRepository(maxRepositories: 100) {
        repository { ...RepositoryFields }
      }
      repositoryContributions(first: 100) {
        nodes { repository { ...RepositoryFields } }
        pageInfo { endCursor hasNextPage }
      }
      pullRequestReviewContributions(first: 100) {
        nodes { repository { ...RepositoryFields } }
        pageInfo { endCursor hasNextPage }
      }
    }
  }
}";

/// A contribution category of `contributionsCollection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `commitContributionsByRepository`.
    Commits,
    /// `pullRequestContributionsByRepository`.
    PullRequests,
    /// `issueContributionsByRepository`.
    Issues,
    /// `repositoryContributions` (paged).
    Repositories,
    /// `pullRequestReviewContributions` (paged).
    Reviews,
}

impl Category {
    /// All categories, in query order.
    pub const ALL: [Self; 5] = [
        Self::Commits,
        Self::PullRequests,
        Self::Issues,
        Self::Repositories,
        Self::Reviews,
    ];

    /// The `contributionsCollection` field holding this category.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Commits => "commitContributionsByRepository",
            Self::PullRequests => "pullRequestContributionsByRepository",
            Self::Issues => "issueContributionsByRepository",
            Self::Repositories => "repositoryContributions",
            Self::Reviews => "pullRequestReviewContributions",
        }
    }

    /// The tag given to repositories found in this category.
    #[must_use]
    pub const fn contribution(self) -> ContributionType {
        match self {
            Self::Commits => ContributionType::Commit,
            Self::PullRequests => ContributionType::PullRequest,
            Self::Issues => ContributionType::Issue,
            Self::Repositories => ContributionType::RepositoryContribution,
            Self::Reviews => ContributionType::Review,
        }
    }

    /// Returns `true` for categories delivered as cursor-paged connections.
    #[must_use]
    pub const fn is_paged(self) -> bool {
        matches!(self, Self::Repositories | Self::Reviews)
    }

    /// A query fetching one further page of a paged category after `$cursor`.
    #[must_use]
    pub fn page_query(self) -> String {
        format!(
            "
query($cursor: String) {{
  viewer {{
    contributionsCollection {{
      {field}(first: {PAGE_SIZE}, after: $cursor) {{
        nodes {{ repository {{ ...RepositoryFields }} }}
        pageInfo {{ endCursor hasNextPage }}
      }}
    }}
  }}
}}",
            field = self.field()
        ) + REPOSITORY_FRAGMENT
    }
}

#[derive(Debug, Deserialize)]
struct ContributionEntry {
    repository: Option<GraphqlRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionConnection {
    #[serde(default)]
    nodes: Option<Vec<Option<ContributionEntry>>>,
    page_info: Option<PageInfo>,
}

/// The two shapes a category can take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryData {
    List(Vec<Option<ContributionEntry>>),
    Connection(ContributionConnection),
}

impl CategoryData {
    /// Flattens either shape into its entries and, for connections, the page info.
    fn into_parts(self) -> (Vec<Option<ContributionEntry>>, Option<PageInfo>) {
        match self {
            Self::List(entries) => (entries, None),
            Self::Connection(connection) => (
                connection.nodes.unwrap_or_default(),
                connection.page_info,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<Map<String, Value>>,
}

impl GraphqlError {
    fn is_saml_failure(&self) -> bool {
        self.kind.as_deref() == Some("FORBIDDEN")
            && self
                .extensions
                .as_ref()
                .is_some_and(|ext| ext.contains_key("saml_failure"))
    }
}

/// Splits a response body into its `contributionsCollection` object,
/// skipping SAML errors and failing on any other error or a missing object.
fn parse_collection(body: &str) -> Result<Map<String, Value>> {
    let mut response: Value = serde_json::from_str(body)?;

    if let Some(errors) = response
        .get_mut("errors")
        .map(Value::take)
        .filter(|errors| !errors.is_null())
    {
        let errors: Vec<GraphqlError> = serde_json::from_value(errors)
            .map_err(|e| Error::structural(format!("malformed errors list: {e}")))?;
        for error in errors {
            if error.is_saml_failure() {
                warn!(message = %error.message, "skipping resource protected by SAML enforcement");
            } else {
                return Err(Error::GraphQl {
                    message: error.message,
                });
            }
        }
    }

    match response
        .pointer_mut("/data/viewer/contributionsCollection")
        .map(Value::take)
    {
        Some(Value::Object(collection)) => Ok(collection),
        _ => Err(Error::structural(
            "response has no data.viewer.contributionsCollection",
        )),
    }
}

/// Collects repositories from the contributions of the authenticated account.
#[derive(Debug)]
pub struct ContributionAggregator<'a, T> {
    executor: &'a QueryExecutor<T>,
}

impl<'a, T: Transport> ContributionAggregator<'a, T> {
    /// Creates an aggregator issuing its calls through `executor`.
    pub fn new(executor: &'a QueryExecutor<T>) -> Self {
        Self { executor }
    }

    /// Runs the composite query and follows the paged categories.
    ///
    /// Repositories rejected by `filter` are dropped before merging.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structural`] when the response lacks
    /// `contributionsCollection` or a category has an unexpected shape,
    /// [`Error::GraphQl`] for non-SAML errors, and propagates executor
    /// failures.
    #[instrument(skip(self))]
    pub async fn collect(&self, filter: VisibilityFilter) -> Result<RecordSet> {
        let mut records = RecordSet::new();
        let mut collection = self
            .fetch(&Request::graphql(
                format!("{CONTRIBUTIONS_QUERY}{REPOSITORY_FRAGMENT}"),
                json!({}),
            ))
            .await?;

        let mut pending = Vec::new();
        for category in Category::ALL {
            if let Some(cursor) = fold_category(&mut collection, category, filter, &mut records)? {
                pending.push((category, cursor));
            }
        }

        for (category, cursor) in pending {
            self.follow(category, cursor, filter, &mut records).await?;
        }

        info!(count = records.len(), "collected contributed repositories");
        Ok(records)
    }

    /// Fetches the remaining pages of a paged category.
    async fn follow(
        &self,
        category: Category,
        mut cursor: String,
        filter: VisibilityFilter,
        records: &mut RecordSet,
    ) -> Result<()> {
        let query = category.page_query();
        loop {
            debug!(field = category.field(), %cursor, "fetching next contributions page");
            let request = Request::graphql(query.clone(), json!({ "cursor": cursor }));
            let mut collection = self.fetch(&request).await?;
            match fold_category(&mut collection, category, filter, records)? {
                Some(next) => cursor = next,
                None => return Ok(()),
            }
        }
    }

    async fn fetch(&self, request: &Request) -> Result<Map<String, Value>> {
        match self.executor.execute(request).await? {
            Outcome::Success(body) => parse_collection(&body),
            Outcome::Exhausted => Err(Error::structural(
                "GraphQL endpoint answered with a pagination limit",
            )),
        }
    }
}

/// Merges one category of a `contributionsCollection` into `records`.
///
/// Returns the cursor of the next page when the category has one.
fn fold_category(
    collection: &mut Map<String, Value>,
    category: Category,
    filter: VisibilityFilter,
    records: &mut RecordSet,
) -> Result<Option<String>> {
    let data = match collection.remove(category.field()) {
        None | Some(Value::Null) => {
            warn!(field = category.field(), "category missing from response, skipping");
            return Ok(None);
        }
        Some(data) => data,
    };
    let data: CategoryData = serde_json::from_value(data)
        .map_err(|e| Error::structural(format!("{}: {e}", category.field())))?;
    let (entries, page_info) = data.into_parts();

    let mut skipped = 0;
    let mut merged = 0;
    for entry in entries {
        let Some(repository) = entry.and_then(|e| e.repository) else {
            skipped += 1;
            continue;
        };
        match records.merge(repository.into(), category.contribution(), filter) {
            MergeOutcome::Rejected => {}
            MergeOutcome::Inserted => merged += 1,
            MergeOutcome::Updated { conflicts, .. } => {
                merged += 1;
                for inconsistency in conflicts {
                    warn!(field = category.field(), %inconsistency, "contributions disagree");
                }
            }
        }
    }
    if skipped > 0 {
        warn!(field = category.field(), skipped, "skipped inaccessible contributions");
    }
    debug!(field = category.field(), merged, "folded contributions");

    Ok(match page_info {
        Some(PageInfo {
            has_next_page: true,
            end_cursor: Some(cursor),
        }) => Some(cursor),
        Some(PageInfo {
            has_next_page: true,
            end_cursor: None,
        }) => {
            warn!(field = category.field(), "next page announced without a cursor");
            None
        }
        _ => None,
    })
}
