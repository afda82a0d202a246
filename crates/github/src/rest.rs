//! Page-numbered listing of the repositories the account can access.

use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::executor::{Outcome, QueryExecutor};
use crate::payload::RestRepository;
use crate::transport::{Request, Transport};

/// Listing endpoint: repositories the authenticated account owns, collaborates
/// on, or reaches through an organization.
pub const USER_REPOS_PATH: &str = "/user/repos";

/// Page size requested from the listing endpoint (its maximum).
pub const PER_PAGE: usize = 100;

/// Walks `/user/repos` page by page.
#[derive(Debug)]
pub struct RestPaginator<'a, T> {
    executor: &'a QueryExecutor<T>,
}

impl<'a, T: Transport> RestPaginator<'a, T> {
    /// Creates a paginator issuing its calls through `executor`.
    pub fn new(executor: &'a QueryExecutor<T>) -> Self {
        Self { executor }
    }

    /// The request for a 1-based page number.
    #[must_use]
    pub fn page_request(page: u32) -> Request {
        Request::rest_get(USER_REPOS_PATH, [("page", page), ("per_page", PER_PAGE as u32)])
    }

    /// Fetches every page, in API order.
    ///
    /// Stops after a short page or when GitHub reports the pagination limit;
    /// in the latter case the pages already fetched are returned.
    ///
    /// # Errors
    ///
    /// Propagates executor failures, and returns [`Error::Structural`] if a
    /// page is not a list of repositories.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<RestRepository>> {
        let mut repositories = Vec::new();
        let mut page: u32 = 1;

        loop {
            let body = match self.executor.execute(&Self::page_request(page)).await? {
                Outcome::Success(body) => body,
                Outcome::Exhausted => {
                    info!(page, "repository listing exhausted");
                    break;
                }
            };

            let items: Vec<RestRepository> = serde_json::from_str(&body).map_err(|e| {
                Error::structural(format!("page {page} of {USER_REPOS_PATH}: {e}"))
            })?;
            let count = items.len();
            debug!(page, count, "fetched repository page");
            repositories.extend(items);

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        info!(count = repositories.len(), "listed accessible repositories");
        Ok(repositories)
    }
}
