//! Single-request execution with outcome classification.
//!
//! [`QueryExecutor::execute`] sends one [`Request`] through a [`Transport`]
//! and turns the raw response into an [`Outcome`]:
//!
//! | Response | Result |
//! |----------|--------|
//! | 200 | [`Outcome::Success`] with the body |
//! | 422 | [`Outcome::Exhausted`]: no more pages, not an error |
//! | 403 with `X-RateLimit-Remaining: 0` | sleep until `X-RateLimit-Reset`, resend |
//! | anything else | [`Error::Status`] |
//!
//! Rate limits are waited out in a loop, without bound: every GitHub rate
//! window eventually resets.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::transport::{RawResponse, Request, Transport};

/// How long to wait when a rate-limited response has no usable reset time.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Shortest suspension, so a reset time already in the past does not spin.
pub const MIN_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);

/// The classification of one raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// HTTP 200.
    Success(String),
    /// HTTP 422: the listing cannot be paged any further.
    Exhausted(String),
    /// HTTP 403 with no remaining quota.
    RateLimited {
        /// When the quota resets, if the header was usable.
        reset_at: Option<DateTime<Utc>>,
    },
    /// Any other status.
    Fatal {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },
}

/// Classifies a raw response.
///
/// # Examples
///
/// ```
/// use repotrail_github::{Classified, RawResponse, classify};
///
/// assert_eq!(classify(RawResponse::new(200, "[]")), Classified::Success("[]".into()));
/// assert!(matches!(
///     classify(RawResponse::new(403, "").with_rate_limit("0", 1_700_000_000)),
///     Classified::RateLimited { reset_at: Some(_) }
/// ));
/// // A 403 with quota left is a permissions problem, not a rate limit.
/// assert!(matches!(
///     classify(RawResponse::new(403, "").with_rate_limit("12", 1_700_000_000)),
///     Classified::Fatal { status: 403, .. }
/// ));
/// ```
#[must_use]
pub fn classify(response: RawResponse) -> Classified {
    match response.status {
        200 => Classified::Success(response.body),
        422 => Classified::Exhausted(response.body),
        403 if response.rate_limit_remaining.as_deref() == Some("0") => Classified::RateLimited {
            reset_at: response
                .rate_limit_reset
                .and_then(|epoch| DateTime::from_timestamp(epoch, 0)),
        },
        status => Classified::Fatal {
            status,
            body: response.body,
        },
    }
}

/// How long to suspend before retrying a rate-limited request.
#[must_use]
pub fn rate_limit_wait(reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    match reset_at {
        Some(reset_at) => (reset_at - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .max(MIN_RATE_LIMIT_WAIT),
        None => DEFAULT_RATE_LIMIT_WAIT,
    }
}

/// The result of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The body of a 200 response.
    Success(String),
    /// The source has no more pages; data collected so far stays valid.
    Exhausted,
}

/// Executes requests, waiting out rate limits.
#[derive(Debug)]
pub struct QueryExecutor<T> {
    transport: T,
}

impl<T: Transport> QueryExecutor<T> {
    /// Wraps a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request`, resending it after each rate-limit suspension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] for any status other than 200, 422 or a
    /// rate-limited 403, and propagates transport failures.
    #[instrument(skip(self, request), fields(endpoint = %request.uri()))]
    pub async fn execute(&self, request: &Request) -> Result<Outcome> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!(attempt, "sending request");
            let response = self.transport.send(request).await?;

            match classify(response) {
                Classified::Success(body) => return Ok(Outcome::Success(body)),
                Classified::Exhausted(body) => {
                    info!(%body, "reached pagination limit");
                    return Ok(Outcome::Exhausted);
                }
                Classified::RateLimited { reset_at } => {
                    let wait = rate_limit_wait(reset_at, Utc::now());
                    warn!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        "rate limit exceeded, sleeping until reset"
                    );
                    tokio::time::sleep(wait).await;
                }
                Classified::Fatal { status, body } => {
                    warn!(status, "request failed");
                    return Err(Error::Status { status, body });
                }
            }
        }
    }
}
