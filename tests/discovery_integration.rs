//! End-to-end discovery against a scripted transport, through grouping.

use std::sync::Mutex;

use repotrail_github::{
    Discovery, DiscoveryOptions, QueryExecutor, RawResponse, Request, Result, Transport,
};
use repotrail_protocol::{ContributionType, SortField, VisibilityFilter, group_records};
use serde_json::{Value, json};

/// Answers REST listing pages and the contributions query from fixed data.
struct FakeGitHub {
    rest_pages: Vec<Value>,
    contributions: Value,
    requests: Mutex<Vec<Request>>,
}

impl FakeGitHub {
    fn new(rest_pages: Vec<Value>, contributions: Value) -> Self {
        Self {
            rest_pages,
            contributions,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn graphql_calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches!(r, Request::GraphQl { .. }))
            .count()
    }
}

impl Transport for FakeGitHub {
    async fn send(&self, request: &Request) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let body = match request {
            Request::RestGet { query, .. } => {
                let page: usize = query
                    .iter()
                    .find(|(key, _)| key == "page")
                    .and_then(|(_, value)| value.parse().ok())
                    .unwrap();
                self.rest_pages
                    .get(page - 1)
                    .cloned()
                    .unwrap_or_else(|| json!([]))
            }
            Request::GraphQl { .. } => self.contributions.clone(),
        };
        Ok(RawResponse::new(200, body.to_string()))
    }
}

fn rest_repo(full_name: &str, private: bool, fork: Option<&str>) -> Value {
    let owner = full_name.split('/').next().unwrap();
    json!({
        "full_name": full_name,
        "private": private,
        "owner": { "login": owner },
        "fork": fork.is_some(),
        "parent": fork.map(|p| json!({ "owner": { "login": p } })),
    })
}

fn node(name_with_owner: &str) -> Value {
    let owner = name_with_owner.split('/').next().unwrap();
    json!({ "repository": {
        "nameWithOwner": name_with_owner,
        "isPrivate": false,
        "isFork": false,
        "owner": { "login": owner },
        "parent": null,
    }})
}

fn contributions(commits: Vec<Value>, pull_requests: Vec<Value>, reviews: Vec<Value>) -> Value {
    let done = json!({ "endCursor": null, "hasNextPage": false });
    json!({ "data": { "viewer": { "contributionsCollection": {
        "commitContributionsByRepository": commits,
        "pullRequestContributionsByRepository": pull_requests,
        "issueContributionsByRepository": [],
        "repositoryContributions": { "nodes": [], "pageInfo": done },
        "pullRequestReviewContributions": { "nodes": reviews, "pageInfo": done },
    }}}})
}

#[tokio::test]
async fn contributions_to_one_repository_merge_into_one_record() {
    let fake = FakeGitHub::new(
        vec![json!([])],
        contributions(vec![node("acme/x")], vec![node("acme/x")], vec![]),
    );
    let records = Discovery::new(QueryExecutor::new(fake), DiscoveryOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let record = records.get("acme/x").unwrap();
    assert_eq!(
        record.contribution_types().iter().copied().collect::<Vec<_>>(),
        [ContributionType::Commit, ContributionType::PullRequest]
    );
}

#[tokio::test]
async fn full_report_is_grouped_by_owner() {
    let fake = FakeGitHub::new(
        vec![json!([
            rest_repo("me/dotfiles", true, None),
            rest_repo("me/tokio", false, Some("tokio-rs")),
            rest_repo("acme/x", false, None),
        ])],
        contributions(
            vec![node("acme/x")],
            vec![node("zeta/y")],
            vec![node("acme/z")],
        ),
    );
    let mut records = Discovery::new(QueryExecutor::new(fake), DiscoveryOptions::default())
        .run()
        .await
        .unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records.get("me/tokio").unwrap().original_owner(), Some("tokio-rs"));

    records.retain_contributions(&[ContributionType::Commit, ContributionType::DirectAccess]);
    let rows = group_records(records, SortField::OwnerLogin, false);
    let layout: Vec<_> = rows
        .iter()
        .map(|row| row.record().map_or("-", |r| r.identity()))
        .collect();
    assert_eq!(layout, ["acme/x", "-", "me/dotfiles", "me/tokio"]);
}

#[tokio::test]
async fn has_access_only_lists_rest_repositories() {
    let fake = FakeGitHub::new(
        vec![json!([rest_repo("me/a", false, None), rest_repo("me/b", true, None)])],
        contributions(vec![node("zeta/y")], vec![], vec![]),
    );
    let discovery = Discovery::new(
        QueryExecutor::new(fake),
        DiscoveryOptions {
            visibility: VisibilityFilter::Private,
            has_access_only: true,
        },
    );

    let records = discovery.run().await.unwrap();
    let identities: Vec<_> = records.iter().map(|r| r.identity()).collect();
    assert_eq!(identities, ["me/b"]);
    assert_eq!(discovery.executor().transport().graphql_calls(), 0);
}
