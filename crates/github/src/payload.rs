//! Wire types for repository payloads and their normalization.
//!
//! Both APIs describe a repository with the same facts under different
//! names. Each payload type converts into a
//! [`RepositorySnapshot`](repotrail_protocol::RepositorySnapshot), which is
//! the only place fork/parent semantics are decided:
//!
//! | Snapshot field | REST (`/user/repos`) | GraphQL (`Repository`) |
//! |----------------|----------------------|------------------------|
//! | identity       | `full_name`          | `nameWithOwner`        |
//! | visibility     | `private`            | `isPrivate`            |
//! | owner login    | `owner.login`        | `owner.login`          |
//! | fork           | `fork`               | `isFork`               |
//! | original owner | `parent.owner.login` | `parent.owner.login`   |
//!
//! A fork whose parent is absent (deleted, or omitted by the listing
//! endpoint) normalizes to an unknown original owner rather than failing.

use repotrail_protocol::{RepositorySnapshot, Visibility};
use serde::Deserialize;

/// An account reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Owner {
    /// The account login.
    pub login: String,
}

/// The upstream repository of a fork. Only its owner is requested.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parent {
    /// Owner of the upstream repository.
    #[serde(default)]
    pub owner: Option<Owner>,
}

/// A repository as listed by `GET /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestRepository {
    /// `owner/name`.
    pub full_name: String,
    /// Whether the repository is private.
    pub private: bool,
    /// The repository owner.
    pub owner: Owner,
    /// Whether the repository is a fork.
    pub fork: bool,
    /// Upstream repository, when the endpoint includes it.
    #[serde(default)]
    pub parent: Option<Parent>,
}

/// A `Repository` node from the GraphQL API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRepository {
    /// `owner/name`.
    pub name_with_owner: String,
    /// Whether the repository is private.
    pub is_private: bool,
    /// Whether the repository is a fork.
    pub is_fork: bool,
    /// The repository owner.
    pub owner: Owner,
    /// Upstream repository, `null` for non-forks or deleted parents.
    #[serde(default)]
    pub parent: Option<Parent>,
}

fn parent_login(parent: Option<Parent>) -> Option<String> {
    parent.and_then(|p| p.owner).map(|o| o.login)
}

impl From<RestRepository> for RepositorySnapshot {
    fn from(repo: RestRepository) -> Self {
        RepositorySnapshot::new(
            repo.full_name,
            Visibility::from_private_flag(repo.private),
            repo.owner.login,
            repo.fork,
            parent_login(repo.parent),
        )
    }
}

impl From<GraphqlRepository> for RepositorySnapshot {
    fn from(repo: GraphqlRepository) -> Self {
        RepositorySnapshot::new(
            repo.name_with_owner,
            Visibility::from_private_flag(repo.is_private),
            repo.owner.login,
            repo.is_fork,
            parent_login(repo.parent),
        )
    }
}
