//! Repository records and their building blocks.
//!
//! A [`RepositorySnapshot`] is what a single sighting of a repository tells
//! us: its identity and scalar fields. A [`RepositoryRecord`] adds the set of
//! [`ContributionType`]s collected across every sighting of that identity.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Placeholder shown when a fork's upstream owner is unknown, or the
/// repository is not a fork.
pub const UNKNOWN_OWNER: &str = "_";

/// Whether a repository is visible to everyone or only to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Anyone can see the repository.
    Public,
    /// Only collaborators can see the repository.
    Private,
}

impl Visibility {
    /// Maps the `private` / `isPrivate` flag both GitHub APIs report.
    #[must_use]
    pub const fn from_private_flag(private: bool) -> Self {
        if private { Self::Private } else { Self::Public }
    }

    /// Returns the capitalized label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which repositories a discovery run keeps.
///
/// # Examples
///
/// ```
/// use repotrail_protocol::{Visibility, VisibilityFilter};
///
/// assert!(VisibilityFilter::Both.accepts(Visibility::Private));
/// assert!(VisibilityFilter::Public.accepts(Visibility::Public));
/// assert!(!VisibilityFilter::Public.accepts(Visibility::Private));
///
/// let filter: VisibilityFilter = "Private".parse().unwrap();
/// assert_eq!(filter, VisibilityFilter::Private);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityFilter {
    /// Keep only public repositories.
    Public,
    /// Keep only private repositories.
    Private,
    /// Keep everything.
    #[default]
    Both,
}

impl VisibilityFilter {
    /// Returns `true` if a repository with the given visibility passes.
    #[must_use]
    pub const fn accepts(self, visibility: Visibility) -> bool {
        match self {
            Self::Both => true,
            Self::Public => matches!(visibility, Visibility::Public),
            Self::Private => matches!(visibility, Visibility::Private),
        }
    }
}

impl FromStr for VisibilityFilter {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "both" | "all" => Ok(Self::Both),
            _ => Err(ProtocolError::UnknownVisibility(s.to_string())),
        }
    }
}

/// A way an account has interacted with a repository.
///
/// Serialized with the short codes used in reports (`commit`, `pr`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ContributionType {
    /// Authored commits on the default branch.
    #[serde(rename = "commit")]
    Commit,
    /// Opened pull requests.
    #[serde(rename = "pr", alias = "pull_request")]
    PullRequest,
    /// Opened issues.
    #[serde(rename = "issue")]
    Issue,
    /// Created the repository.
    #[serde(rename = "repo", alias = "repository")]
    RepositoryContribution,
    /// Reviewed pull requests.
    #[serde(rename = "review")]
    Review,
    /// Listed by `/user/repos`: owner, collaborator or organization member.
    #[serde(rename = "access", alias = "direct_access")]
    DirectAccess,
}

impl ContributionType {
    /// Every contribution type, in report order.
    pub const ALL: [Self; 6] = [
        Self::Commit,
        Self::PullRequest,
        Self::Issue,
        Self::RepositoryContribution,
        Self::Review,
        Self::DirectAccess,
    ];

    /// Returns the short code shown in reports.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::PullRequest => "pr",
            Self::Issue => "issue",
            Self::RepositoryContribution => "repo",
            Self::Review => "review",
            Self::DirectAccess => "access",
        }
    }
}

impl fmt::Display for ContributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ContributionType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commit" => Ok(Self::Commit),
            "pr" | "pull_request" => Ok(Self::PullRequest),
            "issue" => Ok(Self::Issue),
            "repo" | "repository" => Ok(Self::RepositoryContribution),
            "review" => Ok(Self::Review),
            "access" | "direct_access" => Ok(Self::DirectAccess),
            _ => Err(ProtocolError::UnknownContributionType(s.to_string())),
        }
    }
}

/// The scalar facts one API response reports about a repository.
///
/// The constructor enforces that `original_owner` is only kept for forks.
///
/// # Examples
///
/// ```
/// use repotrail_protocol::{RepositorySnapshot, Visibility};
///
/// let fork = RepositorySnapshot::new("me/tokio", Visibility::Public, "me", true, Some("tokio-rs".into()));
/// assert_eq!(fork.original_owner(), Some("tokio-rs"));
///
/// // A parent reported on a non-fork is dropped.
/// let plain = RepositorySnapshot::new("me/app", Visibility::Public, "me", false, Some("x".into()));
/// assert_eq!(plain.original_owner(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RepositorySnapshot {
    identity: String,
    visibility: Visibility,
    owner_login: String,
    is_fork: bool,
    original_owner: Option<String>,
}

impl RepositorySnapshot {
    /// Creates a snapshot, discarding `parent_owner` unless `is_fork` is set.
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        visibility: Visibility,
        owner_login: impl Into<String>,
        is_fork: bool,
        parent_owner: Option<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            visibility,
            owner_login: owner_login.into(),
            is_fork,
            original_owner: parent_owner.filter(|_| is_fork),
        }
    }

    /// The `owner/name` identity key.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Repository visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Login of the repository owner.
    #[must_use]
    pub fn owner_login(&self) -> &str {
        &self.owner_login
    }

    /// Whether the repository is a fork.
    #[must_use]
    pub fn is_fork(&self) -> bool {
        self.is_fork
    }

    /// Owner of the upstream repository, when this is a fork with a known parent.
    #[must_use]
    pub fn original_owner(&self) -> Option<&str> {
        self.original_owner.as_deref()
    }

    /// Lists the scalar fields on which `other` disagrees with `self`,
    /// as `(field, ours, theirs)`.
    pub(crate) fn differences(&self, other: &Self) -> Vec<(&'static str, String, String)> {
        let mut diffs = Vec::new();
        if self.visibility != other.visibility {
            diffs.push((
                "visibility",
                self.visibility.to_string(),
                other.visibility.to_string(),
            ));
        }
        if self.owner_login != other.owner_login {
            diffs.push((
                "owner_login",
                self.owner_login.clone(),
                other.owner_login.clone(),
            ));
        }
        if self.is_fork != other.is_fork {
            diffs.push(("is_fork", self.is_fork.to_string(), other.is_fork.to_string()));
        }
        if self.original_owner != other.original_owner {
            diffs.push((
                "original_owner",
                self.original_owner().unwrap_or(UNKNOWN_OWNER).to_string(),
                other.original_owner().unwrap_or(UNKNOWN_OWNER).to_string(),
            ));
        }
        diffs
    }
}

/// A discovered repository with every way the account interacted with it.
///
/// Records are only created with at least one contribution type, and the set
/// only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    #[serde(flatten)]
    snapshot: RepositorySnapshot,
    contribution_types: BTreeSet<ContributionType>,
}

impl RepositoryRecord {
    /// Creates a record from its first sighting.
    #[must_use]
    pub fn new(snapshot: RepositorySnapshot, contribution: ContributionType) -> Self {
        Self {
            snapshot,
            contribution_types: BTreeSet::from([contribution]),
        }
    }

    /// The scalar fields of this record.
    #[must_use]
    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }

    /// The `owner/name` identity key.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.snapshot.identity()
    }

    /// Repository visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.snapshot.visibility()
    }

    /// Login of the repository owner.
    #[must_use]
    pub fn owner_login(&self) -> &str {
        self.snapshot.owner_login()
    }

    /// Whether the repository is a fork.
    #[must_use]
    pub fn is_fork(&self) -> bool {
        self.snapshot.is_fork()
    }

    /// Owner of the upstream repository, if known.
    #[must_use]
    pub fn original_owner(&self) -> Option<&str> {
        self.snapshot.original_owner()
    }

    /// Every contribution type recorded so far, in report order.
    #[must_use]
    pub fn contribution_types(&self) -> &BTreeSet<ContributionType> {
        &self.contribution_types
    }

    /// Returns `true` if `/user/repos` listed this repository.
    #[must_use]
    pub fn has_direct_access(&self) -> bool {
        self.contribution_types
            .contains(&ContributionType::DirectAccess)
    }

    /// Joins the contribution codes for display, e.g. `"commit, pr"`.
    #[must_use]
    pub fn contribution_summary(&self) -> String {
        self.contribution_types
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn replace_snapshot(&mut self, snapshot: RepositorySnapshot) {
        self.snapshot = snapshot;
    }

    /// Unions `types` into this record, returning how many were new.
    pub(crate) fn add_contributions(
        &mut self,
        types: impl IntoIterator<Item = ContributionType>,
    ) -> usize {
        let before = self.contribution_types.len();
        self.contribution_types.extend(types);
        self.contribution_types.len() - before
    }
}
