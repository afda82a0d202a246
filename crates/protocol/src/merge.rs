//! Identity-keyed merging of repository sightings.
//!
//! A [`RecordSet`] holds at most one [`RepositoryRecord`] per identity. New
//! sightings either create a record or union their contribution type into the
//! existing one. Only scalar fields are ever overwritten:
//!
//! - a record tagged [`ContributionType::DirectAccess`] (from `/user/repos`,
//!   which reflects live access) keeps its scalars over one that is not;
//! - otherwise the smaller [`RepositorySnapshot`] wins.
//!
//! Merging is idempotent and does not depend on input order: folding the
//! REST listing before or after the GraphQL contributions produces the same
//! records, even when sources disagree.
//!
//! # Examples
//!
//! ```
//! use repotrail_protocol::{
//!     ContributionType, RecordSet, RepositorySnapshot, Visibility, VisibilityFilter,
//! };
//!
//! let acme_x = RepositorySnapshot::new("acme/x", Visibility::Public, "acme", false, None);
//!
//! let mut set = RecordSet::new();
//! set.merge(acme_x.clone(), ContributionType::Commit, VisibilityFilter::Both);
//! set.merge(acme_x, ContributionType::PullRequest, VisibilityFilter::Both);
//!
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.get("acme/x").unwrap().contribution_summary(), "commit, pr");
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::record::{ContributionType, RepositoryRecord, RepositorySnapshot, VisibilityFilter};

/// What a single [`RecordSet::merge`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The visibility filter rejected the sighting; nothing changed.
    Rejected,
    /// A new record was created.
    Inserted,
    /// An existing record absorbed the sighting.
    Updated {
        /// How many contribution types were new to the record.
        new_contributions: usize,
        /// Scalar fields on which the sighting disagreed with the record.
        conflicts: Vec<Inconsistency>,
    },
}

impl MergeOutcome {
    /// Returns `true` if the visibility filter dropped the sighting.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Two sightings of the same identity disagree on a scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// The repository concerned.
    pub identity: String,
    /// Name of the disagreeing field.
    pub field: &'static str,
    /// Value already held by the set.
    pub existing: String,
    /// Value reported by the new sighting.
    pub incoming: String,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: sources disagree on {} ({} vs {})",
            self.identity, self.field, self.existing, self.incoming
        )
    }
}

/// Repository records keyed by identity, kept in first-sighting order.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<RepositoryRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no repository has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by its `owner/name` identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&RepositoryRecord> {
        self.index.get(identity).map(|&i| &self.records[i])
    }

    /// Iterates records in first-sighting order.
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryRecord> {
        self.records.iter()
    }

    /// Consumes the set, returning records in first-sighting order.
    #[must_use]
    pub fn into_records(self) -> Vec<RepositoryRecord> {
        self.records
    }

    /// Folds one sighting into the set.
    ///
    /// The visibility filter is applied first: a rejected sighting leaves the
    /// set untouched and contributes no tag.
    pub fn merge(
        &mut self,
        snapshot: RepositorySnapshot,
        contribution: ContributionType,
        filter: VisibilityFilter,
    ) -> MergeOutcome {
        if !filter.accepts(snapshot.visibility()) {
            return MergeOutcome::Rejected;
        }
        self.upsert(RepositoryRecord::new(snapshot, contribution))
    }

    /// Unions another set into this one, by identity.
    ///
    /// Returns every scalar disagreement found along the way. Records that
    /// carry [`ContributionType::DirectAccess`] keep their scalar fields
    /// whichever side they come from; ties go to the smaller snapshot.
    pub fn absorb(&mut self, other: RecordSet) -> Vec<Inconsistency> {
        let mut conflicts = Vec::new();
        for record in other.records {
            if let MergeOutcome::Updated {
                conflicts: found, ..
            } = self.upsert(record)
            {
                conflicts.extend(found);
            }
        }
        conflicts
    }

    /// Keeps only records with at least one of the given contribution types.
    ///
    /// An empty selection keeps everything.
    pub fn retain_contributions(&mut self, selected: &[ContributionType]) {
        if selected.is_empty() {
            return;
        }
        self.records.retain(|record| {
            selected
                .iter()
                .any(|c| record.contribution_types().contains(c))
        });
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.identity().to_string(), i))
            .collect();
    }

    fn upsert(&mut self, incoming: RepositoryRecord) -> MergeOutcome {
        let Some(&position) = self.index.get(incoming.identity()) else {
            self.index
                .insert(incoming.identity().to_string(), self.records.len());
            self.records.push(incoming);
            return MergeOutcome::Inserted;
        };

        let existing = &mut self.records[position];
        let conflicts = existing
            .snapshot()
            .differences(incoming.snapshot())
            .into_iter()
            .map(|(field, ours, theirs)| Inconsistency {
                identity: incoming.identity().to_string(),
                field,
                existing: ours,
                incoming: theirs,
            })
            .collect::<Vec<_>>();

        let prefer_incoming = match (existing.has_direct_access(), incoming.has_direct_access()) {
            (false, true) => true,
            (true, false) => false,
            _ => incoming.snapshot() < existing.snapshot(),
        };
        let new_contributions =
            existing.add_contributions(incoming.contribution_types().iter().copied());
        if prefer_incoming {
            existing.replace_snapshot(incoming.snapshot().clone());
        }

        MergeOutcome::Updated {
            new_contributions,
            conflicts,
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = RepositoryRecord;
    type IntoIter = std::vec::IntoIter<RepositoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::record::Visibility;

    fn snapshot(identity: &str, visibility: Visibility) -> RepositorySnapshot {
        let owner = identity.split('/').next().unwrap_or_default();
        RepositorySnapshot::new(identity, visibility, owner, false, None)
    }

    fn by_identity(set: &RecordSet) -> BTreeMap<String, RepositoryRecord> {
        set.iter()
            .map(|r| (r.identity().to_string(), r.clone()))
            .collect()
    }

    #[test]
    fn merge_inserts_then_unions() {
        let mut set = RecordSet::new();
        let acme = snapshot("acme/x", Visibility::Public);

        assert_eq!(
            set.merge(acme.clone(), ContributionType::Commit, VisibilityFilter::Both),
            MergeOutcome::Inserted
        );
        assert_eq!(
            set.merge(acme, ContributionType::PullRequest, VisibilityFilter::Both),
            MergeOutcome::Updated {
                new_contributions: 1,
                conflicts: vec![],
            }
        );

        let record = set.get("acme/x").unwrap();
        assert_eq!(
            record.contribution_types().iter().copied().collect::<Vec<_>>(),
            vec![ContributionType::Commit, ContributionType::PullRequest]
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let mut set = RecordSet::new();
        let acme = snapshot("acme/x", Visibility::Public);
        set.merge(acme.clone(), ContributionType::Issue, VisibilityFilter::Both);
        let before = by_identity(&set);

        let outcome = set.merge(acme, ContributionType::Issue, VisibilityFilter::Both);
        assert_eq!(
            outcome,
            MergeOutcome::Updated {
                new_contributions: 0,
                conflicts: vec![],
            }
        );
        assert_eq!(by_identity(&set), before);
    }

    #[test]
    fn rejected_sighting_contributes_nothing() {
        let mut set = RecordSet::new();
        set.merge(
            snapshot("acme/secret", Visibility::Private),
            ContributionType::Commit,
            VisibilityFilter::Both,
        );

        // Same identity, rejected by the filter: the review tag must not leak in.
        let outcome = set.merge(
            snapshot("acme/secret", Visibility::Private),
            ContributionType::Review,
            VisibilityFilter::Public,
        );
        assert!(outcome.is_rejected());
        assert_eq!(set.get("acme/secret").unwrap().contribution_summary(), "commit");
    }

    #[test]
    fn visibility_filters_partition_both() {
        let sightings = [
            snapshot("a/pub", Visibility::Public),
            snapshot("a/priv", Visibility::Private),
            snapshot("b/pub", Visibility::Public),
        ];

        let run = |filter| {
            let mut set = RecordSet::new();
            for s in &sightings {
                set.merge(s.clone(), ContributionType::DirectAccess, filter);
            }
            set
        };

        let public = run(VisibilityFilter::Public);
        let private = run(VisibilityFilter::Private);
        let both = run(VisibilityFilter::Both);

        assert!(public.iter().all(|r| r.visibility() == Visibility::Public));
        assert!(private.iter().all(|r| r.visibility() == Visibility::Private));
        assert_eq!(both.len(), public.len() + private.len());
        for record in public.iter().chain(private.iter()) {
            assert!(both.get(record.identity()).is_some());
        }
    }

    #[test]
    fn absorb_reports_inconsistency_and_prefers_direct_access() {
        let mut graphql = RecordSet::new();
        graphql.merge(
            snapshot("acme/x", Visibility::Public),
            ContributionType::Commit,
            VisibilityFilter::Both,
        );
        let mut rest = RecordSet::new();
        rest.merge(
            snapshot("acme/x", Visibility::Private),
            ContributionType::DirectAccess,
            VisibilityFilter::Both,
        );

        let conflicts = graphql.clone().absorb(rest.clone());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, "visibility");
        assert_eq!(
            conflicts[0].to_string(),
            "acme/x: sources disagree on visibility (Public vs Private)"
        );

        let mut rest_first = rest.clone();
        rest_first.absorb(graphql.clone());
        let mut graphql_first = graphql;
        graphql_first.absorb(rest);

        for set in [&rest_first, &graphql_first] {
            let record = set.get("acme/x").unwrap();
            assert_eq!(record.visibility(), Visibility::Private);
            assert_eq!(record.contribution_summary(), "commit, access");
        }
    }

    #[test]
    fn conflicting_sightings_resolve_independently_of_order() {
        let public = snapshot("acme/x", Visibility::Public);
        let private = snapshot("acme/x", Visibility::Private);

        let mut forward = RecordSet::new();
        forward.merge(public.clone(), ContributionType::Commit, VisibilityFilter::Both);
        let outcome = forward.merge(private.clone(), ContributionType::Review, VisibilityFilter::Both);
        assert!(matches!(
            outcome,
            MergeOutcome::Updated { ref conflicts, .. } if conflicts.len() == 1
        ));

        let mut backward = RecordSet::new();
        backward.merge(private, ContributionType::Review, VisibilityFilter::Both);
        backward.merge(public, ContributionType::Commit, VisibilityFilter::Both);

        assert_eq!(by_identity(&forward), by_identity(&backward));
        let record = forward.get("acme/x").unwrap();
        assert_eq!(record.visibility(), Visibility::Public);
        assert_eq!(record.contribution_summary(), "commit, review");
    }

    #[test]
    fn direct_access_ties_go_to_smaller_snapshot() {
        let fork = RepositorySnapshot::new("me/x", Visibility::Public, "me", true, Some("up".into()));
        let plain = snapshot("me/x", Visibility::Public);

        let mut forward = RecordSet::new();
        forward.merge(fork.clone(), ContributionType::DirectAccess, VisibilityFilter::Both);
        forward.merge(plain.clone(), ContributionType::DirectAccess, VisibilityFilter::Both);
        let mut backward = RecordSet::new();
        backward.merge(plain, ContributionType::DirectAccess, VisibilityFilter::Both);
        backward.merge(fork, ContributionType::DirectAccess, VisibilityFilter::Both);

        assert_eq!(by_identity(&forward), by_identity(&backward));
        assert!(!forward.get("me/x").unwrap().is_fork());
    }

    #[test]
    fn retain_contributions_filters_and_reindexes() {
        let mut set = RecordSet::new();
        set.merge(
            snapshot("a/one", Visibility::Public),
            ContributionType::Commit,
            VisibilityFilter::Both,
        );
        set.merge(
            snapshot("a/two", Visibility::Public),
            ContributionType::Review,
            VisibilityFilter::Both,
        );

        set.retain_contributions(&[]);
        assert_eq!(set.len(), 2);

        set.retain_contributions(&[ContributionType::Review]);
        assert_eq!(set.len(), 1);
        assert!(set.get("a/one").is_none());
        assert!(set.get("a/two").is_some());
    }

    fn arb_contribution() -> impl Strategy<Value = ContributionType> {
        prop::sample::select(ContributionType::ALL.to_vec())
    }

    /// Sightings over a small pool of identities. Scalars are derived from the
    /// identity so that sources always agree.
    fn arb_sightings() -> impl Strategy<Value = Vec<(RepositorySnapshot, ContributionType)>> {
        prop::collection::vec((0usize..6, arb_contribution()), 0..40).prop_map(|picks| {
            picks
                .into_iter()
                .map(|(n, contribution)| {
                    let visibility = Visibility::from_private_flag(n % 2 == 1);
                    (snapshot(&format!("owner{}/repo{n}", n % 3), visibility), contribution)
                })
                .collect()
        })
    }

    /// Sightings over a small pool of identities whose scalars vary freely,
    /// so sources often disagree.
    fn arb_conflicting_sightings()
    -> impl Strategy<Value = Vec<(RepositorySnapshot, ContributionType)>> {
        let sighting = (
            0usize..3,
            any::<bool>(),
            prop::sample::select(vec!["alice", "bob"]),
            prop::option::of(prop::sample::select(vec!["up", "stream"])),
            arb_contribution(),
        );
        prop::collection::vec(sighting, 0..30).prop_map(|picks| {
            picks
                .into_iter()
                .map(|(n, private, owner, parent, contribution)| {
                    let snapshot = RepositorySnapshot::new(
                        format!("shared/repo{n}"),
                        Visibility::from_private_flag(private),
                        owner,
                        parent.is_some(),
                        parent.map(String::from),
                    );
                    (snapshot, contribution)
                })
                .collect()
        })
    }

    fn build(sightings: &[(RepositorySnapshot, ContributionType)]) -> RecordSet {
        let mut set = RecordSet::new();
        for (s, c) in sightings.iter().cloned() {
            set.merge(s, c, VisibilityFilter::Both);
        }
        set
    }

    proptest! {
        /// Conflicting sightings resolve the same way in any order.
        #[test]
        fn conflicting_merge_order_independent(sightings in arb_conflicting_sightings()) {
            let mut reversed = sightings.clone();
            reversed.reverse();
            prop_assert_eq!(by_identity(&build(&sightings)), by_identity(&build(&reversed)));
        }

        /// Absorbing conflicting sets in either direction yields the same records.
        #[test]
        fn conflicting_absorb_commutes(
            left in arb_conflicting_sightings(),
            right in arb_conflicting_sightings(),
        ) {
            let mut ab = build(&left);
            let ab_conflicts = ab.absorb(build(&right));
            let mut ba = build(&right);
            let ba_conflicts = ba.absorb(build(&left));

            prop_assert_eq!(ab_conflicts.len(), ba_conflicts.len());
            prop_assert_eq!(by_identity(&ab), by_identity(&ba));
        }

        /// A record seen through `/user/repos` keeps a direct-access snapshot.
        #[test]
        fn direct_access_snapshot_survives(sightings in arb_conflicting_sightings()) {
            let set = build(&sightings);
            for record in set.iter().filter(|r| r.has_direct_access()) {
                let has_direct_sighting = sightings.iter().any(|(s, c)| {
                    *c == ContributionType::DirectAccess && s == record.snapshot()
                });
                prop_assert!(has_direct_sighting);
            }
        }

        /// Merging the same sightings in reverse order yields the same records.
        #[test]
        fn merge_order_independent(sightings in arb_sightings()) {
            let mut forward = RecordSet::new();
            for (s, c) in sightings.iter().cloned() {
                forward.merge(s, c, VisibilityFilter::Both);
            }
            let mut backward = RecordSet::new();
            for (s, c) in sightings.into_iter().rev() {
                backward.merge(s, c, VisibilityFilter::Both);
            }
            prop_assert_eq!(by_identity(&forward), by_identity(&backward));
        }

        /// Absorbing A into B or B into A yields the same records.
        #[test]
        fn absorb_commutes(left in arb_sightings(), right in arb_sightings()) {
            let build = |sightings: &[(RepositorySnapshot, ContributionType)]| {
                let mut set = RecordSet::new();
                for (s, c) in sightings.iter().cloned() {
                    set.merge(s, c, VisibilityFilter::Both);
                }
                set
            };

            let mut ab = build(&left);
            prop_assert!(ab.absorb(build(&right)).is_empty());
            let mut ba = build(&right);
            prop_assert!(ba.absorb(build(&left)).is_empty());

            prop_assert_eq!(by_identity(&ab), by_identity(&ba));
        }

        /// Every record keeps at least one contribution type.
        #[test]
        fn records_never_empty(sightings in arb_sightings()) {
            let mut set = RecordSet::new();
            for (s, c) in sightings {
                set.merge(s, c, VisibilityFilter::Both);
            }
            prop_assert!(set.iter().all(|r| !r.contribution_types().is_empty()));
        }
    }
}
