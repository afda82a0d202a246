//! Ordering and grouping of records for display.
//!
//! [`group_records`] stable-sorts records on a [`SortField`] and inserts
//! [`Row::Separator`] markers wherever the field's value changes, so a
//! renderer can draw visual breaks between groups.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::record::{RepositoryRecord, UNKNOWN_OWNER};

/// The record field a report is sorted and grouped by.
///
/// Parses from snake_case names or from the report's column headers,
/// ignoring case. Deserialization accepts the same spellings; serialization
/// writes the snake_case name.
///
/// # Examples
///
/// ```
/// use repotrail_protocol::SortField;
///
/// assert_eq!("owner_login".parse(), Ok(SortField::OwnerLogin));
/// assert_eq!("Original Owner".parse(), Ok(SortField::OriginalOwner));
/// assert_eq!("name".parse(), Ok(SortField::Identity));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SortField {
    /// The `owner/name` identity.
    Identity,
    /// Public or private.
    Visibility,
    /// The repository owner.
    #[default]
    OwnerLogin,
    /// Fork or not.
    IsFork,
    /// The upstream owner of a fork.
    OriginalOwner,
}

impl SortField {
    /// Returns the value of this field as shown in reports.
    #[must_use]
    pub fn display_value(self, record: &RepositoryRecord) -> Cow<'_, str> {
        match self {
            Self::Identity => Cow::Borrowed(record.identity()),
            Self::Visibility => Cow::Borrowed(record.visibility().label()),
            Self::OwnerLogin => Cow::Borrowed(record.owner_login()),
            Self::IsFork => Cow::Borrowed(yes_no(record.is_fork())),
            Self::OriginalOwner => Cow::Borrowed(record.original_owner().unwrap_or(UNKNOWN_OWNER)),
        }
    }

    /// Fields with few distinct values, whose group breaks get a double
    /// separator in readability mode.
    #[must_use]
    pub const fn is_coarse(self) -> bool {
        matches!(self, Self::Visibility | Self::IsFork | Self::OriginalOwner)
    }
}

impl FromStr for SortField {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "identity" | "name" => Ok(Self::Identity),
            "visibility" => Ok(Self::Visibility),
            "owner_login" | "owner" => Ok(Self::OwnerLogin),
            "is_fork" | "fork" => Ok(Self::IsFork),
            "original_owner" => Ok(Self::OriginalOwner),
            _ => Err(ProtocolError::UnknownSortField(s.to_string())),
        }
    }
}

impl TryFrom<String> for SortField {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Renders a boolean the way reports show it.
#[must_use]
pub const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// One line of a grouped report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A discovered repository.
    Record(RepositoryRecord),
    /// A visual break between groups. Not a repository.
    Separator,
}

impl Row {
    /// Returns the record, or `None` for a separator.
    #[must_use]
    pub fn record(&self) -> Option<&RepositoryRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Separator => None,
        }
    }

    /// Returns `true` for separator rows.
    #[must_use]
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

/// Sorts records on `field` and inserts separators between groups.
///
/// The sort is stable: records with equal values keep their input order.
/// Each group break gets one separator, or two when `better_readability` is
/// set and the field is coarse (see [`SortField::is_coarse`]).
///
/// # Examples
///
/// ```
/// use repotrail_protocol::{
///     ContributionType, RepositoryRecord, RepositorySnapshot, SortField, Visibility,
///     group_records,
/// };
///
/// let record = |identity: &str, owner: &str| {
///     let snapshot = RepositorySnapshot::new(identity, Visibility::Public, owner, false, None);
///     RepositoryRecord::new(snapshot, ContributionType::Commit)
/// };
///
/// let rows = group_records(
///     vec![record("zeta/a", "zeta"), record("acme/a", "acme"), record("acme/b", "acme")],
///     SortField::OwnerLogin,
///     false,
/// );
///
/// let layout: Vec<_> = rows
///     .iter()
///     .map(|row| row.record().map_or("-", |r| r.identity()))
///     .collect();
/// assert_eq!(layout, ["acme/a", "acme/b", "-", "zeta/a"]);
/// ```
#[must_use]
pub fn group_records(
    records: impl IntoIterator<Item = RepositoryRecord>,
    field: SortField,
    better_readability: bool,
) -> Vec<Row> {
    let mut records: Vec<RepositoryRecord> = records.into_iter().collect();
    records.sort_by(|a, b| field.display_value(a).cmp(&field.display_value(b)));

    let separators_per_break = if better_readability && field.is_coarse() {
        2
    } else {
        1
    };

    let mut rows = Vec::with_capacity(records.len());
    let mut previous: Option<String> = None;
    for record in records {
        let value = field.display_value(&record).into_owned();
        if previous.as_ref().is_some_and(|p| *p != value) {
            rows.extend(std::iter::repeat_n(Row::Separator, separators_per_break));
        }
        previous = Some(value);
        rows.push(Row::Record(record));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ContributionType, RepositorySnapshot, Visibility};

    fn record(identity: &str, owner: &str, private: bool, parent: Option<&str>) -> RepositoryRecord {
        let snapshot = RepositorySnapshot::new(
            identity,
            Visibility::from_private_flag(private),
            owner,
            parent.is_some(),
            parent.map(String::from),
        );
        RepositoryRecord::new(snapshot, ContributionType::DirectAccess)
    }

    fn layout(rows: &[Row]) -> Vec<&str> {
        rows.iter()
            .map(|row| row.record().map_or("_", |r| r.identity()))
            .collect()
    }

    #[test]
    fn single_separator_between_owner_groups() {
        let rows = group_records(
            vec![
                record("acme/a", "acme", false, None),
                record("acme/b", "acme", false, None),
                record("zeta/c", "zeta", false, None),
            ],
            SortField::OwnerLogin,
            false,
        );

        assert_eq!(rows.iter().filter(|r| r.is_separator()).count(), 1);
        assert!(rows[2].is_separator());
        assert_eq!(layout(&rows), ["acme/a", "acme/b", "_", "zeta/c"]);
    }

    #[test]
    fn readability_doubles_only_coarse_breaks() {
        let records = vec![
            record("acme/a", "acme", false, None),
            record("zeta/c", "zeta", true, None),
        ];

        let by_owner = group_records(records.clone(), SortField::OwnerLogin, true);
        assert_eq!(layout(&by_owner), ["acme/a", "_", "zeta/c"]);

        let by_visibility = group_records(records, SortField::Visibility, true);
        assert_eq!(layout(&by_visibility), ["zeta/c", "_", "_", "acme/a"]);
    }

    #[test]
    fn sort_is_stable_within_groups() {
        let rows = group_records(
            vec![
                record("m/3", "m", false, None),
                record("m/1", "m", false, None),
                record("m/2", "m", false, None),
            ],
            SortField::OwnerLogin,
            true,
        );
        assert_eq!(layout(&rows), ["m/3", "m/1", "m/2"]);
    }

    #[test]
    fn original_owner_groups_unknown_together() {
        let rows = group_records(
            vec![
                record("me/a", "me", false, None),
                record("me/b", "me", false, Some("up")),
                record("me/c", "me", false, None),
            ],
            SortField::OriginalOwner,
            false,
        );
        assert_eq!(layout(&rows), ["me/a", "me/c", "_", "me/b"]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(group_records(Vec::new(), SortField::Identity, true).is_empty());
    }

    #[test]
    fn sort_field_parsing() {
        assert_eq!("Is Fork".parse(), Ok(SortField::IsFork));
        assert_eq!("OWNER".parse(), Ok(SortField::OwnerLogin));
        assert_eq!("original-owner".parse(), Ok(SortField::OriginalOwner));
        assert_eq!(
            "stars".parse::<SortField>(),
            Err(ProtocolError::UnknownSortField("stars".to_string()))
        );
    }

    #[test]
    fn sort_field_serde_aliases() {
        let field: SortField = serde_json::from_str(r#""owner""#).unwrap();
        assert_eq!(field, SortField::OwnerLogin);
        assert_eq!(
            serde_json::to_string(&SortField::IsFork).unwrap(),
            r#""is_fork""#
        );
    }

    #[test]
    fn sort_field_deserializes_column_headers() {
        for (json, expected) in [
            (r#""Is Fork""#, SortField::IsFork),
            (r#""Original Owner""#, SortField::OriginalOwner),
            (r#""Name""#, SortField::Identity),
            (r#""fork""#, SortField::IsFork),
            (r#""visibility""#, SortField::Visibility),
        ] {
            let field: SortField = serde_json::from_str(json).unwrap();
            assert_eq!(field, expected, "{json}");
        }

        let err = serde_json::from_str::<SortField>(r#""stars""#).unwrap_err();
        assert!(err.to_string().contains("stars"));
    }
}
