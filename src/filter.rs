//! Typed filters and update assignments for the record store.
//!
//! A filter is an exact-match conjunction: every populated field must match
//! for an entry to be selected (logical AND, no ranges or negation). The
//! empty filter matches every stored entry. Using a closed set of typed
//! fields here keeps field access checkable at compile time instead of
//! going through string keys.

use time::{Date, Time};

use crate::{DatabaseID, Tag};

/// Selects ledger entries by exact match on any subset of fields.
///
/// Populate fields with the struct update syntax:
///
/// ```rust
/// use pocket_ledger::EntryFilter;
///
/// let filter = EntryFilter {
///     from_person: Some("Rudran".to_string()),
///     ..Default::default()
/// };
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryFilter {
    /// Match on the entry ID.
    pub id: Option<DatabaseID>,
    /// Match on the noted date.
    pub noted_date: Option<Date>,
    /// Match on the noted time of day.
    pub noted_time: Option<Time>,
    /// Match on the sender.
    pub from_person: Option<String>,
    /// Match on the receiver.
    pub to_person: Option<String>,
    /// Match on the description.
    pub description: Option<String>,
    /// Match on the exact amount.
    pub amount: Option<f64>,
    /// Match on the tag.
    pub tag: Option<Tag>,
}

impl EntryFilter {
    /// A filter that matches every stored entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Shortcut for filtering by entry ID.
    pub fn by_id(id: DatabaseID) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// True when no fields are populated, i.e. the filter matches
    /// everything.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.noted_date.is_none()
            && self.noted_time.is_none()
            && self.from_person.is_none()
            && self.to_person.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.tag.is_none()
    }
}

/// Field assignments applied by
/// [LedgerStore::update](crate::LedgerStore::update).
///
/// Only populated fields are written; the entry ID cannot be reassigned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryUpdate {
    /// Replace the noted date.
    pub noted_date: Option<Date>,
    /// Replace the noted time of day.
    pub noted_time: Option<Time>,
    /// Replace the sender.
    pub from_person: Option<String>,
    /// Replace the receiver.
    pub to_person: Option<String>,
    /// Replace the description.
    pub description: Option<String>,
    /// Replace the amount.
    pub amount: Option<f64>,
    /// Replace the tag.
    pub tag: Option<Tag>,
}

impl EntryUpdate {
    /// True when no assignments are populated.
    pub fn is_empty(&self) -> bool {
        self.noted_date.is_none()
            && self.noted_time.is_none()
            && self.from_person.is_none()
            && self.to_person.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.tag.is_none()
    }
}

/// Defines how many matches [LedgerStore::query](crate::LedgerStore::query)
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Return every match.
    All,
    /// Return the single match. Zero or multiple matches yield an empty
    /// result instead of an error.
    One,
    /// Return up to the first N matches.
    Many(u64),
}

impl Default for FetchMode {
    /// The first ten matches.
    fn default() -> Self {
        FetchMode::Many(10)
    }
}

/// Defines how many matches [LedgerStore::delete](crate::LedgerStore::delete)
/// removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Delete the first match only.
    One,
    /// Delete every match.
    All,
}

#[cfg(test)]
mod filter_tests {
    use super::{EntryFilter, EntryUpdate, FetchMode};

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EntryFilter::all().is_empty());
        assert!(EntryFilter::default().is_empty());
    }

    #[test]
    fn populated_filter_is_not_empty() {
        assert!(!EntryFilter::by_id(1).is_empty());

        let filter = EntryFilter {
            amount: Some(0.0),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }

    #[test]
    fn empty_update_has_no_assignments() {
        assert!(EntryUpdate::default().is_empty());

        let update = EntryUpdate {
            amount: Some(0.0),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn default_fetch_mode_is_first_ten() {
        assert_eq!(FetchMode::default(), FetchMode::Many(10));
    }
}
