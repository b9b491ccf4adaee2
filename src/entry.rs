//! The ledger entry model.
//!
//! This module contains the plain data types for a recorded money movement:
//! - [LedgerEntry] and [LedgerEntryBuilder] for creating entries
//! - The [Tag] enum marking an entry as a credit or a debit
//!
//! The types here carry no persistence dependency; mapping to and from the
//! database lives in the store.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};

use crate::Error;

/// Alias for the integer type used for database primary keys.
pub type DatabaseID = i64;

/// The maximum number of characters in the `from_person` and `to_person`
/// fields.
pub const MAX_PERSON_LEN: usize = 30;

/// The maximum number of characters in the `description` field.
pub const MAX_DESCRIPTION_LEN: usize = 400;

/// Marks a ledger entry as money lent out (CREDIT) or borrowed (DEBIT).
///
/// Each entry stands alone: nothing links a CREDIT entry to a matching
/// DEBIT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Money given by `from_person` to `to_person`.
    #[serde(rename = "CREDIT")]
    Credit,
    /// Money taken by `from_person` from `to_person`.
    #[serde(rename = "DEBIT")]
    Debit,
}

impl Tag {
    /// The tag as it is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Credit => "CREDIT",
            Tag::Debit => "DEBIT",
        }
    }
}

impl FromStr for Tag {
    type Err = Error;

    /// Parse a tag, accepting any casing of `CREDIT` or `DEBIT`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidTag] for any other string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(Tag::Credit),
            "DEBIT" => Ok(Tag::Debit),
            _ => Err(Error::InvalidTag(s.to_string())),
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded money movement between two named parties.
///
/// To create a new entry, use [LedgerEntry::build] and pass the builder to
/// [LedgerStore::insert](crate::LedgerStore::insert), which assigns the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The ID of the entry. Unique, assigned by the store, never reused.
    pub id: DatabaseID,
    /// The calendar date the transaction was noted on.
    pub noted_date: Date,
    /// The time of day the transaction was noted at.
    pub noted_time: Time,
    /// The person the money moved from.
    pub from_person: String,
    /// The person the money moved to.
    pub to_person: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money moved. The sign is not constrained.
    pub amount: f64,
    /// Whether the movement was a credit or a debit.
    pub tag: Tag,
}

impl LedgerEntry {
    /// Create a new ledger entry.
    ///
    /// Shortcut for [LedgerEntryBuilder] for discoverability. The noted date
    /// and time default to the current UTC date and time.
    pub fn build(
        from_person: impl Into<String>,
        to_person: impl Into<String>,
        amount: f64,
        tag: Tag,
    ) -> LedgerEntryBuilder {
        let now = OffsetDateTime::now_utc();

        LedgerEntryBuilder {
            noted_date: now.date(),
            noted_time: now.time(),
            from_person: from_person.into(),
            to_person: to_person.into(),
            description: String::new(),
            amount,
            tag,
        }
    }
}

/// A builder for creating [LedgerEntry] instances.
///
/// The builder holds every field of an entry except the ID, which the store
/// assigns on insert.
///
/// # Examples
///
/// ```rust
/// use time::macros::{date, time};
///
/// use pocket_ledger::{LedgerEntry, Tag};
///
/// let draft = LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)
///     .description("Loan repayment")
///     .noted_on(date!(2026 - 01 - 15))
///     .noted_at(time!(09:30:00));
///
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntryBuilder {
    /// The calendar date the transaction was noted on.
    pub noted_date: Date,
    /// The time of day the transaction was noted at.
    pub noted_time: Time,
    /// The person the money moved from. At most [MAX_PERSON_LEN] characters.
    pub from_person: String,
    /// The person the money moved to. At most [MAX_PERSON_LEN] characters.
    pub to_person: String,
    /// What the transaction was for. At most [MAX_DESCRIPTION_LEN]
    /// characters. Defaults to the empty string.
    pub description: String,
    /// The amount of money moved. Must be finite; the sign is not
    /// constrained.
    pub amount: f64,
    /// Whether the movement was a credit or a debit.
    pub tag: Tag,
}

impl LedgerEntryBuilder {
    /// Set the description for the entry.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the date the transaction was noted on.
    pub fn noted_on(mut self, date: Date) -> Self {
        self.noted_date = date;
        self
    }

    /// Set the time of day the transaction was noted at.
    pub fn noted_at(mut self, time: Time) -> Self {
        self.noted_time = time;
        self
    }

    /// Check the builder's fields against the model's constraints.
    ///
    /// The store calls this before writing, so a draft that fails validation
    /// never reaches the database.
    ///
    /// # Errors
    /// Returns an [Error::FieldTooLong] if a string field exceeds its
    /// maximum length, or an [Error::NonFiniteAmount] if the amount is NaN
    /// or infinite.
    pub fn validate(&self) -> Result<(), Error> {
        if self.from_person.chars().count() > MAX_PERSON_LEN {
            return Err(Error::FieldTooLong {
                field: "from_person",
                max: MAX_PERSON_LEN,
            });
        }

        if self.to_person.chars().count() > MAX_PERSON_LEN {
            return Err(Error::FieldTooLong {
                field: "to_person",
                max: MAX_PERSON_LEN,
            });
        }

        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::FieldTooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }

        if !self.amount.is_finite() {
            return Err(Error::NonFiniteAmount(self.amount));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tag_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::Tag;

    #[test]
    fn parses_canonical_tags() {
        assert_eq!(Tag::from_str("CREDIT"), Ok(Tag::Credit));
        assert_eq!(Tag::from_str("DEBIT"), Ok(Tag::Debit));
    }

    #[test]
    fn parses_mixed_case_and_whitespace() {
        assert_eq!(Tag::from_str("credit"), Ok(Tag::Credit));
        assert_eq!(Tag::from_str(" Debit "), Ok(Tag::Debit));
    }

    #[test]
    fn rejects_unknown_tag() {
        let result = Tag::from_str("TRANSFER");

        assert_eq!(result, Err(Error::InvalidTag("TRANSFER".to_string())));
    }

    #[test]
    fn round_trips_through_display() {
        for tag in [Tag::Credit, Tag::Debit] {
            assert_eq!(Tag::from_str(&tag.to_string()), Ok(tag));
        }
    }
}

#[cfg(test)]
mod entry_builder_tests {
    use time::macros::{date, time};

    use crate::Error;

    use super::{LedgerEntry, MAX_DESCRIPTION_LEN, MAX_PERSON_LEN, Tag};

    #[test]
    fn build_sets_required_fields() {
        let draft = LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit);

        assert_eq!(draft.from_person, "Rudran");
        assert_eq!(draft.to_person, "Parvathi");
        assert_eq!(draft.amount, 100.0);
        assert_eq!(draft.tag, Tag::Credit);
        assert_eq!(draft.description, "");
    }

    #[test]
    fn builder_methods_override_defaults() {
        let noted_date = date!(2026 - 01 - 15);
        let noted_time = time!(09:30:00);

        let draft = LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)
            .description("Loan repayment")
            .noted_on(noted_date)
            .noted_at(noted_time);

        assert_eq!(draft.description, "Loan repayment");
        assert_eq!(draft.noted_date, noted_date);
        assert_eq!(draft.noted_time, noted_time);
    }

    #[test]
    fn validate_accepts_boundary_lengths() {
        let draft = LedgerEntry::build(
            "x".repeat(MAX_PERSON_LEN),
            "y".repeat(MAX_PERSON_LEN),
            1.0,
            Tag::Debit,
        )
        .description("z".repeat(MAX_DESCRIPTION_LEN));

        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_overlong_sender() {
        let draft = LedgerEntry::build("x".repeat(MAX_PERSON_LEN + 1), "y", 1.0, Tag::Debit);

        assert_eq!(
            draft.validate(),
            Err(Error::FieldTooLong {
                field: "from_person",
                max: MAX_PERSON_LEN,
            })
        );
    }

    #[test]
    fn validate_rejects_overlong_description() {
        let draft = LedgerEntry::build("x", "y", 1.0, Tag::Debit)
            .description("z".repeat(MAX_DESCRIPTION_LEN + 1));

        assert_eq!(
            draft.validate(),
            Err(Error::FieldTooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            })
        );
    }

    #[test]
    fn validate_rejects_non_finite_amount() {
        let draft = LedgerEntry::build("x", "y", f64::NAN, Tag::Credit);

        assert!(matches!(draft.validate(), Err(Error::NonFiniteAmount(_))));
    }

    #[test]
    fn validate_accepts_negative_amount() {
        // The amount's sign is deliberately unconstrained.
        let draft = LedgerEntry::build("x", "y", -42.5, Tag::Debit);

        assert_eq!(draft.validate(), Ok(()));
    }
}
