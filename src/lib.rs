//! Pocket Ledger is a personal transaction ledger: it records money
//! movements between named parties, tags each one as CREDIT or DEBIT,
//! persists them in a SQLite file, and produces aggregate summaries.
//!
//! This library provides the record store and the summary engine.
//! Presentation layers (the bundled CLI, or a GUI) consume it through
//! [LedgerStore] and [summarize].

#![warn(missing_docs)]

mod config;
mod entry;
mod filter;
mod store;
mod summary;

pub use config::StoreConfig;
pub use entry::{
    DatabaseID, LedgerEntry, LedgerEntryBuilder, MAX_DESCRIPTION_LEN, MAX_PERSON_LEN, Tag,
};
pub use filter::{DeleteMode, EntryFilter, EntryUpdate, FetchMode};
pub use store::{LedgerStore, UpdateOutcome};
pub use summary::{SummaryReport, summarize};

/// The errors that may occur in the library.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The database file or its parent directory could not be created or
    /// opened. Fatal to the operation in progress, but reported rather than
    /// panicking.
    #[error("could not create or open the ledger database: {0}")]
    StorageUnavailable(String),

    /// A filter matched zero entries where exactly one was expected.
    #[error("no ledger entry matched the given filter")]
    NotFound,

    /// A filter matched more than one entry where exactly one was expected.
    ///
    /// Kept separate from [Error::NotFound] so callers and tests can tell
    /// the two apart.
    #[error("the filter matched more than one entry where exactly one was expected")]
    AmbiguousMatch,

    /// A string that is not `CREDIT` or `DEBIT` was used as a transaction
    /// tag.
    #[error("\"{0}\" is not a valid transaction tag, expected CREDIT or DEBIT")]
    InvalidTag(String),

    /// A string field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// The name of the offending field.
        field: &'static str,
        /// The maximum number of characters the field accepts.
        max: usize,
    },

    /// A NaN or infinite amount was used to create or update an entry.
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
