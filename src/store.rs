//! The SQLite-backed record store for ledger entries.
//!
//! This module owns the table schema, the mapping between rows and
//! [LedgerEntry] values, and all SQL. Mutating operations are fail-soft:
//! storage errors are logged and reported through the return value rather
//! than propagated, so callers can treat the store as
//! inspect-the-result-and-move-on.

use std::{
    fs,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, ToSql, params_from_iter};

use crate::{
    DatabaseID, Error, LedgerEntry, LedgerEntryBuilder, StoreConfig, Tag,
    entry::{MAX_DESCRIPTION_LEN, MAX_PERSON_LEN},
    filter::{DeleteMode, EntryFilter, EntryUpdate, FetchMode},
};

const ENTRY_COLUMNS: &str =
    "id, noted_date, noted_time, from_person, to_person, description, amount, tag";

/// The result of [LedgerStore::update].
///
/// Update is a no-op on anything other than exactly one match; the outcome
/// says which case occurred without raising an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Exactly one entry matched and was rewritten.
    Updated,
    /// No entry matched the filter, or no assignments were given. Nothing
    /// was changed.
    NoMatch,
    /// More than one entry matched the filter. Nothing was changed.
    Ambiguous,
    /// The assignments were invalid or the write failed. Nothing was
    /// changed; the cause was logged.
    Failed,
}

impl UpdateOutcome {
    /// True when an entry was actually rewritten.
    pub fn updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

/// Stores ledger entries in a SQLite database.
///
/// The connection sits behind a single coarse lock, so each operation is
/// atomic with respect to the others. That is the extent of the concurrency
/// support: the store is built for one client issuing operations
/// sequentially, not for multi-user access.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl LedgerStore {
    /// Open (creating if necessary) the ledger database described by
    /// `config` and ensure the schema exists.
    ///
    /// # Errors
    /// Returns an [Error::StorageUnavailable] if the database directory or
    /// file cannot be created or opened.
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        fs::create_dir_all(config.database_dir()).map_err(|error| {
            Error::StorageUnavailable(format!(
                "could not create directory {}: {error}",
                config.database_dir().display()
            ))
        })?;

        let path = config.database_path();
        let connection = Connection::open(&path).map_err(|error| {
            Error::StorageUnavailable(format!("could not open {}: {error}", path.display()))
        })?;

        let store = Self::from_connection(connection);
        store.ensure_schema()?;

        tracing::debug!("opened ledger database at {}", path.display());
        Ok(store)
    }

    /// Create a store over an in-memory database. Useful for tests and
    /// throwaway sessions; the data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an [Error::StorageUnavailable] if the in-memory database
    /// cannot be created.
    pub fn in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory().map_err(|error| {
            Error::StorageUnavailable(format!("could not open in-memory database: {error}"))
        })?;

        let store = Self::from_connection(connection);
        store.ensure_schema()?;

        Ok(store)
    }

    /// Wrap an existing SQLite connection. The caller is responsible for
    /// calling [LedgerStore::ensure_schema] before use.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Create the ledger table and its index if they do not exist.
    ///
    /// Idempotent and safe to call on every startup; existing rows are left
    /// untouched.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the schema statements fail.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn ensure_schema(&self) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        create_ledger_table(&connection)?;
        Ok(())
    }

    /// Append a single new entry, assigning it a fresh unique ID.
    ///
    /// Returns false if the draft fails validation or the write fails; the
    /// cause is logged.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn insert(&self, draft: LedgerEntryBuilder) -> bool {
        self.insert_many(vec![draft])
    }

    /// Append a batch of new entries, each assigned a fresh unique ID.
    ///
    /// The batch commits inside one SQL transaction: either all rows commit
    /// or none do. Returns false if any draft fails validation or any write
    /// fails; the cause is logged.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn insert_many(&self, drafts: Vec<LedgerEntryBuilder>) -> bool {
        let connection = self.connection.lock().unwrap();

        match insert_all(&drafts, &connection) {
            Ok(ids) => {
                tracing::debug!("inserted {} ledger entries", ids.len());
                true
            }
            Err(error) => {
                tracing::error!("failed to insert ledger entries: {error}");
                false
            }
        }
    }

    /// Retrieve the entries matching `filter`, in insertion order.
    ///
    /// Every populated filter field must match (logical AND); the empty
    /// filter matches every stored entry. `fetch` controls how many matches
    /// are returned; [FetchMode::One] tolerates zero-or-multiple matches by
    /// returning an empty vector.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the query fails.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn query(&self, filter: &EntryFilter, fetch: FetchMode) -> Result<Vec<LedgerEntry>, Error> {
        let connection = self.connection.lock().unwrap();

        match fetch {
            FetchMode::All => select_entries(filter, None, &connection),
            FetchMode::Many(limit) => select_entries(filter, Some(limit), &connection),
            FetchMode::One => {
                let matches = select_entries(filter, Some(2), &connection)?;

                if matches.len() == 1 {
                    Ok(matches)
                } else {
                    tracing::debug!(
                        "fetch-one query matched {} entries, returning none",
                        matches.len()
                    );
                    Ok(Vec::new())
                }
            }
        }
    }

    /// Retrieve the single entry matching `filter`.
    ///
    /// Unlike [LedgerStore::query] with [FetchMode::One], this surfaces the
    /// zero-match and multiple-match cases as distinct errors.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if nothing matched, an
    /// [Error::AmbiguousMatch] if more than one entry matched, or an
    /// [Error::SqlError] if the query fails.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn find_one(&self, filter: &EntryFilter) -> Result<LedgerEntry, Error> {
        let connection = self.connection.lock().unwrap();

        find_one_entry(filter, &connection)
    }

    /// Locate exactly one entry via `filter` and apply the assignments in
    /// `changes` to it.
    ///
    /// Never raises: zero matches are a silent no-op reported as
    /// [UpdateOutcome::NoMatch], multiple matches as
    /// [UpdateOutcome::Ambiguous], and invalid assignments or storage
    /// failures as [UpdateOutcome::Failed]. The store lock is held across
    /// the locate and write steps, so no other operation can interleave.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn update(&self, filter: &EntryFilter, changes: &EntryUpdate) -> UpdateOutcome {
        if changes.is_empty() {
            tracing::debug!("update called with no assignments");
            return UpdateOutcome::NoMatch;
        }

        if let Err(error) = validate_update(changes) {
            tracing::warn!("rejected invalid update assignments: {error}");
            return UpdateOutcome::Failed;
        }

        let connection = self.connection.lock().unwrap();

        let target = match find_one_entry(filter, &connection) {
            Ok(entry) => entry,
            Err(Error::NotFound) => {
                tracing::debug!("update filter matched no entries, nothing to do");
                return UpdateOutcome::NoMatch;
            }
            Err(Error::AmbiguousMatch) => {
                tracing::debug!("update filter matched multiple entries, nothing changed");
                return UpdateOutcome::Ambiguous;
            }
            Err(error) => {
                tracing::error!("failed to look up entry for update: {error}");
                return UpdateOutcome::Failed;
            }
        };

        match apply_update(target.id, changes, &connection) {
            Ok(()) => UpdateOutcome::Updated,
            Err(error) => {
                tracing::error!("failed to update entry {}: {error}", target.id);
                UpdateOutcome::Failed
            }
        }
    }

    /// Delete the entries matching `filter`.
    ///
    /// [DeleteMode::One] removes only the first match in insertion order;
    /// [DeleteMode::All] removes every match. Returns false when nothing
    /// matched or the delete failed; failures are logged.
    ///
    /// # Panics
    /// Panics if the lock for the database connection is already held by the
    /// same thread.
    pub fn delete(&self, filter: &EntryFilter, mode: DeleteMode) -> bool {
        let connection = self.connection.lock().unwrap();

        let result = match mode {
            DeleteMode::One => delete_first_entry(filter, &connection),
            DeleteMode::All => delete_entries(filter, &connection),
        };

        match result {
            Ok(0) => {
                tracing::debug!("delete filter matched no entries");
                false
            }
            Ok(count) => {
                tracing::debug!("deleted {count} ledger entries");
                true
            }
            Err(error) => {
                tracing::error!("failed to delete ledger entries: {error}");
                false
            }
        }
    }
}

/// Create the ledger table, its tag index, and the ID sequence.
///
/// `AUTOINCREMENT` keeps deleted IDs from ever being reassigned.
fn create_ledger_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ledger (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                noted_date TEXT NOT NULL,
                noted_time TEXT NOT NULL,
                from_person TEXT NOT NULL,
                to_person TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                tag TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS ledger_tag_index ON ledger (tag)",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('ledger', 0)",
        (),
    )?;

    Ok(())
}

/// Validate every draft, then insert the whole batch inside one SQL
/// transaction so it commits or fails as a unit.
fn insert_all(
    drafts: &[LedgerEntryBuilder],
    connection: &Connection,
) -> Result<Vec<DatabaseID>, Error> {
    for draft in drafts {
        draft.validate()?;
    }

    let tx = connection.unchecked_transaction()?;
    let mut ids = Vec::with_capacity(drafts.len());

    {
        let mut statement = tx.prepare(
            "INSERT INTO ledger (noted_date, noted_time, from_person, to_person, description, amount, tag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?;

        for draft in drafts {
            let id: DatabaseID = statement.query_row(
                (
                    draft.noted_date,
                    draft.noted_time,
                    &draft.from_person,
                    &draft.to_person,
                    &draft.description,
                    draft.amount,
                    draft.tag.as_str(),
                ),
                |row| row.get(0),
            )?;
            ids.push(id);
        }
    }

    tx.commit()?;
    Ok(ids)
}

/// Assemble the conjunctive WHERE clause and its parameters for `filter`.
fn filter_parts(filter: &EntryFilter) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
    let mut clauses = Vec::new();
    let mut parameters: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(id) = filter.id {
        parameters.push(Box::new(id));
        clauses.push(format!("id = ?{}", parameters.len()));
    }

    if let Some(noted_date) = filter.noted_date {
        parameters.push(Box::new(noted_date));
        clauses.push(format!("noted_date = ?{}", parameters.len()));
    }

    if let Some(noted_time) = filter.noted_time {
        parameters.push(Box::new(noted_time));
        clauses.push(format!("noted_time = ?{}", parameters.len()));
    }

    if let Some(ref from_person) = filter.from_person {
        parameters.push(Box::new(from_person.clone()));
        clauses.push(format!("from_person = ?{}", parameters.len()));
    }

    if let Some(ref to_person) = filter.to_person {
        parameters.push(Box::new(to_person.clone()));
        clauses.push(format!("to_person = ?{}", parameters.len()));
    }

    if let Some(ref description) = filter.description {
        parameters.push(Box::new(description.clone()));
        clauses.push(format!("description = ?{}", parameters.len()));
    }

    if let Some(amount) = filter.amount {
        parameters.push(Box::new(amount));
        clauses.push(format!("amount = ?{}", parameters.len()));
    }

    if let Some(tag) = filter.tag {
        parameters.push(Box::new(tag.as_str()));
        clauses.push(format!("tag = ?{}", parameters.len()));
    }

    (clauses, parameters)
}

/// Query for entries matching `filter`, in insertion order.
fn select_entries(
    filter: &EntryFilter,
    limit: Option<u64>,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    let (where_clause_parts, query_parameters) = filter_parts(filter);

    let mut query_string_parts = vec![format!("SELECT {ENTRY_COLUMNS} FROM ledger")];

    if !where_clause_parts.is_empty() {
        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
    }

    query_string_parts.push("ORDER BY id ASC".to_string());

    if let Some(limit) = limit {
        query_string_parts.push(format!("LIMIT {limit}"));
    }

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter().map(|parameter| parameter.as_ref()));

    connection
        .prepare(&query_string)?
        .query_map(params, map_entry_row)?
        .map(|entry_result| entry_result.map_err(Error::from))
        .collect()
}

/// Look up the single entry matching `filter`, distinguishing the zero and
/// multiple match cases.
fn find_one_entry(filter: &EntryFilter, connection: &Connection) -> Result<LedgerEntry, Error> {
    let mut matches = select_entries(filter, Some(2), connection)?;

    match matches.len() {
        0 => Err(Error::NotFound),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousMatch),
    }
}

/// Check update assignments against the same constraints the entry builder
/// enforces.
fn validate_update(changes: &EntryUpdate) -> Result<(), Error> {
    if let Some(ref from_person) = changes.from_person
        && from_person.chars().count() > MAX_PERSON_LEN
    {
        return Err(Error::FieldTooLong {
            field: "from_person",
            max: MAX_PERSON_LEN,
        });
    }

    if let Some(ref to_person) = changes.to_person
        && to_person.chars().count() > MAX_PERSON_LEN
    {
        return Err(Error::FieldTooLong {
            field: "to_person",
            max: MAX_PERSON_LEN,
        });
    }

    if let Some(ref description) = changes.description
        && description.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err(Error::FieldTooLong {
            field: "description",
            max: MAX_DESCRIPTION_LEN,
        });
    }

    if let Some(amount) = changes.amount
        && !amount.is_finite()
    {
        return Err(Error::NonFiniteAmount(amount));
    }

    Ok(())
}

/// Write the populated assignments to the entry with `id`.
fn apply_update(
    id: DatabaseID,
    changes: &EntryUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let mut assignments = Vec::new();
    let mut parameters: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(noted_date) = changes.noted_date {
        parameters.push(Box::new(noted_date));
        assignments.push(format!("noted_date = ?{}", parameters.len()));
    }

    if let Some(noted_time) = changes.noted_time {
        parameters.push(Box::new(noted_time));
        assignments.push(format!("noted_time = ?{}", parameters.len()));
    }

    if let Some(ref from_person) = changes.from_person {
        parameters.push(Box::new(from_person.clone()));
        assignments.push(format!("from_person = ?{}", parameters.len()));
    }

    if let Some(ref to_person) = changes.to_person {
        parameters.push(Box::new(to_person.clone()));
        assignments.push(format!("to_person = ?{}", parameters.len()));
    }

    if let Some(ref description) = changes.description {
        parameters.push(Box::new(description.clone()));
        assignments.push(format!("description = ?{}", parameters.len()));
    }

    if let Some(amount) = changes.amount {
        parameters.push(Box::new(amount));
        assignments.push(format!("amount = ?{}", parameters.len()));
    }

    if let Some(tag) = changes.tag {
        parameters.push(Box::new(tag.as_str()));
        assignments.push(format!("tag = ?{}", parameters.len()));
    }

    parameters.push(Box::new(id));
    let query_string = format!(
        "UPDATE ledger SET {} WHERE id = ?{}",
        assignments.join(", "),
        parameters.len()
    );
    let params = params_from_iter(parameters.iter().map(|parameter| parameter.as_ref()));

    connection.execute(&query_string, params)?;
    Ok(())
}

/// Delete the first entry matching `filter` in insertion order. Returns the
/// number of rows removed.
fn delete_first_entry(filter: &EntryFilter, connection: &Connection) -> Result<usize, Error> {
    let (where_clause_parts, query_parameters) = filter_parts(filter);

    let mut subquery = String::from("SELECT id FROM ledger");
    if !where_clause_parts.is_empty() {
        subquery.push_str(" WHERE ");
        subquery.push_str(&where_clause_parts.join(" AND "));
    }
    subquery.push_str(" ORDER BY id ASC LIMIT 1");

    let query_string = format!("DELETE FROM ledger WHERE id IN ({subquery})");
    let params = params_from_iter(query_parameters.iter().map(|parameter| parameter.as_ref()));

    let deleted = connection.execute(&query_string, params)?;
    Ok(deleted)
}

/// Delete every entry matching `filter`. Returns the number of rows removed.
fn delete_entries(filter: &EntryFilter, connection: &Connection) -> Result<usize, Error> {
    let (where_clause_parts, query_parameters) = filter_parts(filter);

    let mut query_string = String::from("DELETE FROM ledger");
    if !where_clause_parts.is_empty() {
        query_string.push_str(" WHERE ");
        query_string.push_str(&where_clause_parts.join(" AND "));
    }

    let params = params_from_iter(query_parameters.iter().map(|parameter| parameter.as_ref()));

    let deleted = connection.execute(&query_string, params)?;
    Ok(deleted)
}

/// Map a database row to a [LedgerEntry].
fn map_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let tag_text: String = row.get(7)?;
    let tag = tag_text.parse::<Tag>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(LedgerEntry {
        id: row.get(0)?,
        noted_date: row.get(1)?,
        noted_time: row.get(2)?,
        from_person: row.get(3)?,
        to_person: row.get(4)?,
        description: row.get(5)?,
        amount: row.get(6)?,
        tag,
    })
}
