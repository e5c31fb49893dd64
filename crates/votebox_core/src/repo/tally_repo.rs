//! Tally store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the per-entry vote counters in `entries.votes`.
//!
//! # Invariants
//! - Counters change only through `increment` (+1) and `reset_all` (= 0).
//! - `increment` on an unknown entry mutates nothing; counters are never
//!   created implicitly.

use crate::model::entry::EntryId;
use crate::repo::{votes_from_db, RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension};

/// Per-entry atomic counters.
pub trait TallyStore {
    /// Adds exactly one to the entry's counter and returns the new value.
    fn increment(&self, entry_id: EntryId) -> RepoResult<u64>;
    /// Sets every counter to zero; returns how many entries were touched.
    fn reset_all(&self) -> RepoResult<u64>;
}

impl<T: TallyStore + ?Sized> TallyStore for &T {
    fn increment(&self, entry_id: EntryId) -> RepoResult<u64> {
        (**self).increment(entry_id)
    }

    fn reset_all(&self) -> RepoResult<u64> {
        (**self).reset_all()
    }
}

/// SQLite-backed tally store.
pub struct SqliteTallyStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTallyStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads one counter without modifying it.
    pub fn current(&self, entry_id: EntryId) -> RepoResult<u64> {
        let votes = self
            .conn
            .query_row(
                "SELECT votes FROM entries WHERE id = ?1;",
                [entry_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound(entry_id))?;

        votes_from_db(entry_id, votes)
    }
}

impl TallyStore for SqliteTallyStore<'_> {
    fn increment(&self, entry_id: EntryId) -> RepoResult<u64> {
        // Single UPDATE ... RETURNING: read-modify-write happens inside SQLite.
        let votes = self
            .conn
            .query_row(
                "UPDATE entries
                 SET votes = votes + 1
                 WHERE id = ?1
                 RETURNING votes;",
                [entry_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound(entry_id))?;

        votes_from_db(entry_id, votes)
    }

    fn reset_all(&self) -> RepoResult<u64> {
        let changed = self.conn.execute("UPDATE entries SET votes = 0;", [])?;
        Ok(changed as u64)
    }
}
