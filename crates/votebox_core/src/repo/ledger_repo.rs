//! Vote ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Record admitted `(entry, identity)` pairs.
//! - Make admission itself the "has this identity voted" check.
//!
//! # Invariants
//! - At most one record per `(entry_id, identity)`, enforced by the
//!   `vote_records` unique index, so it holds across connections and
//!   processes.
//! - `admit` on an existing pair mutates nothing and returns `DuplicateVote`.
//! - Records are never updated; they are removed only by `revoke` or
//!   `clear_all`.

use crate::model::entry::EntryId;
use crate::model::identity::Identity;
use crate::model::vote::{RecordId, VoteRecord};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension};

/// Append-only store of admitted votes.
pub trait VoteLedger {
    /// Inserts a record; the insert and the uniqueness check are one step.
    fn admit(&self, entry_id: EntryId, identity: &Identity) -> RepoResult<RecordId>;
    /// Deletes exactly one record. Deleting an absent record is not an error.
    fn revoke(&self, record_id: RecordId) -> RepoResult<()>;
    /// Deletes every record and returns how many were removed.
    fn clear_all(&self) -> RepoResult<u64>;
}

impl<L: VoteLedger + ?Sized> VoteLedger for &L {
    fn admit(&self, entry_id: EntryId, identity: &Identity) -> RepoResult<RecordId> {
        (**self).admit(entry_id, identity)
    }

    fn revoke(&self, record_id: RecordId) -> RepoResult<()> {
        (**self).revoke(record_id)
    }

    fn clear_all(&self) -> RepoResult<u64> {
        (**self).clear_all()
    }
}

/// SQLite-backed vote ledger.
pub struct SqliteVoteLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVoteLedger<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Looks up the record for one pair, if admitted.
    pub fn find_record(
        &self,
        entry_id: EntryId,
        identity: &Identity,
    ) -> RepoResult<Option<VoteRecord>> {
        let id = self
            .conn
            .query_row(
                "SELECT id
                 FROM vote_records
                 WHERE entry_id = ?1
                   AND identity = ?2;",
                params![entry_id, identity.as_str()],
                |row| row.get::<_, RecordId>(0),
            )
            .optional()?;

        Ok(id.map(|id| VoteRecord {
            id,
            entry_id,
            identity: identity.clone(),
        }))
    }

    /// Counts admitted records for one entry.
    pub fn count_records(&self, entry_id: EntryId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM vote_records WHERE entry_id = ?1;",
            [entry_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl VoteLedger for SqliteVoteLedger<'_> {
    fn admit(&self, entry_id: EntryId, identity: &Identity) -> RepoResult<RecordId> {
        self.conn
            .query_row(
                "INSERT INTO vote_records (entry_id, identity)
                 VALUES (?1, ?2)
                 RETURNING id;",
                params![entry_id, identity.as_str()],
                |row| row.get::<_, RecordId>(0),
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::DuplicateVote(entry_id)
                } else {
                    err.into()
                }
            })
    }

    fn revoke(&self, record_id: RecordId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM vote_records WHERE id = ?1;", [record_id])?;
        Ok(())
    }

    fn clear_all(&self) -> RepoResult<u64> {
        let removed = self.conn.execute("DELETE FROM vote_records;", [])?;
        Ok(removed as u64)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(ffi::Error { code: ErrorCode::ConstraintViolation, extended_code }, _)
            if *extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || *extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
