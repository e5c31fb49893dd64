//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage contracts the vote coordinator and reset controller
//!   are written against (`VoteLedger`, `TallyStore`).
//! - Keep SQL details out of service orchestration.
//!
//! # Invariants
//! - Every write is a single atomic statement or runs inside one transaction.
//! - Storage-level conditions with business meaning (unique violation, zero
//!   rows updated) surface as semantic variants, never as raw SQLite codes.

use crate::db::DbError;
use crate::model::entry::EntryId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog_repo;
pub mod ledger_repo;
pub mod repair_repo;
pub mod tally_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by ledger, tally and catalog storage.
#[derive(Debug)]
pub enum RepoError {
    /// The `(entry, identity)` pair is already admitted.
    DuplicateVote(EntryId),
    /// No catalog entry carries this id.
    NotFound(EntryId),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateVote(entry_id) => {
                write!(f, "identity already voted for entry {entry_id}")
            }
            Self::NotFound(entry_id) => write!(f, "entry not found: {entry_id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Converts a stored vote count into the model's unsigned form.
pub(crate) fn votes_from_db(entry_id: EntryId, value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "negative vote count `{value}` in entries.votes for entry {entry_id}"
        ))
    })
}
