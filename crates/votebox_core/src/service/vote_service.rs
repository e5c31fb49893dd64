//! Vote coordinator: ledger admission followed by tally increment.
//!
//! # Responsibility
//! - Normalize the voter identity.
//! - Admit the `(entry, identity)` pair into the ledger, then count it.
//! - Roll the admission back when the entry turns out not to exist.
//!
//! # Invariants
//! - A vote is counted at most once. Ledger admission always precedes the
//!   increment, so a failure between the two can only under-count.
//! - `DuplicateVote` comes from the ledger's atomic admission, never from a
//!   prior read, so concurrent callers need no in-process lock.
//! - Rollback runs only on `EntryNotFound` from the tally store. A storage
//!   failure or a dropped request after admission leaves the record in place
//!   for the repair pass.

use crate::model::entry::EntryId;
use crate::model::identity::{Identity, IdentityError};
use crate::model::vote::{RecordId, VoteReceipt};
use crate::repo::ledger_repo::VoteLedger;
use crate::repo::tally_repo::TallyStore;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VoteResult<T> = Result<T, VoteError>;

/// Reasons a vote is not counted.
#[derive(Debug)]
pub enum VoteError {
    /// Email missing or malformed.
    InvalidIdentity(IdentityError),
    /// Entry id missing or not an integer.
    InvalidEntryId,
    /// This identity already voted for the entry.
    DuplicateVote(EntryId),
    /// No entry with this id exists.
    EntryNotFound(EntryId),
    /// Unexpected persistence failure.
    Storage(RepoError),
}

impl Display for VoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentity(err) => write!(f, "{err}"),
            Self::InvalidEntryId => write!(f, "field `id` must be an integer"),
            Self::DuplicateVote(_) => write!(f, "this email has already voted for this project"),
            Self::EntryNotFound(entry_id) => write!(f, "project {entry_id} not found"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for VoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentity(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdentityError> for VoteError {
    fn from(value: IdentityError) -> Self {
        Self::InvalidIdentity(value)
    }
}

impl From<RepoError> for VoteError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateVote(entry_id) => Self::DuplicateVote(entry_id),
            RepoError::NotFound(entry_id) => Self::EntryNotFound(entry_id),
            other => Self::Storage(other),
        }
    }
}

/// Ledger record created by phase one, awaiting its tally increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an admission must be committed or rolled back"]
pub struct Admission {
    pub record_id: RecordId,
    pub entry_id: EntryId,
}

/// Coordinates ledger admission and tally increment for one vote at a time.
pub struct VoteCoordinator<L: VoteLedger, T: TallyStore> {
    ledger: L,
    tally: T,
}

impl<L: VoteLedger, T: TallyStore> VoteCoordinator<L, T> {
    pub fn new(ledger: L, tally: T) -> Self {
        Self { ledger, tally }
    }

    /// Casts one vote from raw input.
    ///
    /// # Errors
    /// - `InvalidIdentity` before any storage access.
    /// - `DuplicateVote` when the pair is already admitted; the tally is untouched.
    /// - `EntryNotFound` when the entry does not exist; the admission is rolled back.
    /// - `Storage` for any other persistence failure.
    pub fn cast_vote(&self, entry_id: EntryId, raw_identity: &str) -> VoteResult<VoteReceipt> {
        let identity = Identity::parse(raw_identity).inspect_err(|err| {
            debug!("event=vote_cast module=vote status=rejected entry_id={entry_id} reason={err}");
        })?;
        self.cast_vote_as(entry_id, &identity)
    }

    /// Casts one vote for an already normalized identity.
    pub fn cast_vote_as(&self, entry_id: EntryId, identity: &Identity) -> VoteResult<VoteReceipt> {
        let admission = self.admit(entry_id, identity)?;
        self.commit(admission)
    }

    /// Phase one: records the `(entry, identity)` pair in the ledger.
    pub fn admit(&self, entry_id: EntryId, identity: &Identity) -> VoteResult<Admission> {
        match self.ledger.admit(entry_id, identity) {
            Ok(record_id) => Ok(Admission {
                record_id,
                entry_id,
            }),
            Err(err) => {
                let err = VoteError::from(err);
                match &err {
                    VoteError::DuplicateVote(_) => info!(
                        "event=vote_cast module=vote status=rejected entry_id={entry_id} reason=duplicate"
                    ),
                    other => error!(
                        "event=vote_admit module=vote status=error entry_id={entry_id} error={other}"
                    ),
                }
                Err(err)
            }
        }
    }

    /// Phase two: counts an admitted vote.
    ///
    /// An `EntryNotFound` from the tally store triggers [`Self::rollback`].
    /// The caller sees `EntryNotFound` even when the rollback itself fails.
    pub fn commit(&self, admission: Admission) -> VoteResult<VoteReceipt> {
        match self.tally.increment(admission.entry_id) {
            Ok(new_vote_count) => {
                info!(
                    "event=vote_cast module=vote status=ok entry_id={} record_id={} votes={}",
                    admission.entry_id, admission.record_id, new_vote_count
                );
                Ok(VoteReceipt {
                    entry_id: admission.entry_id,
                    new_vote_count,
                })
            }
            Err(RepoError::NotFound(entry_id)) => {
                warn!(
                    "event=vote_cast module=vote status=rejected entry_id={entry_id} record_id={} reason=entry_not_found",
                    admission.record_id
                );
                if let Err(err) = self.rollback(&admission) {
                    error!(
                        "event=vote_rollback module=vote status=error entry_id={entry_id} record_id={} error_code=orphaned_record error={err}",
                        admission.record_id
                    );
                }
                Err(VoteError::EntryNotFound(entry_id))
            }
            Err(err) => {
                error!(
                    "event=vote_increment module=vote status=error entry_id={} record_id={} error_code=uncounted_record error={err}",
                    admission.entry_id, admission.record_id
                );
                Err(VoteError::Storage(err))
            }
        }
    }

    /// Compensation: removes the ledger record created by [`Self::admit`].
    ///
    /// Idempotent; rolling back an already removed record succeeds.
    pub fn rollback(&self, admission: &Admission) -> RepoResult<()> {
        self.ledger.revoke(admission.record_id)?;
        info!(
            "event=vote_rollback module=vote status=ok entry_id={} record_id={}",
            admission.entry_id, admission.record_id
        );
        Ok(())
    }
}
