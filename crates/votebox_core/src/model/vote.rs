//! Admitted vote shapes.

use crate::model::entry::EntryId;
use crate::model::identity::Identity;
use serde::Serialize;

/// Storage-assigned id of one ledger record.
pub type RecordId = i64;

/// One admitted `(entry, identity)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub id: RecordId,
    pub entry_id: EntryId,
    pub identity: Identity,
}

/// Outcome of a fully counted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub entry_id: EntryId,
    pub new_vote_count: u64,
}
