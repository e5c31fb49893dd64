//! In-memory ledger and tally stores with switchable failures.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use votebox_core::{
    EntryId, Identity, RecordId, RepoError, RepoResult, TallyStore, VoteLedger, VoteRecord,
};

#[derive(Default)]
pub struct FakeLedger {
    pub records: RefCell<BTreeMap<RecordId, (EntryId, Identity)>>,
    pub next_id: Cell<RecordId>,
    pub fail_revoke: bool,
    pub fail_clear_all: bool,
    pub revoke_calls: Cell<usize>,
}

impl FakeLedger {
    pub fn find_record(
        &self,
        entry_id: EntryId,
        identity: &Identity,
    ) -> RepoResult<Option<VoteRecord>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .find(|(_, (e, i))| *e == entry_id && i == identity)
            .map(|(id, (entry_id, identity))| VoteRecord {
                id: *id,
                entry_id: *entry_id,
                identity: identity.clone(),
            }))
    }

    pub fn count_records(&self, entry_id: EntryId) -> RepoResult<u64> {
        Ok(self
            .records
            .borrow()
            .values()
            .filter(|(e, _)| *e == entry_id)
            .count() as u64)
    }
}

impl VoteLedger for FakeLedger {
    fn admit(&self, entry_id: EntryId, identity: &Identity) -> RepoResult<RecordId> {
        let mut records = self.records.borrow_mut();
        if records
            .values()
            .any(|(e, i)| *e == entry_id && i == identity)
        {
            return Err(RepoError::DuplicateVote(entry_id));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        records.insert(id, (entry_id, identity.clone()));
        Ok(id)
    }

    fn revoke(&self, record_id: RecordId) -> RepoResult<()> {
        self.revoke_calls.set(self.revoke_calls.get() + 1);
        if self.fail_revoke {
            return Err(RepoError::InvalidData("ledger offline".to_string()));
        }
        self.records.borrow_mut().remove(&record_id);
        Ok(())
    }

    fn clear_all(&self) -> RepoResult<u64> {
        if self.fail_clear_all {
            return Err(RepoError::InvalidData("ledger offline".to_string()));
        }
        let mut records = self.records.borrow_mut();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

#[derive(Default)]
pub struct FakeTally {
    pub counts: RefCell<BTreeMap<EntryId, u64>>,
    pub fail_increment: bool,
    pub fail_reset_all: bool,
}

impl FakeTally {
    pub fn with_entries(ids: &[EntryId]) -> Self {
        Self {
            counts: RefCell::new(ids.iter().map(|id| (*id, 0)).collect()),
            ..Self::default()
        }
    }

    pub fn current(&self, entry_id: EntryId) -> RepoResult<u64> {
        self.counts
            .borrow()
            .get(&entry_id)
            .copied()
            .ok_or(RepoError::NotFound(entry_id))
    }
}

impl TallyStore for FakeTally {
    fn increment(&self, entry_id: EntryId) -> RepoResult<u64> {
        if self.fail_increment {
            return Err(RepoError::InvalidData("tally offline".to_string()));
        }
        let mut counts = self.counts.borrow_mut();
        let count = counts.get_mut(&entry_id).ok_or(RepoError::NotFound(entry_id))?;
        *count += 1;
        Ok(*count)
    }

    fn reset_all(&self) -> RepoResult<u64> {
        if self.fail_reset_all {
            return Err(RepoError::InvalidData("tally offline".to_string()));
        }
        let mut counts = self.counts.borrow_mut();
        counts.values_mut().for_each(|count| *count = 0);
        Ok(counts.len() as u64)
    }
}
