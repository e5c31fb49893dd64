//! Repair pass closing the under-count window left by interrupted votes.
//!
//! # Responsibility
//! - Realign every tally with its ledger record count.
//! - Surface ledger records whose entry has disappeared.

use crate::repo::repair_repo::{RepairRepository, TallyAdjustment};
use crate::repo::RepoResult;
use log::{info, warn};

/// Outcome of one repair pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub entries_checked: u64,
    pub adjustments: Vec<TallyAdjustment>,
    pub orphaned_records: u64,
}

impl RepairReport {
    pub fn entries_adjusted(&self) -> usize {
        self.adjustments.len()
    }
}

/// Use-case service over a repair repository.
pub struct RepairService<R: RepairRepository> {
    repo: R,
}

impl<R: RepairRepository> RepairService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Rewrites drifted tallies to their ledger counts and reports orphans.
    pub fn reconcile(&mut self) -> RepoResult<RepairReport> {
        let (entries_checked, adjustments) = self.repo.reconcile_tallies()?;
        for adjustment in &adjustments {
            warn!(
                "event=tally_repair module=repair status=adjusted entry_id={} previous_votes={} ledger_votes={}",
                adjustment.entry_id, adjustment.previous_votes, adjustment.ledger_votes
            );
        }

        let orphaned_records = self.repo.count_orphaned_records()?;
        if orphaned_records > 0 {
            warn!(
                "event=tally_repair module=repair status=orphans orphaned_records={orphaned_records}"
            );
        }

        info!(
            "event=tally_repair module=repair status=ok entries_checked={} entries_adjusted={}",
            entries_checked,
            adjustments.len()
        );
        Ok(RepairReport {
            entries_checked,
            adjustments,
            orphaned_records,
        })
    }
}
