//! Repair queries that realign tallies with the ledger.
//!
//! # Responsibility
//! - Find and fix entries whose counter differs from their ledger record count.
//! - Report ledger records whose entry no longer exists.
//!
//! # Invariants
//! - Reconciliation runs in one IMMEDIATE transaction, so no vote lands
//!   between the count and the write.
//! - Ledger records are only read here, never modified.

use crate::model::entry::EntryId;
use crate::repo::{votes_from_db, RepoResult};
use rusqlite::{params, Connection, TransactionBehavior};

/// One counter changed by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyAdjustment {
    pub entry_id: EntryId,
    pub previous_votes: u64,
    pub ledger_votes: u64,
}

/// Repository interface for ledger/tally reconciliation.
pub trait RepairRepository {
    /// Rewrites every drifted counter to its ledger count.
    ///
    /// Returns the total number of entries inspected and the adjustments made.
    fn reconcile_tallies(&mut self) -> RepoResult<(u64, Vec<TallyAdjustment>)>;
    /// Counts ledger records pointing at entries that no longer exist.
    fn count_orphaned_records(&self) -> RepoResult<u64>;
}

/// SQLite-backed repair repository.
pub struct SqliteRepairRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRepairRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RepairRepository for SqliteRepairRepository<'_> {
    fn reconcile_tallies(&mut self) -> RepoResult<(u64, Vec<TallyAdjustment>)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let checked: i64 = tx.query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))?;

        let drifted = {
            let mut stmt = tx.prepare(
                "SELECT e.id, e.votes, COUNT(r.id) AS ledger_votes
                 FROM entries e
                 LEFT JOIN vote_records r ON r.entry_id = e.id
                 GROUP BY e.id, e.votes
                 HAVING e.votes <> COUNT(r.id)
                 ORDER BY e.id ASC;",
            )?;
            let mut rows = stmt.query([])?;
            let mut drifted = Vec::new();
            while let Some(row) = rows.next()? {
                let entry_id: EntryId = row.get("id")?;
                drifted.push(TallyAdjustment {
                    entry_id,
                    previous_votes: votes_from_db(entry_id, row.get("votes")?)?,
                    ledger_votes: votes_from_db(entry_id, row.get("ledger_votes")?)?,
                });
            }
            drifted
        };

        for adjustment in &drifted {
            tx.execute(
                "UPDATE entries SET votes = ?2 WHERE id = ?1;",
                params![adjustment.entry_id, adjustment.ledger_votes as i64],
            )?;
        }

        tx.commit()?;
        Ok((checked as u64, drifted))
    }

    fn count_orphaned_records(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM vote_records r
             WHERE NOT EXISTS (SELECT 1 FROM entries e WHERE e.id = r.entry_id);",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
