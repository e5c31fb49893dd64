//! Shared request state and the blocking use-case calls behind each route.
//!
//! Holds only immutable configuration. Every call opens its own connection,
//! so exclusivity stays with SQLite and nothing is cached between requests.
//! The file must already be bootstrapped by [`crate::bootstrap_storage`].

use crate::error::ApiError;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use votebox_core::db::connect_db;
use votebox_core::repo::catalog_repo::get_entry;
use votebox_core::{
    AdminSecret, CatalogRepository, Entry, EntryId, Identity, ResetController, ResetReport,
    SqliteCatalogRepository, SqliteTallyStore, SqliteVoteLedger, VoteCoordinator, VoteReceipt,
};

pub struct AppState {
    db_path: PathBuf,
    admin_secret: AdminSecret,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, admin_secret: AdminSecret) -> Arc<Self> {
        Arc::new(Self {
            db_path: db_path.into(),
            admin_secret,
        })
    }

    fn open(&self) -> Result<Connection, ApiError> {
        Ok(connect_db(&self.db_path)?)
    }

    pub fn list_entries(&self) -> Result<Vec<Entry>, ApiError> {
        let mut conn = self.open()?;
        Ok(SqliteCatalogRepository::new(&mut conn).list_entries()?)
    }

    /// Casts an already normalized vote and reads the entry for the response.
    ///
    /// The returned entry carries the tally this vote produced, not whatever a
    /// later request may have pushed it to. It is `None` only if the entry was
    /// removed after being counted.
    pub fn cast_vote(
        &self,
        entry_id: EntryId,
        identity: &Identity,
    ) -> Result<(VoteReceipt, Option<Entry>), ApiError> {
        let conn = self.open()?;
        let receipt =
            VoteCoordinator::new(SqliteVoteLedger::new(&conn), SqliteTallyStore::new(&conn))
                .cast_vote_as(entry_id, identity)?;
        let entry = get_entry(&conn, receipt.entry_id)?.map(|mut entry| {
            entry.votes = receipt.new_vote_count;
            entry
        });
        Ok((receipt, entry))
    }

    pub fn reset(&self, supplied_secret: &str) -> Result<ResetReport, ApiError> {
        let conn = self.open()?;
        let report = ResetController::new(
            SqliteVoteLedger::new(&conn),
            SqliteTallyStore::new(&conn),
            self.admin_secret.clone(),
        )
        .reset(supplied_secret)?;
        Ok(report)
    }
}
