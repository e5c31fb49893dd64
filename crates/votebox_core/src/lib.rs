//! Core domain logic for votebox.
//!
//! One vote per (entry, email) pair, a per-entry running tally, and an
//! authorized reset. Exclusivity comes from SQLite (a unique index on the
//! ledger and single-statement increments), never from in-process locks, so
//! any number of connections or processes may vote concurrently.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{CatalogSeed, Entry, EntryId, EntrySeed, SeedError};
pub use model::identity::{Identity, IdentityError};
pub use model::vote::{RecordId, VoteReceipt, VoteRecord};
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::ledger_repo::{SqliteVoteLedger, VoteLedger};
pub use repo::repair_repo::{RepairRepository, SqliteRepairRepository, TallyAdjustment};
pub use repo::tally_repo::{SqliteTallyStore, TallyStore};
pub use repo::{RepoError, RepoResult};
pub use service::repair_service::{RepairReport, RepairService};
pub use service::reset_service::{AdminSecret, ResetController, ResetError, ResetReport};
pub use service::vote_service::{Admission, VoteCoordinator, VoteError, VoteResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
