//! Catalog repository: the entry list the votes are cast against.
//!
//! # Responsibility
//! - Serve the ordered entry list and single-entry reads.
//! - Seed entry metadata from a catalog file.
//!
//! # Invariants
//! - Seeding never rewrites the `votes` of an existing entry.
//! - List order is catalog position, then id.

use crate::model::entry::{Entry, EntryId, EntrySeed};
use crate::repo::{votes_from_db, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    image,
    votes
FROM entries";

/// Repository interface for catalog reads and seeding.
pub trait CatalogRepository {
    /// Lists every entry ordered by catalog position, then id.
    fn list_entries(&self) -> RepoResult<Vec<Entry>>;
    /// Gets one entry by id.
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    /// Upserts entry metadata in one transaction; returns the number of new entries.
    fn seed_entries(&mut self, seeds: &[EntrySeed]) -> RepoResult<usize>;
    /// Removes one entry from the catalog.
    fn remove_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY position ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        get_entry(&*self.conn, id)
    }

    fn seed_entries(&mut self, seeds: &[EntrySeed]) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut inserted = 0;

        for (position, seed) in seeds.iter().enumerate() {
            let initial_votes = match seed.votes {
                Some(votes) => i64::try_from(votes).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "seed vote count {votes} for entry {} is out of range",
                        seed.id
                    ))
                })?,
                None => 0,
            };

            let changed = tx.execute(
                "INSERT INTO entries (id, name, description, image, votes, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (id) DO NOTHING;",
                params![
                    seed.id,
                    seed.name.as_str(),
                    seed.description.as_str(),
                    seed.image.as_deref(),
                    initial_votes,
                    position as i64,
                ],
            )?;

            if changed == 0 {
                tx.execute(
                    "UPDATE entries
                     SET name = ?2, description = ?3, image = ?4, position = ?5
                     WHERE id = ?1;",
                    params![
                        seed.id,
                        seed.name.as_str(),
                        seed.description.as_str(),
                        seed.image.as_deref(),
                        position as i64,
                    ],
                )?;
            } else {
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn remove_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM entries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

/// Reads one entry through any connection.
///
/// Exposed for callers that only hold a shared connection, such as request
/// handlers re-reading an entry after a vote.
pub fn get_entry(conn: &Connection, id: EntryId) -> RepoResult<Option<Entry>> {
    let mut stmt = conn.prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_entry_row(row)?));
    }
    Ok(None)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let id: EntryId = row.get("id")?;
    let votes = votes_from_db(id, row.get("votes")?)?;
    Ok(Entry {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        image: row.get("image")?,
        votes,
    })
}
