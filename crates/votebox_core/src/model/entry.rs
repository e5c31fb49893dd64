//! Catalog entry model.
//!
//! # Responsibility
//! - Define the read shape of a voteable entry (`Entry`).
//! - Define the seed shape accepted from the catalog data file.
//!
//! # Invariants
//! - `votes` is never negative; it changes only through the tally store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Catalog-assigned entry identifier.
pub type EntryId = i64;

/// One voteable catalog entry together with its running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub votes: u64,
}

/// Catalog metadata as it appears in a seed file.
///
/// `votes` is honoured only when the entry does not exist yet; reseeding
/// never rewrites a running tally.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntrySeed {
    pub id: EntryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub votes: Option<u64>,
}

/// Top-level shape of a catalog seed file: `{ "projects": [ ... ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogSeed {
    pub projects: Vec<EntrySeed>,
}

/// Seed file could not be accepted.
#[derive(Debug)]
pub enum SeedError {
    Json(serde_json::Error),
    DuplicateId(EntryId),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid catalog seed: {err}"),
            Self::DuplicateId(id) => write!(f, "catalog seed lists entry {id} more than once"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl CatalogSeed {
    /// Parses and checks a catalog seed document.
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let seed: Self = serde_json::from_str(raw).map_err(SeedError::Json)?;
        let mut seen = std::collections::BTreeSet::new();
        for entry in &seed.projects {
            if !seen.insert(entry.id) {
                return Err(SeedError::DuplicateId(entry.id));
            }
        }
        Ok(seed)
    }
}
