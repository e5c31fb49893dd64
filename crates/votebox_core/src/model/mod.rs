//! Domain model for catalog entries, voter identities and admitted votes.
//!
//! # Responsibility
//! - Define the data shapes shared by repositories and services.
//! - Own identity canonicalization, the dedup key of the whole system.
//!
//! # Invariants
//! - An `Identity` value is always trimmed, lowercase and syntactically valid.
//! - A `VoteRecord` is immutable once admitted.

pub mod entry;
pub mod identity;
pub mod vote;
