//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the vote, reset and repair use cases.
//! - Stay storage-agnostic: services see only repository traits.
//!
//! # Invariants
//! - Services keep no counts or ledger membership in memory across calls.

pub mod repair_service;
pub mod reset_service;
pub mod vote_service;
