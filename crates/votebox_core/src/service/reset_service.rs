//! Reset controller: authorized zeroing of tallies and ledger.
//!
//! # Responsibility
//! - Check the supplied secret against the configured admin secret.
//! - Zero every tally, then clear the ledger.
//!
//! # Invariants
//! - A rejected secret touches no state.
//! - The two steps are separate store operations, not one transaction. A vote
//!   that completes strictly between them is counted in the new round while
//!   its ledger record is wiped, so that identity may vote once more.

use crate::repo::ledger_repo::VoteLedger;
use crate::repo::tally_repo::TallyStore;
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use subtle::ConstantTimeEq;

/// Configured administrative secret.
///
/// An unset or empty secret disables reset entirely.
#[derive(Clone, Default)]
pub struct AdminSecret(Option<String>);

impl AdminSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if secret.is_empty() {
            Self(None)
        } else {
            Self(Some(secret))
        }
    }

    /// Secret that rejects every attempt.
    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Exact, constant-time comparison with the supplied value.
    pub fn verify(&self, supplied: &str) -> bool {
        match &self.0 {
            Some(secret) => secret.as_bytes().ct_eq(supplied.as_bytes()).into(),
            None => false,
        }
    }
}

impl Debug for AdminSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_configured() {
            "<redacted>"
        } else {
            "<unset>"
        };
        f.debug_tuple("AdminSecret").field(&state).finish()
    }
}

#[derive(Debug)]
pub enum ResetError {
    /// Supplied secret does not match.
    Unauthorized,
    Storage(RepoError),
}

impl Display for ResetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "invalid reset secret"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ResetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unauthorized => None,
            Self::Storage(err) => Some(err),
        }
    }
}

/// What a successful reset touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub entries_zeroed: u64,
    pub records_cleared: u64,
}

/// Authorizes and performs bulk resets.
pub struct ResetController<L: VoteLedger, T: TallyStore> {
    ledger: L,
    tally: T,
    secret: AdminSecret,
}

impl<L: VoteLedger, T: TallyStore> ResetController<L, T> {
    pub fn new(ledger: L, tally: T, secret: AdminSecret) -> Self {
        Self {
            ledger,
            tally,
            secret,
        }
    }

    /// Zeroes all tallies and clears the ledger.
    ///
    /// # Errors
    /// - `Unauthorized` when `supplied_secret` does not match; nothing is touched.
    /// - `Storage` when either step fails. If `reset_all` succeeded and
    ///   `clear_all` failed, tallies stay zeroed while the ledger keeps its records.
    pub fn reset(&self, supplied_secret: &str) -> Result<ResetReport, ResetError> {
        if !self.secret.verify(supplied_secret) {
            warn!(
                "event=reset module=reset status=rejected reason=unauthorized secret_configured={}",
                self.secret.is_configured()
            );
            return Err(ResetError::Unauthorized);
        }

        let entries_zeroed = self.tally.reset_all().map_err(|err| {
            error!("event=reset module=reset status=error step=reset_all error={err}");
            ResetError::Storage(err)
        })?;
        let records_cleared = self.ledger.clear_all().map_err(|err| {
            error!(
                "event=reset module=reset status=error step=clear_all entries_zeroed={entries_zeroed} error={err}"
            );
            ResetError::Storage(err)
        })?;

        info!(
            "event=reset module=reset status=ok entries_zeroed={entries_zeroed} records_cleared={records_cleared}"
        );
        Ok(ResetReport {
            entries_zeroed,
            records_cleared,
        })
    }
}
