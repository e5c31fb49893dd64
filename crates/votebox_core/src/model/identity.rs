//! Voter identity normalization.
//!
//! # Responsibility
//! - Validate raw email input against a `local@domain.tld` shape.
//! - Produce the canonical (trimmed, lowercase) form used as the dedup key.
//!
//! # Invariants
//! - Normalization has no side effects and never touches storage.
//! - Two inputs differing only in case or surrounding whitespace map to the
//!   same `Identity`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest address accepted (RFC 5321 path limit minus the angle brackets).
pub const IDENTITY_MAX_CHARS: usize = 254;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.][^\s@]*\.[^\s@]+$").expect("valid email regex"));

/// Reason a raw identity was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No identity was supplied, or it was not a string.
    Missing,
    /// Input does not look like `local@domain.tld`.
    Malformed,
    /// Input exceeds [`IDENTITY_MAX_CHARS`].
    TooLong { chars: usize },
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "email is required"),
            Self::Malformed => write!(f, "email is not a valid address"),
            Self::TooLong { chars } => write!(
                f,
                "email is {chars} characters long; at most {IDENTITY_MAX_CHARS} allowed"
            ),
        }
    }
}

impl Error for IdentityError {}

/// Canonical voter identity.
///
/// Only constructible through [`Identity::parse`], so holding one proves the
/// value went through normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Validates and canonicalizes a raw identity string.
    ///
    /// # Errors
    /// - `Malformed` for empty input, embedded whitespace, a missing `@`, or
    ///   a domain part without a `.`.
    /// - `TooLong` when the trimmed input exceeds [`IDENTITY_MAX_CHARS`].
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();
        if chars > IDENTITY_MAX_CHARS {
            return Err(IdentityError::TooLong { chars });
        }
        if !EMAIL_SHAPE_RE.is_match(trimmed) {
            return Err(IdentityError::Malformed);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Like [`Identity::parse`], treating an absent value as `Missing`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, IdentityError> {
        raw.map_or(Err(IdentityError::Missing), Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
