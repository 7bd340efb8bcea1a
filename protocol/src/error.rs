//! Admission-time validation errors.
//!
//! Everything in this module is raised by an `is_valid` check: malformed
//! values that never need ledger state to be rejected. Failures that depend
//! on live state are [`ProcessError`](crate::processor::ProcessError)s.

use thiserror::Error;

/// A value failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input could not be parsed at all (bad number, bad currency id, ...).
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A field parsed but violates a constraint.
    #[error("invalid {what}: {reason}")]
    Invalid {
        /// What was being validated, e.g. `"keys"` or `"amount"`.
        what: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A stored hash does not match the hash regenerated from content.
    #[error("hash mismatch in {what}: stored {stored}, generated {generated}")]
    HashMismatch {
        what: &'static str,
        stored: String,
        generated: String,
    },

    #[error("empty token")]
    EmptyToken,

    #[error("token too long, {len} > {max}")]
    TokenTooLong { len: usize, max: usize },

    #[error("memo too long, {len} > {max}")]
    MemoTooLong { len: usize, max: usize },

    /// A fact signature does not verify against its signer.
    #[error("invalid signature by {0}")]
    BadSignature(String),

    /// The same item appears twice where items must be unique.
    #[error("duplicated {what} found, {item}")]
    Duplicate { what: &'static str, item: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Invalid`].
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            reason: reason.into(),
        }
    }
}

/// Result alias for validation checks.
pub type ValidationResult<T = ()> = Result<T, ValidationError>;
