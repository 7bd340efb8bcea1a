//! Processing errors.
//!
//! Two outcomes matter to the host:
//!
//! - [`ProcessError::Rejected`]: a business rule failed. The operation is
//!   left out of the block and processing continues.
//! - everything else: the store failed, an invariant broke or the block
//!   was aborted. Processing of the block must stop.

use thiserror::Error;

use crate::currency::CurrencyError;
use crate::error::ValidationError;
use crate::operation::OperationKind;
use crate::state::StateError;
use crate::types::{Address, Big, CurrencyId, SignError};

/// Why an operation was left out of the block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("insufficient balance of sender, {holder}; {balance} !> {required}")]
    InsufficientBalance {
        holder: Address,
        balance: Big,
        required: Big,
    },

    #[error("invalid signing: {0}")]
    InvalidSigning(#[from] SignError),

    #[error("unknown currency, {0}")]
    UnknownCurrency(CurrencyId),

    #[error("amount should be over minimum balance, {amount} < {min} {currency}")]
    BelowMinimumBalance {
        amount: Big,
        min: Big,
        currency: CurrencyId,
    },

    /// The operation would change nothing.
    #[error("{0}")]
    NoOp(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("invalid operation: {0}")]
    Invalid(#[from] ValidationError),

    #[error("sender {0} already has an operation in this block")]
    DuplicateSender(Address),

    #[error("currency {0} already has a governance operation in this block")]
    DuplicateCurrency(CurrencyId),

    #[error("zero account {0} cannot receive")]
    ZeroAccountReceiver(Address),
}

impl From<CurrencyError> for RejectReason {
    fn from(e: CurrencyError) -> Self {
        match e {
            CurrencyError::UnknownCurrency(cid) => RejectReason::UnknownCurrency(cid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("{kind} operation rejected: {reason}")]
    Rejected {
        kind: OperationKind,
        reason: RejectReason,
    },

    /// An invariant broke; the block can no longer be trusted.
    #[error("fatal processing error: {0}")]
    Fatal(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("processing cancelled")]
    Cancelled,
}

impl ProcessError {
    pub fn rejected(kind: OperationKind, reason: impl Into<RejectReason>) -> Self {
        ProcessError::Rejected {
            kind,
            reason: reason.into(),
        }
    }

    /// `true` when the block may continue without this operation.
    pub fn is_rejected(&self) -> bool {
        matches!(self, ProcessError::Rejected { .. })
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            ProcessError::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_message() {
        let err = ProcessError::rejected(
            OperationKind::Transfers,
            RejectReason::InsufficientBalance {
                holder: Address::new("aaamca").unwrap(),
                balance: Big::new(5),
                required: Big::new(10),
            },
        );
        assert!(err.is_rejected());
        assert_eq!(
            err.reason().unwrap().to_string(),
            "insufficient balance of sender, aaamca; 5 !> 10"
        );
        assert_eq!(
            err.to_string(),
            "transfers operation rejected: insufficient balance of sender, aaamca; 5 !> 10"
        );
    }

    #[test]
    fn classification() {
        assert!(!ProcessError::Fatal("boom".into()).is_rejected());
        assert!(!ProcessError::Cancelled.is_rejected());
        let state: ProcessError = StateError::Store("down".into()).into();
        assert!(!state.is_rejected());

        let signing = ProcessError::rejected(OperationKind::KeyUpdater, SignError::EmptySigns);
        assert!(matches!(
            signing.reason(),
            Some(RejectReason::InvalidSigning(SignError::EmptySigns))
        ));
    }
}
