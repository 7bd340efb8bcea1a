//! # Staged Balance Adjustments
//!
//! An [`AmountState`] wraps the balance state an operation read during
//! pre-processing and accumulates what the operation wants to do to it:
//!
//! - `add`: net change to the balance (credits positive, debits negative)
//! - `fee`: the portion of the debit that is a fee, kept only so the
//!   orchestrator can total fees per currency
//!
//! Nothing touches the stored value until [`AmountState::merge`] is called
//! against the latest committed state by the state pool. Every mutator
//! returns a new value, so a staged adjustment can be kept, dropped or
//! retried without order-dependent side effects.
//!
//! The fee is *not* subtracted by [`AmountState::add_fee`]. A payer-borne
//! fee is debited with `sub(amount + fee)` and then recorded with
//! `add_fee(fee)`.

use serde::{Deserialize, Serialize};

use super::value::State;
use super::StateError;
use crate::types::{Amount, Big, CurrencyId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountState {
    state: State,
    currency: CurrencyId,
    add: Big,
    fee: Big,
}

impl AmountState {
    pub fn new(state: State, currency: CurrencyId) -> Self {
        Self {
            state,
            currency,
            add: Big::zero(),
            fee: Big::zero(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn key(&self) -> &str {
        self.state.key()
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    /// Pending net change.
    pub fn delta(&self) -> &Big {
        &self.add
    }

    /// Pending fee, for bookkeeping only.
    pub fn fee(&self) -> &Big {
        &self.fee
    }

    /// Balance as read, ignoring the pending change. A blank state reads
    /// as zero.
    pub fn balance(&self) -> Result<Big, StateError> {
        balance_of(&self.state, &self.currency)
    }

    pub fn add(&self, big: &Big) -> Self {
        Self {
            add: self.add.add(big),
            ..self.clone()
        }
    }

    pub fn sub(&self, big: &Big) -> Self {
        Self {
            add: self.add.sub(big),
            ..self.clone()
        }
    }

    pub fn add_fee(&self, fee: &Big) -> Self {
        Self {
            fee: self.fee.add(fee),
            ..self.clone()
        }
    }

    /// New committed amount: the balance held by `base` plus the pending
    /// change.
    pub fn merge(&self, base: &State) -> Result<Amount, StateError> {
        let current = balance_of(base, &self.currency)?;
        Ok(Amount::new(current.add(&self.add), self.currency.clone()))
    }
}

fn balance_of(state: &State, currency: &CurrencyId) -> Result<Big, StateError> {
    if state.is_blank() {
        return Ok(Big::zero());
    }
    let amount = state.balance_value()?;
    if amount.currency() != currency {
        return Err(StateError::CurrencyMismatch {
            key: state.key().to_string(),
            expected: currency.clone(),
            found: amount.currency().clone(),
        });
    }
    Ok(amount.big().clone())
}
