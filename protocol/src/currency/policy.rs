//! Currency policies and designs.
//!
//! A [`CurrencyDesign`] is the registered description of one currency:
//! how much was minted at registration, who received it, how much exists
//! now (`aggregate`, which inflation raises), and the [`CurrencyPolicy`]
//! that governs new accounts and fees.

use serde::{Deserialize, Serialize};

use super::feeer::Feeer;
use crate::error::ValidationError;
use crate::types::{Address, Amount, Big, CurrencyId};

// ---------------------------------------------------------------------------
// CurrencyPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPolicy {
    new_account_min_balance: Big,
    feeer: Feeer,
}

impl CurrencyPolicy {
    pub fn new(new_account_min_balance: Big, feeer: Feeer) -> Self {
        Self {
            new_account_min_balance,
            feeer,
        }
    }

    /// Smallest initial balance a new account may be created with.
    pub fn new_account_min_balance(&self) -> &Big {
        &self.new_account_min_balance
    }

    pub fn feeer(&self) -> &Feeer {
        &self.feeer
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !self.new_account_min_balance.over_nil() {
            return Err(ValidationError::invalid(
                "currency policy",
                format!(
                    "new account min balance under zero, {}",
                    self.new_account_min_balance
                ),
            ));
        }
        self.feeer.is_valid()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.new_account_min_balance.to_bytes();
        buf.push(0x00);
        buf.extend_from_slice(&self.feeer.to_bytes());
        buf
    }
}

// ---------------------------------------------------------------------------
// CurrencyDesign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDesign {
    amount: Amount,
    genesis_account: Option<Address>,
    policy: CurrencyPolicy,
    aggregate: Big,
}

impl CurrencyDesign {
    /// A design whose aggregate supply starts at `amount`.
    pub fn new(amount: Amount, genesis_account: Option<Address>, policy: CurrencyPolicy) -> Self {
        let aggregate = amount.big().clone();
        Self {
            amount,
            genesis_account,
            policy,
            aggregate,
        }
    }

    /// Initial supply credited to the genesis account at registration.
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn currency(&self) -> &CurrencyId {
        self.amount.currency()
    }

    pub fn genesis_account(&self) -> Option<&Address> {
        self.genesis_account.as_ref()
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }

    /// Total supply currently in existence.
    pub fn aggregate(&self) -> &Big {
        &self.aggregate
    }

    pub fn with_genesis_account(&self, genesis_account: Address) -> Self {
        Self {
            genesis_account: Some(genesis_account),
            ..self.clone()
        }
    }

    pub fn with_policy(&self, policy: CurrencyPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Raise the aggregate supply by `big`.
    pub fn add_aggregate(&self, big: &Big) -> Self {
        Self {
            aggregate: self.aggregate.add(big),
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.amount.is_valid()?;
        if !self.amount.big().over_zero() {
            return Err(ValidationError::invalid(
                "currency design",
                format!("amount should be over zero, {}", self.amount),
            ));
        }
        if self.aggregate.compare(self.amount.big()).is_lt() {
            return Err(ValidationError::invalid(
                "currency design",
                format!("aggregate {} under amount {}", self.aggregate, self.amount),
            ));
        }
        if let Some(genesis) = &self.genesis_account {
            genesis.is_valid()?;
        }
        self.policy.is_valid()
    }

    /// A design about to be registered: its aggregate is exactly the amount
    /// credited to the genesis account.
    pub fn check_unminted(&self) -> Result<(), ValidationError> {
        if self.aggregate.compare(self.amount.big()).is_ne() {
            return Err(ValidationError::invalid(
                "currency design",
                format!("aggregate {} differs from amount {}", self.aggregate, self.amount),
            ));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.amount.to_bytes();
        buf.push(0x00);
        if let Some(genesis) = &self.genesis_account {
            buf.extend_from_slice(&genesis.to_bytes());
        }
        buf.push(0x00);
        buf.extend_from_slice(&self.policy.to_bytes());
        buf.push(0x00);
        buf.extend_from_slice(&self.aggregate.to_bytes());
        buf
    }
}
