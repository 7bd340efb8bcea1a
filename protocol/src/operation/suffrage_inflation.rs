//! Suffrage inflation: governance operation minting new units straight
//! into receiver balances.

use serde::{Deserialize, Serialize};

use super::envelope::{check_unique, fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::config::MAX_SUFFRAGE_INFLATION_ITEMS;
use crate::crypto::Hash;
use crate::error::{ValidationError, ValidationResult};
use crate::types::{Address, Amount};

pub type SuffrageInflation = SignedFact<SuffrageInflationFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuffrageInflationItem {
    receiver: Address,
    amount: Amount,
}

impl SuffrageInflationItem {
    pub fn new(receiver: Address, amount: Amount) -> Self {
        Self { receiver, amount }
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn is_valid(&self) -> ValidationResult {
        self.receiver.is_valid()?;
        self.amount.is_valid()?;
        if !self.amount.big().over_zero() {
            return Err(ValidationError::invalid(
                "suffrage inflation item",
                format!("amount should be over zero, {}", self.amount),
            ));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.receiver.to_bytes();
        buf.push(0x00);
        buf.extend_from_slice(&self.amount.to_bytes());
        buf
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuffrageInflationFact {
    hash: Hash,
    token: Vec<u8>,
    items: Vec<SuffrageInflationItem>,
}

impl SuffrageInflationFact {
    pub fn new(token: impl Into<Vec<u8>>, items: Vec<SuffrageInflationItem>) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            items,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn items(&self) -> &[SuffrageInflationItem] {
        &self.items
    }
}

impl Fact for SuffrageInflationFact {
    const HINT: &'static str = "nova-currency-suffrage-inflation-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        for item in &self.items {
            buf.push(0x00);
            buf.extend_from_slice(&item.to_bytes());
        }
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;

        if self.items.is_empty() {
            return Err(ValidationError::invalid("suffrage inflation", "empty items"));
        }
        if self.items.len() > MAX_SUFFRAGE_INFLATION_ITEMS {
            return Err(ValidationError::invalid(
                "suffrage inflation",
                format!(
                    "items over allowed, {} > {}",
                    self.items.len(),
                    MAX_SUFFRAGE_INFLATION_ITEMS
                ),
            ));
        }
        for item in &self.items {
            item.is_valid()?;
        }
        check_unique(
            "receiver and currency",
            self.items
                .iter()
                .map(|it| format!("{}-{}", it.receiver, it.amount.currency())),
        )
    }
}
