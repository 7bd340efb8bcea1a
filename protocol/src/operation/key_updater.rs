//! Key updater: replace the key set that controls an account. The account
//! address stays the same.

use serde::{Deserialize, Serialize};

use super::envelope::{fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::crypto::Hash;
use crate::error::ValidationResult;
use crate::types::{AccountKeys, Address, CurrencyId};

pub type KeyUpdater = SignedFact<KeyUpdaterFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyUpdaterFact {
    hash: Hash,
    token: Vec<u8>,
    target: Address,
    keys: AccountKeys,
    /// Currency the fee is paid in.
    currency: CurrencyId,
}

impl KeyUpdaterFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        target: Address,
        keys: AccountKeys,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            target,
            keys,
            currency,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for KeyUpdaterFact {
    const HINT: &'static str = "nova-currency-key-updater-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        buf.extend_from_slice(&self.target.to_bytes());
        buf.push(0x00);
        buf.extend_from_slice(&self.keys.to_bytes());
        buf.push(0x00);
        buf.extend_from_slice(&self.currency.to_bytes());
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        self.target.is_valid()?;
        self.keys.is_valid()
    }
}
