//! Genesis currencies: the bootstrap operation. Creates the genesis
//! account and every initial currency in one step, signed by the genesis
//! node key alone.

use serde::{Deserialize, Serialize};

use super::envelope::{check_unique, fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::crypto::{Hash, NovaPublicKey};
use crate::currency::CurrencyDesign;
use crate::error::{ValidationError, ValidationResult};
use crate::types::{AccountKeys, Address};

pub type GenesisCurrencies = SignedFact<GenesisCurrenciesFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisCurrenciesFact {
    hash: Hash,
    token: Vec<u8>,
    genesis_node_key: NovaPublicKey,
    keys: AccountKeys,
    currencies: Vec<CurrencyDesign>,
}

impl GenesisCurrenciesFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        genesis_node_key: NovaPublicKey,
        keys: AccountKeys,
        currencies: Vec<CurrencyDesign>,
    ) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            genesis_node_key,
            keys,
            currencies,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn genesis_node_key(&self) -> &NovaPublicKey {
        &self.genesis_node_key
    }

    /// Keys of the genesis account.
    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn currencies(&self) -> &[CurrencyDesign] {
        &self.currencies
    }

    pub fn genesis_address(&self) -> Address {
        Address::from_keys(&self.keys)
    }
}

impl Fact for GenesisCurrenciesFact {
    const HINT: &'static str = "nova-currency-genesis-currencies-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        buf.extend_from_slice(self.genesis_node_key.as_bytes());
        buf.extend_from_slice(&self.keys.to_bytes());
        for design in &self.currencies {
            buf.push(0x00);
            buf.extend_from_slice(&design.to_bytes());
        }
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        if !self.genesis_node_key.is_valid() {
            return Err(ValidationError::invalid(
                "genesis currencies",
                "invalid genesis node key",
            ));
        }
        self.keys.is_valid()?;

        if self.currencies.is_empty() {
            return Err(ValidationError::invalid("genesis currencies", "empty currencies"));
        }
        for design in &self.currencies {
            design.is_valid()?;
            design.check_unminted()?;
        }
        check_unique("currency", self.currencies.iter().map(CurrencyDesign::currency))
    }
}
