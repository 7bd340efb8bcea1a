//! Currency register: governance operation introducing a new currency.

use serde::{Deserialize, Serialize};

use super::envelope::{fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::crypto::Hash;
use crate::currency::CurrencyDesign;
use crate::error::{ValidationError, ValidationResult};

pub type CurrencyRegister = SignedFact<CurrencyRegisterFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRegisterFact {
    hash: Hash,
    token: Vec<u8>,
    currency: CurrencyDesign,
}

impl CurrencyRegisterFact {
    pub fn new(token: impl Into<Vec<u8>>, currency: CurrencyDesign) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            currency,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn currency(&self) -> &CurrencyDesign {
        &self.currency
    }
}

impl Fact for CurrencyRegisterFact {
    const HINT: &'static str = "nova-currency-currency-register-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        buf.extend_from_slice(&self.currency.to_bytes());
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        self.currency.is_valid()?;
        self.currency.check_unminted()?;
        if self.currency.genesis_account().is_none() {
            return Err(ValidationError::invalid(
                "currency register",
                format!("empty genesis account for {}", self.currency.currency()),
            ));
        }
        Ok(())
    }
}
