//! Currency policy updater: governance operation replacing a currency's
//! policy. Supply is untouched.

use serde::{Deserialize, Serialize};

use super::envelope::{fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::crypto::Hash;
use crate::currency::CurrencyPolicy;
use crate::error::ValidationResult;
use crate::types::CurrencyId;

pub type CurrencyPolicyUpdater = SignedFact<CurrencyPolicyUpdaterFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPolicyUpdaterFact {
    hash: Hash,
    token: Vec<u8>,
    currency: CurrencyId,
    policy: CurrencyPolicy,
}

impl CurrencyPolicyUpdaterFact {
    pub fn new(token: impl Into<Vec<u8>>, currency: CurrencyId, policy: CurrencyPolicy) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            currency,
            policy,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }
}

impl Fact for CurrencyPolicyUpdaterFact {
    const HINT: &'static str = "nova-currency-currency-policy-updater-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        buf.extend_from_slice(&self.currency.to_bytes());
        buf.push(0x00);
        buf.extend_from_slice(&self.policy.to_bytes());
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        self.policy.is_valid()
    }
}
