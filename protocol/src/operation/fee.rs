//! Fee operation: synthetic, unsigned operation emitted at the end of a
//! block that pays every fee collected in the block to the receiver named
//! by each currency's fee policy.

use serde::{Deserialize, Serialize};

use super::envelope::{check_unique, fact_bytes_header, is_valid_fact, Fact};
use crate::crypto::Hash;
use crate::error::{ValidationError, ValidationResult};
use crate::types::Amount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeFact {
    hash: Hash,
    token: Vec<u8>,
    amounts: Vec<Amount>,
}

impl FeeFact {
    /// `amounts` holds one total per currency.
    pub fn new(token: impl Into<Vec<u8>>, amounts: Vec<Amount>) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            amounts,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }
}

impl Fact for FeeFact {
    const HINT: &'static str = "nova-currency-fee-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        for am in &self.amounts {
            buf.push(0x00);
            buf.extend_from_slice(&am.to_bytes());
        }
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        for am in &self.amounts {
            am.is_valid()?;
        }
        check_unique("currency", self.amounts.iter().map(Amount::currency))
    }
}

/// The fee operation. Carries no signatures; its hash derives from the
/// fact alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeOperation {
    fact: FeeFact,
    hash: Hash,
}

impl FeeOperation {
    pub fn new(fact: FeeFact) -> Self {
        let hash = Hash::double_sha256(fact.hash().as_bytes());
        Self { fact, hash }
    }

    /// Fee operation for the block at `height`.
    pub fn for_height(height: u64, amounts: Vec<Amount>) -> Self {
        Self::new(FeeFact::new(height.to_be_bytes().to_vec(), amounts))
    }

    pub fn fact(&self) -> &FeeFact {
        &self.fact
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn is_valid(&self) -> ValidationResult {
        self.fact.is_valid()?;
        let generated = Hash::double_sha256(self.fact.hash().as_bytes());
        if generated != self.hash {
            return Err(ValidationError::HashMismatch {
                what: "fee operation",
                stored: self.hash.to_hex(),
                generated: generated.to_hex(),
            });
        }
        Ok(())
    }
}
