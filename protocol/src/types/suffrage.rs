//! Governance quorum for operations that are not signed by an account.
//!
//! Currency registration, policy updates, inflation and similar
//! network-level operations are authorized by the suffrage: the set of node
//! keys that run consensus. Such an operation passes when at least
//! `ceil(len(keys) * percent / 100)` distinct suffrage keys signed it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::account_keys::SignError;
use crate::crypto::NovaPublicKey;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suffrage {
    keys: Vec<NovaPublicKey>,
    percent: u8,
}

impl Suffrage {
    pub fn new(keys: Vec<NovaPublicKey>, percent: u8) -> Result<Self, ValidationError> {
        if keys.is_empty() {
            return Err(ValidationError::invalid("suffrage", "no suffrage keys"));
        }
        if percent == 0 || percent > 100 {
            return Err(ValidationError::invalid(
                "suffrage",
                format!("percent {percent} out of range 1..=100"),
            ));
        }
        Ok(Self { keys, percent })
    }

    pub fn keys(&self) -> &[NovaPublicKey] {
        &self.keys
    }

    /// Number of distinct suffrage signatures required.
    pub fn threshold(&self) -> usize {
        (self.keys.len() * self.percent as usize).div_ceil(100)
    }

    /// Count distinct signers that belong to the suffrage. Signers outside
    /// the suffrage are ignored rather than rejected.
    pub fn check_signs<'a, I>(&self, signers: I) -> Result<(), SignError>
    where
        I: IntoIterator<Item = &'a NovaPublicKey>,
    {
        let mut any = false;
        let mut signed = BTreeSet::new();
        for signer in signers {
            any = true;
            if self.keys.contains(signer) {
                signed.insert(signer);
            }
        }
        if !any {
            return Err(SignError::EmptySigns);
        }
        let threshold = self.threshold();
        if signed.len() < threshold {
            return Err(SignError::NotEnoughSuffrageSigns {
                signed: signed.len(),
                threshold,
            });
        }
        Ok(())
    }
}
