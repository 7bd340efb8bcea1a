//! # Account Keys — Weighted Threshold Multisig
//!
//! Every account is controlled by an [`AccountKeys`] set: up to ten public
//! keys, each with a weight in `1..=100`, plus a threshold in `1..=100`.
//! An operation signed on behalf of the account is authorized when the
//! weights of its distinct signers add up to at least the threshold.
//!
//! Keys are kept sorted by their raw bytes so that the canonical byte form,
//! and therefore the content hash, does not depend on the order the keys
//! were supplied in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::{MAX_ACCOUNT_KEYS, MAX_KEY_WEIGHT, MIN_KEY_WEIGHT};
use crate::crypto::{Hash, NovaPublicKey};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Signature-set authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    /// No signatures at all.
    #[error("empty signs")]
    EmptySigns,

    /// A signer is not part of the account key set.
    #[error("unknown key found, {0}")]
    UnknownKey(NovaPublicKey),

    /// Matched weights fall short of the account threshold.
    #[error("not passed threshold, sum={sum} < threshold={threshold}")]
    ThresholdNotMet { sum: u32, threshold: u32 },

    /// Too few suffrage members signed a governance operation.
    #[error("not enough suffrage signs, signed={signed} < threshold={threshold}")]
    NotEnoughSuffrageSigns { signed: usize, threshold: usize },
}

// ---------------------------------------------------------------------------
// AccountKey
// ---------------------------------------------------------------------------

/// One public key and its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    key: NovaPublicKey,
    weight: u32,
}

impl AccountKey {
    pub fn new(key: NovaPublicKey, weight: u32) -> Result<Self, ValidationError> {
        let k = Self { key, weight };
        k.is_valid()?;
        Ok(k)
    }

    pub fn key(&self) -> &NovaPublicKey {
        &self.key
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !(MIN_KEY_WEIGHT..=MAX_KEY_WEIGHT).contains(&self.weight) {
            return Err(ValidationError::invalid(
                "key",
                format!(
                    "weight {} out of range {MIN_KEY_WEIGHT}..={MAX_KEY_WEIGHT}",
                    self.weight
                ),
            ));
        }
        if !self.key.is_valid() {
            return Err(ValidationError::invalid("key", "not a valid public key"));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.key.as_bytes().to_vec();
        buf.extend_from_slice(&self.weight.to_be_bytes());
        buf
    }
}

// ---------------------------------------------------------------------------
// AccountKeys
// ---------------------------------------------------------------------------

/// The key set and threshold that authorize an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKeys {
    keys: Vec<AccountKey>,
    threshold: u32,
    hash: Hash,
}

impl AccountKeys {
    /// Sort `keys`, compute the content hash and validate the result.
    pub fn new(mut keys: Vec<AccountKey>, threshold: u32) -> Result<Self, ValidationError> {
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        let hash = generate_hash(&keys, threshold);
        let ks = Self {
            keys,
            threshold,
            hash,
        };
        ks.is_valid()?;
        Ok(ks)
    }

    pub fn keys(&self) -> &[AccountKey] {
        &self.keys
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Look up the entry for `key`.
    pub fn key(&self, key: &NovaPublicKey) -> Option<&AccountKey> {
        self.keys
            .binary_search_by(|k| k.key.cmp(key))
            .ok()
            .map(|i| &self.keys[i])
    }

    /// Same keys, same weights, same threshold.
    pub fn equal(&self, other: &AccountKeys) -> bool {
        self.threshold == other.threshold && self.keys == other.keys
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.keys.is_empty() {
            return Err(ValidationError::invalid("keys", "empty keys"));
        }
        if self.keys.len() > MAX_ACCOUNT_KEYS {
            return Err(ValidationError::invalid(
                "keys",
                format!("{} keys over {MAX_ACCOUNT_KEYS}", self.keys.len()),
            ));
        }
        if !(MIN_KEY_WEIGHT..=MAX_KEY_WEIGHT).contains(&self.threshold) {
            return Err(ValidationError::invalid(
                "keys",
                format!(
                    "threshold {} out of range {MIN_KEY_WEIGHT}..={MAX_KEY_WEIGHT}",
                    self.threshold
                ),
            ));
        }

        let mut seen = BTreeSet::new();
        let mut total = 0u32;
        for k in &self.keys {
            k.is_valid()?;
            if !seen.insert(&k.key) {
                return Err(ValidationError::invalid(
                    "keys",
                    format!("duplicated key found, {}", k.key),
                ));
            }
            total += k.weight;
        }
        if total < self.threshold {
            return Err(ValidationError::invalid(
                "keys",
                format!("sum of weights {total} under threshold {}", self.threshold),
            ));
        }

        if self.keys.windows(2).any(|w| w[0].key > w[1].key) {
            return Err(ValidationError::invalid("keys", "keys are not sorted"));
        }

        let generated = generate_hash(&self.keys, self.threshold);
        if generated != self.hash {
            return Err(ValidationError::HashMismatch {
                what: "keys",
                stored: self.hash.to_hex(),
                generated: generated.to_hex(),
            });
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.keys, self.threshold)
    }
}

fn canonical_bytes(keys: &[AccountKey], threshold: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(keys.len() * 36 + 4);
    for k in keys {
        buf.extend_from_slice(&k.to_bytes());
    }
    buf.extend_from_slice(&threshold.to_be_bytes());
    buf
}

fn generate_hash(keys: &[AccountKey], threshold: u32) -> Hash {
    Hash::blake3(&canonical_bytes(keys, threshold))
}

// ---------------------------------------------------------------------------
// Threshold check
// ---------------------------------------------------------------------------

/// Check that `signers` collectively meet the threshold of `keys`.
///
/// Every signer must be in the key set. A signer appearing more than once
/// contributes its weight once.
pub fn check_threshold<'a, I>(signers: I, keys: &AccountKeys) -> Result<(), SignError>
where
    I: IntoIterator<Item = &'a NovaPublicKey>,
{
    let mut counted = BTreeSet::new();
    let mut sum = 0u32;
    let mut any = false;

    for signer in signers {
        any = true;
        let ky = keys
            .key(signer)
            .ok_or_else(|| SignError::UnknownKey(signer.clone()))?;
        if counted.insert(signer) {
            sum += ky.weight();
        }
    }

    if !any {
        return Err(SignError::EmptySigns);
    }
    if sum < keys.threshold() {
        return Err(SignError::ThresholdNotMet {
            sum,
            threshold: keys.threshold(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::NovaKeypair;

    fn pk(seed: u8) -> NovaPublicKey {
        NovaKeypair::from_seed(&[seed; 32]).public_key()
    }

    fn keys(spec: &[(u8, u32)], threshold: u32) -> AccountKeys {
        let ks = spec
            .iter()
            .map(|(s, w)| AccountKey::new(pk(*s), *w).unwrap())
            .collect();
        AccountKeys::new(ks, threshold).unwrap()
    }

    #[test]
    fn order_of_input_does_not_change_hash() {
        let a = keys(&[(1, 30), (2, 70)], 100);
        let b = keys(&[(2, 70), (1, 30)], 100);
        assert_eq!(a.hash(), b.hash());
        assert!(a.equal(&b));
    }

    #[test]
    fn weight_and_threshold_bounds() {
        assert!(AccountKey::new(pk(1), 0).is_err());
        assert!(AccountKey::new(pk(1), 101).is_err());
        let k = AccountKey::new(pk(1), 50).unwrap();
        assert!(AccountKeys::new(vec![k.clone()], 0).is_err());
        assert!(AccountKeys::new(vec![k.clone()], 101).is_err());
        assert!(AccountKeys::new(vec![k], 51).is_err());
    }

    #[test]
    fn empty_duplicate_and_oversized_sets_rejected() {
        assert!(AccountKeys::new(vec![], 1).is_err());

        let k = AccountKey::new(pk(1), 50).unwrap();
        assert!(AccountKeys::new(vec![k.clone(), k], 50).is_err());

        let many: Vec<_> = (1..=11u8)
            .map(|s| AccountKey::new(pk(s), 10).unwrap())
            .collect();
        assert!(AccountKeys::new(many, 10).is_err());
    }

    #[test]
    fn tampered_hash_detected() {
        let ks = keys(&[(1, 100)], 100);
        let mut json = serde_json::to_value(&ks).unwrap();
        json["threshold"] = serde_json::json!(99);
        let tampered: AccountKeys = serde_json::from_value(json).unwrap();
        assert!(matches!(
            tampered.is_valid(),
            Err(ValidationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn threshold_met_and_not_met() {
        let ks = keys(&[(1, 30), (2, 30), (3, 40)], 70);

        assert!(check_threshold([&pk(1), &pk(3)], &ks).is_ok());
        assert!(check_threshold([&pk(3), &pk(2), &pk(1)], &ks).is_ok());
        assert_eq!(
            check_threshold([&pk(1), &pk(2)], &ks),
            Err(SignError::ThresholdNotMet {
                sum: 60,
                threshold: 70
            })
        );
    }

    #[test]
    fn threshold_is_monotonic_over_subsets() {
        let weights = [(1u8, 10u32), (2, 20), (3, 30), (4, 40)];
        let ks = keys(&weights, 50);

        for mask in 1u32..16 {
            let signers: Vec<NovaPublicKey> = weights
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, (s, _))| pk(*s))
                .collect();
            let sum: u32 = weights
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, (_, w))| *w)
                .sum();

            let forward = check_threshold(signers.iter(), &ks);
            let backward = check_threshold(signers.iter().rev(), &ks);
            assert_eq!(forward.is_ok(), sum >= 50, "mask {mask:#06b}");
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn unknown_signer_rejected() {
        let ks = keys(&[(1, 100)], 100);
        assert_eq!(
            check_threshold([&pk(1), &pk(9)], &ks),
            Err(SignError::UnknownKey(pk(9)))
        );
    }

    #[test]
    fn repeated_signer_counts_once() {
        let ks = keys(&[(1, 50), (2, 50)], 100);
        assert_eq!(
            check_threshold([&pk(1), &pk(1)], &ks),
            Err(SignError::ThresholdNotMet {
                sum: 50,
                threshold: 100
            })
        );
        assert!(check_threshold([&pk(1), &pk(2), &pk(1)], &ks).is_ok());
    }

    #[test]
    fn no_signers_rejected() {
        let ks = keys(&[(1, 100)], 100);
        let none: [&NovaPublicKey; 0] = [];
        assert_eq!(check_threshold(none, &ks), Err(SignError::EmptySigns));
    }
}
