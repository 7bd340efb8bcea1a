//! # Signed-Fact Envelope
//!
//! Every operation is a [`Fact`] (the content-hashed intent) wrapped in a
//! [`SignedFact`] that carries the signatures authorizing it.
//!
//! ## Hashes
//!
//! ```text
//! fact hash      = BLAKE3(fact bytes)
//! signed message = fact hash || network id
//! operation hash = SHA-256(SHA-256(fact hash || sign bytes... || memo))
//! ```
//!
//! The network id in the signed message keeps a signature made for one
//! network from verifying on another. The operation hash covers the
//! signatures as well, so re-signing the same fact yields a new operation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::{MAX_MEMO_LENGTH, MAX_TOKEN_SIZE};
use crate::crypto::{Hash, NovaKeypair, NovaPublicKey, NovaSignature};
use crate::error::{ValidationError, ValidationResult};

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// The signed content of an operation.
pub trait Fact: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable type tag, mixed into the fact bytes.
    const HINT: &'static str;

    /// Caller-chosen bytes that make otherwise identical facts distinct.
    fn token(&self) -> &[u8];

    /// Stored content hash.
    fn hash(&self) -> Hash;

    /// Canonical bytes the hash is computed over.
    fn to_bytes(&self) -> Vec<u8>;

    fn is_valid(&self) -> ValidationResult;

    fn generate_hash(&self) -> Hash {
        Hash::blake3(&self.to_bytes())
    }
}

/// Checks shared by every fact: token bounds and stored hash.
pub fn is_valid_fact<F: Fact>(fact: &F) -> ValidationResult {
    let token = fact.token();
    if token.is_empty() {
        return Err(ValidationError::EmptyToken);
    }
    if token.len() > MAX_TOKEN_SIZE {
        return Err(ValidationError::TokenTooLong {
            len: token.len(),
            max: MAX_TOKEN_SIZE,
        });
    }
    let generated = fact.generate_hash();
    if generated != fact.hash() {
        return Err(ValidationError::HashMismatch {
            what: F::HINT,
            stored: fact.hash().to_hex(),
            generated: generated.to_hex(),
        });
    }
    Ok(())
}

/// Start a fact's canonical bytes: hint, then token.
pub(crate) fn fact_bytes_header(hint: &str, token: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    buf.extend_from_slice(hint.as_bytes());
    buf.push(0x00);
    buf.extend_from_slice(&(token.len() as u32).to_le_bytes());
    buf.extend_from_slice(token);
    buf
}

/// Reject the first item that appears twice.
pub(crate) fn check_unique<T, I>(what: &'static str, items: I) -> ValidationResult
where
    T: Ord + fmt::Display,
    I: IntoIterator<Item = T>,
{
    let mut seen = BTreeSet::new();
    for item in items {
        if seen.contains(&item) {
            return Err(ValidationError::Duplicate {
                what,
                item: item.to_string(),
            });
        }
        seen.insert(item);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FactSign
// ---------------------------------------------------------------------------

/// One signature over a fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSign {
    signer: NovaPublicKey,
    signature: NovaSignature,
    signed_at: DateTime<Utc>,
}

impl FactSign {
    pub fn new(signer: NovaPublicKey, signature: NovaSignature, signed_at: DateTime<Utc>) -> Self {
        Self {
            signer,
            signature,
            signed_at,
        }
    }

    /// Sign `fact_hash` for `network_id` now.
    pub fn sign(keypair: &NovaKeypair, fact_hash: &Hash, network_id: &[u8]) -> Self {
        let signature = keypair.sign(&signed_message(fact_hash, network_id));
        Self::new(keypair.public_key(), signature, Utc::now())
    }

    pub fn signer(&self) -> &NovaPublicKey {
        &self.signer
    }

    pub fn signature(&self) -> &NovaSignature {
        &self.signature
    }

    pub fn signed_at(&self) -> DateTime<Utc> {
        self.signed_at
    }

    pub fn verify(&self, fact_hash: &Hash, network_id: &[u8]) -> bool {
        self.signer
            .verify(&signed_message(fact_hash, network_id), &self.signature)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.signer.as_bytes().to_vec();
        buf.extend_from_slice(self.signature.as_bytes());
        buf.extend_from_slice(&self.signed_at.timestamp_millis().to_le_bytes());
        buf
    }
}

fn signed_message(fact_hash: &Hash, network_id: &[u8]) -> Vec<u8> {
    let mut msg = fact_hash.as_bytes().to_vec();
    msg.extend_from_slice(network_id);
    msg
}

// ---------------------------------------------------------------------------
// SignedFact
// ---------------------------------------------------------------------------

/// A fact plus the signatures authorizing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "F: Fact")]
pub struct SignedFact<F: Fact> {
    fact: F,
    signs: Vec<FactSign>,
    memo: String,
    hash: Hash,
}

impl<F: Fact> SignedFact<F> {
    pub fn new(fact: F, signs: Vec<FactSign>, memo: impl Into<String>) -> Self {
        let memo = memo.into();
        let hash = operation_hash(&fact, &signs, &memo);
        Self {
            fact,
            signs,
            memo,
            hash,
        }
    }

    /// Sign `fact` with every keypair in `signers`.
    pub fn sign(fact: F, signers: &[&NovaKeypair], network_id: &[u8]) -> Self {
        let fact_hash = fact.hash();
        let signs = signers
            .iter()
            .map(|kp| FactSign::sign(kp, &fact_hash, network_id))
            .collect();
        Self::new(fact, signs, "")
    }

    pub fn fact(&self) -> &F {
        &self.fact
    }

    pub fn signs(&self) -> &[FactSign] {
        &self.signs
    }

    pub fn signers(&self) -> impl Iterator<Item = &NovaPublicKey> {
        self.signs.iter().map(FactSign::signer)
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Operation hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn is_valid(&self, network_id: &[u8]) -> ValidationResult {
        is_valid_signed_fact(self, network_id)
    }
}

fn operation_hash<F: Fact>(fact: &F, signs: &[FactSign], memo: &str) -> Hash {
    let mut buf = fact.hash().as_bytes().to_vec();
    for sign in signs {
        buf.extend_from_slice(&sign.to_bytes());
    }
    buf.extend_from_slice(memo.as_bytes());
    Hash::double_sha256(&buf)
}

/// Admission checks for a signed fact: the fact itself, the signature set,
/// the memo and the operation hash.
pub fn is_valid_signed_fact<F: Fact>(op: &SignedFact<F>, network_id: &[u8]) -> ValidationResult {
    op.fact.is_valid()?;

    if op.signs.is_empty() {
        return Err(ValidationError::invalid("operation", "empty signs"));
    }
    check_unique("signer", op.signers())?;

    let fact_hash = op.fact.hash();
    for sign in &op.signs {
        if !sign.verify(&fact_hash, network_id) {
            return Err(ValidationError::BadSignature(sign.signer.to_string()));
        }
    }

    if op.memo.len() > MAX_MEMO_LENGTH {
        return Err(ValidationError::MemoTooLong {
            len: op.memo.len(),
            max: MAX_MEMO_LENGTH,
        });
    }

    let generated = operation_hash(&op.fact, &op.signs, &op.memo);
    if generated != op.hash {
        return Err(ValidationError::HashMismatch {
            what: "operation",
            stored: op.hash.to_hex(),
            generated: generated.to_hex(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct NoteFact {
        hash: Hash,
        token: Vec<u8>,
        note: String,
    }

    impl NoteFact {
        fn new(token: &[u8], note: &str) -> Self {
            let mut fact = Self {
                hash: Hash::ZERO,
                token: token.to_vec(),
                note: note.to_string(),
            };
            fact.hash = fact.generate_hash();
            fact
        }
    }

    impl Fact for NoteFact {
        const HINT: &'static str = "test-note-fact";

        fn token(&self) -> &[u8] {
            &self.token
        }

        fn hash(&self) -> Hash {
            self.hash
        }

        fn to_bytes(&self) -> Vec<u8> {
            let mut buf = fact_bytes_header(Self::HINT, &self.token);
            buf.extend_from_slice(self.note.as_bytes());
            buf
        }

        fn is_valid(&self) -> ValidationResult {
            is_valid_fact(self)
        }
    }

    const NETWORK: &[u8] = b"test-network";

    #[test]
    fn signed_fact_valid() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let op = SignedFact::sign(NoteFact::new(b"t", "hello"), &[&kp], NETWORK);
        assert!(op.is_valid(NETWORK).is_ok());
        assert_eq!(op.signers().count(), 1);
    }

    #[test]
    fn signature_bound_to_network() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let op = SignedFact::sign(NoteFact::new(b"t", "hello"), &[&kp], NETWORK);
        assert!(matches!(
            op.is_valid(b"other-network"),
            Err(ValidationError::BadSignature(_))
        ));
    }

    #[test]
    fn empty_token_rejected() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let op = SignedFact::sign(NoteFact::new(b"", "hello"), &[&kp], NETWORK);
        assert_eq!(op.is_valid(NETWORK), Err(ValidationError::EmptyToken));
    }

    #[test]
    fn tampered_fact_rejected() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let mut fact = NoteFact::new(b"t", "hello");
        fact.note = "changed".into();
        let op = SignedFact::sign(fact, &[&kp], NETWORK);
        assert!(matches!(
            op.is_valid(NETWORK),
            Err(ValidationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_signer_rejected() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let op = SignedFact::sign(NoteFact::new(b"t", "hello"), &[&kp, &kp], NETWORK);
        assert!(matches!(
            op.is_valid(NETWORK),
            Err(ValidationError::Duplicate { what: "signer", .. })
        ));
    }

    #[test]
    fn memo_limit_and_operation_hash() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let fact = NoteFact::new(b"t", "hello");
        let sign = FactSign::sign(&kp, &fact.hash(), NETWORK);

        let long = SignedFact::new(fact.clone(), vec![sign.clone()], "m".repeat(MAX_MEMO_LENGTH + 1));
        assert!(matches!(
            long.is_valid(NETWORK),
            Err(ValidationError::MemoTooLong { .. })
        ));

        let a = SignedFact::new(fact.clone(), vec![sign.clone()], "a");
        let b = SignedFact::new(fact, vec![sign], "b");
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn no_signs_rejected() {
        let op = SignedFact::new(NoteFact::new(b"t", "hello"), vec![], "");
        assert!(op.is_valid(NETWORK).is_err());
    }
}
