//! # Key Management
//!
//! Ed25519 keypairs, public keys and signatures for the currency engine.
//!
//! The engine never signs anything on its own behalf. Keypairs exist here
//! so that hosts and tests can produce [`FactSign`](crate::operation::FactSign)
//! values; the processors only ever see public keys and compare them
//! against account key sets or the suffrage key list.
//!
//! Public keys are displayed as base58, which is also the form used when
//! an account address is derived straight from a single key.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid public key encoding: {0}")]
    InvalidEncoding(String),
}

/// An Ed25519 keypair.
///
/// Not `Serialize`: exporting secret material has to be an explicit call to
/// [`NovaKeypair::secret_key_bytes`].
pub struct NovaKeypair {
    signing_key: SigningKey,
}

/// The public half of a keypair. Ordered by raw bytes, which is the order
/// account key sets are kept in.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NovaPublicKey {
    bytes: [u8; 32],
}

/// A 64-byte Ed25519 signature.
///
/// Stored as `Vec<u8>` for serde; anything that is not 64 bytes simply
/// fails verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaSignature {
    bytes: Vec<u8>,
}

impl NovaKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed. Handy for fixtures.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The public key of this keypair.
    pub fn public_key(&self) -> NovaPublicKey {
        NovaPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> NovaSignature {
        NovaSignature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// Raw secret key bytes. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for NovaKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for NovaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material.
        write!(f, "NovaKeypair(pub={})", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// NovaPublicKey
// ---------------------------------------------------------------------------

impl NovaPublicKey {
    /// Wrap raw bytes without point validation.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Build from a slice, checking both length and that the bytes are a
    /// valid Ed25519 point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse the base58 form produced by `Display`.
    pub fn from_base58(s: &str) -> Result<Self, KeyError> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        Self::try_from_slice(&decoded)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// `true` when the bytes decode to a usable verifying key.
    pub fn is_valid(&self) -> bool {
        VerifyingKey::from_bytes(&self.bytes).is_ok()
    }

    /// Verify `signature` over `message`. Returns `false` on any failure.
    pub fn verify(&self, message: &[u8], signature: &NovaSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature.bytes.as_slice()) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    /// Base58 representation.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.bytes).into_string()
    }
}

impl fmt::Display for NovaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for NovaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NovaPublicKey({})", self.to_base58())
    }
}

// ---------------------------------------------------------------------------
// NovaSignature
// ---------------------------------------------------------------------------

impl NovaSignature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for NovaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NovaSignature({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
