//! # Hashing Utilities
//!
//! Hash functions used by the currency engine. Two are enough:
//!
//! - **BLAKE3** — content hashes for facts, account key sets and states.
//!   Fast, and not subject to length extension.
//! - **SHA-256** — only through `double_sha256`, which derives operation
//!   hashes (fact hash plus signatures) the same way the rest of the
//!   protocol derives transaction IDs.
//!
//! Every digest is carried around as a [`Hash`], a 32-byte value with hex
//! `Display` so it can be logged and used as a map key without ceremony.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// The all-zero hash. Used as "not computed yet" in freshly built states.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// BLAKE3 digest of `data`.
    pub fn blake3(data: &[u8]) -> Self {
        Self(blake3_hash(data))
    }

    /// `SHA-256(SHA-256(data))`.
    pub fn double_sha256(data: &[u8]) -> Self {
        Self(double_sha256(data))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` for [`Hash::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Eight bytes is plenty to tell hashes apart in test output.
        write!(f, "Hash({}..)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compute the SHA-256 digest of `data` as a fixed-size array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute `SHA-256(SHA-256(data))`.
///
/// Operation hashes use this construction. The outer hash closes the
/// length-extension hole that a single SHA-256 leaves open.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the BLAKE3 digest of `data`.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
