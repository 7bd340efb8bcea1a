//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers over audited implementations: Ed25519 via
//! `ed25519-dalek`, BLAKE3 and SHA-256 for digests. Signature checking of
//! operations happens at admission time; processors work with public keys
//! only.

pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, double_sha256, sha256, Hash};
pub use keys::{KeyError, NovaKeypair, NovaPublicKey, NovaSignature};
