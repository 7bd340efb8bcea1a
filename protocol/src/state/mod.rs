//! # Ledger State
//!
//! The engine never owns durable storage. It reads through a
//! [`StateReader`] and writes through a [`StateWriter`]; both are
//! implemented for plain closures so a host can wire in whatever store it
//! has.
//!
//! ```text
//! value.rs  — State (versioned record) and StateValue (hint-tagged value)
//! keys.rs   — state-key naming
//! amount.rs — AmountState: staged balance delta + fee
//! pool.rs   — StatePool: per-block overlay, atomic per-operation writes
//! memory.rs — MemoryStateStore: DashMap backing store
//! ```

pub mod amount;
pub mod keys;
pub mod memory;
pub mod pool;
pub mod value;

pub use amount::AmountState;
pub use memory::MemoryStateStore;
pub use pool::{StatePool, StateUpdate};
pub use value::{State, StateValue};

use thiserror::Error;

use crate::crypto::Hash;
use crate::types::CurrencyId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The backing store failed.
    #[error("state store error: {0}")]
    Store(String),

    /// A value was required but the key holds nothing.
    #[error("state {0} is blank")]
    Blank(String),

    #[error("state {key}: expected {expected}, found {found}")]
    ValueMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("state {key}: expected currency {expected}, found {found}")]
    CurrencyMismatch {
        key: String,
        expected: CurrencyId,
        found: CurrencyId,
    },

    #[error("operation {0} already committed")]
    AlreadyCommitted(Hash),
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Point lookup. `Ok(None)` means the key was never written.
pub trait StateReader {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError>;
}

impl<F> StateReader for F
where
    F: Fn(&str) -> Result<Option<State>, StateError>,
{
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        self(key)
    }
}

/// Atomic write of one operation's updates, tagged with its hash.
pub trait StateWriter {
    fn set_state(&self, op_hash: &Hash, updates: Vec<StateUpdate>) -> Result<(), StateError>;
}

impl<F> StateWriter for F
where
    F: Fn(&Hash, Vec<StateUpdate>) -> Result<(), StateError>,
{
    fn set_state(&self, op_hash: &Hash, updates: Vec<StateUpdate>) -> Result<(), StateError> {
        self(op_hash, updates)
    }
}

/// Fetch `key`, or a blank state if it was never written.
pub fn get_or_blank(reader: &dyn StateReader, key: &str) -> Result<State, StateError> {
    Ok(reader
        .get_state(key)?
        .unwrap_or_else(|| State::blank(key.to_string())))
}
