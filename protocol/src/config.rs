//! # Protocol Configuration & Constants
//!
//! Every limit the currency engine enforces lives here. These values are
//! consensus-critical: two nodes with different limits will disagree about
//! which operations are valid, so changing them is a hard fork.
//!
//! Runtime knobs that do not affect validity (pool sizes, parallelism) live
//! in [`ProcessorConfig`], which hosts load from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Currency Identifiers
// ---------------------------------------------------------------------------

/// Shortest allowed currency id.
pub const MIN_CURRENCY_ID_LENGTH: usize = 3;

/// Longest allowed currency id.
pub const MAX_CURRENCY_ID_LENGTH: usize = 10;

/// Characters allowed between the first and last character of a currency
/// id, in addition to `A-Z` and `0-9`.
pub const CURRENCY_ID_INNER_SYMBOLS: &str = "_.!$*+@";

// ---------------------------------------------------------------------------
// Account Keys
// ---------------------------------------------------------------------------

/// Maximum number of keys in one account key set.
pub const MAX_ACCOUNT_KEYS: usize = 10;

/// Lowest key weight and lowest threshold.
pub const MIN_KEY_WEIGHT: u32 = 1;

/// Highest key weight and highest threshold.
pub const MAX_KEY_WEIGHT: u32 = 100;

// ---------------------------------------------------------------------------
// Addresses & State Keys
// ---------------------------------------------------------------------------

/// Every currency account address ends with this suffix.
pub const ADDRESS_SUFFIX: &str = "mca";

/// Longest address string, suffix included.
pub const MAX_ADDRESS_LENGTH: usize = 100;

/// Infix between a currency id and the address suffix for the per-currency
/// zero account, e.g. `MONEY-Xmca`.
pub const ZERO_ADDRESS_INFIX: &str = "-X";

/// State key suffix of account (keys) states: `<address>-account`.
pub const STATE_KEY_ACCOUNT_SUFFIX: &str = "-account";

/// State key infix of balance states: `<address>-balance-<currency>`.
pub const STATE_KEY_BALANCE_INFIX: &str = "-balance-";

/// State key suffix of currency design states: `<currency>-currencydesign`.
pub const STATE_KEY_CURRENCY_DESIGN_SUFFIX: &str = "-currencydesign";

// ---------------------------------------------------------------------------
// Operation Limits
// ---------------------------------------------------------------------------

/// Longest fact token in bytes.
pub const MAX_TOKEN_SIZE: usize = 100;

/// Longest memo in bytes. Enough for a payment reference, not for a novel.
pub const MAX_MEMO_LENGTH: usize = 512;

/// Items per create-accounts fact.
pub const MAX_CREATE_ACCOUNTS_ITEMS: usize = 10;

/// Items per transfers fact.
pub const MAX_TRANSFER_ITEMS: usize = 10;

/// Items per suffrage-inflation fact.
pub const MAX_SUFFRAGE_INFLATION_ITEMS: usize = 10;

/// Distinct currencies carried by one create-accounts or transfers item.
pub const MAX_AMOUNTS_PER_ITEM: usize = 10;

// ---------------------------------------------------------------------------
// ProcessorConfig
// ---------------------------------------------------------------------------

/// Runtime configuration for the operation processor.
///
/// None of these values change which operations are valid; they tune how
/// the orchestrator does its work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Network id mixed into every signed message, so signatures from one
    /// network never verify on another.
    pub network_id: Vec<u8>,

    /// Recycled processors kept per operation kind.
    pub max_recycled_processors: usize,

    /// Batches smaller than this are pre-processed sequentially.
    pub parallel_threshold: usize,

    /// Whether `finish()` builds and processes the synthetic fee operation.
    pub emit_fee_operation: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            network_id: b"nova-devnet".to_vec(),
            max_recycled_processors: 64,
            parallel_threshold: 4,
            emit_fee_operation: true,
        }
    }
}

impl ProcessorConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidFormat(format!("processor config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.network_id.is_empty() {
            return Err(ValidationError::invalid("processor config", "empty network id"));
        }
        if self.parallel_threshold == 0 {
            return Err(ValidationError::invalid(
                "processor config",
                "parallel threshold must be at least 1",
            ));
        }
        Ok(())
    }
}
