//! # Currency Registry and Fee Policies
//!
//! ```text
//! feeer.rs  — Feeer: nil / fixed / ratio fee policies
//! policy.rs — CurrencyPolicy, CurrencyDesign
//! pool.rs   — CurrencyPool: read-mostly registry of known currencies
//! fee.rs    — per-currency fee aggregation for multi-item operations
//! ```

pub mod fee;
pub mod feeer;
pub mod policy;
pub mod pool;

pub use fee::{calculate_items_fee, RequiredAmount};
pub use feeer::{Feeer, FixedFeeer, RatioFeeer};
pub use policy::{CurrencyDesign, CurrencyPolicy};
pub use pool::CurrencyPool;

use thiserror::Error;

use crate::types::CurrencyId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("unknown currency, {0}")]
    UnknownCurrency(CurrencyId),
}
