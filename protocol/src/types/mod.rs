//! # Ledger Types
//!
//! The vocabulary of the currency engine: balances, currency ids, amounts,
//! addresses and the keys that control accounts.
//!
//! ```text
//! big.rs          — Big: signed arbitrary-precision integer
//! currency_id.rs  — CurrencyId: validated currency token
//! amount.rs       — Amount: Big + CurrencyId
//! address.rs      — Address: derived from keys, plus per-currency zero address
//! account_keys.rs — AccountKey / AccountKeys + threshold check
//! suffrage.rs     — governance quorum over node keys
//! account.rs      — Account: address + keys
//! ```
//!
//! Everything here is immutable once constructed and validated by its
//! constructor or `is_valid`.

pub mod account;
pub mod account_keys;
pub mod address;
pub mod amount;
pub mod big;
pub mod currency_id;
pub mod suffrage;

pub use account::Account;
pub use account_keys::{check_threshold, AccountKey, AccountKeys, SignError};
pub use address::Address;
pub use amount::Amount;
pub use big::Big;
pub use currency_id::CurrencyId;
pub use suffrage::Suffrage;
