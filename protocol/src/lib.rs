// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Currency — Operation Processing Engine
//!
//! The ledger core that turns signed currency operations into state
//! writes: account creation, transfers, key rotation, currency
//! registration and policy updates, suffrage inflation, and the genesis
//! bootstrap. Consensus, networking and persistence live in the host; this
//! crate only sees `get_state`/`set_state` callbacks.
//!
//! ## Architecture
//!
//! - **types** — `Big` balances, currency ids, addresses, weighted keys.
//! - **currency** — fee policies, currency designs and the currency pool.
//! - **state** — state values and keys, staged balance deltas, the
//!   per-block overlay.
//! - **operation** — signed facts for every operation kind.
//! - **processor** — two-phase processors and the block orchestrator.
//! - **crypto** — hashes and Ed25519 keys.
//! - **config** / **logging** / **error** — the ambient pieces.
//!
//! ## Block lifecycle
//!
//! ```text
//! StatePool::new(store, height)
//!   -> OperationProcessor::new(pool, currencies, registry, config)
//!   -> process / process_batch  (rejected ops skipped, fatal errors abort)
//!   -> finish()                 (fee operation, currency pool refresh)
//!   -> host persists pool.updated()
//! ```

pub mod config;
pub mod crypto;
pub mod currency;
pub mod error;
pub mod logging;
pub mod operation;
pub mod processor;
pub mod state;
pub mod types;

pub use config::ProcessorConfig;
pub use error::{ValidationError, ValidationResult};
pub use operation::{Operation, OperationKind};
pub use processor::{OperationProcessor, ProcessError, ProcessResult, ProcessorRegistry};
pub use state::{MemoryStateStore, StatePool};
