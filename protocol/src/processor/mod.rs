//! # Operation Processing
//!
//! Every operation kind is handled by a [`Processor`] that runs in two
//! phases:
//!
//! ```text
//! pre_process(op, reader)  — read-only; every check that needs live state;
//!                            stages exactly what commit will write
//! process(writer)          — derive the final updates from the staged data
//!                            and hand them to the writer in one call
//! ```
//!
//! A failure in `pre_process` rejects the operation and the block carries
//! on. A failure in `process` means `pre_process` missed something and is
//! treated as fatal.
//!
//! The [`OperationProcessor`] drives processors for one block: it looks up
//! the factory for each operation kind in a [`ProcessorRegistry`], enforces
//! the one-sender-per-block rule, recycles processor objects and totals
//! collected fees into a synthetic fee operation when the block finishes.

pub mod create_accounts;
pub mod currency_policy_updater;
pub mod currency_register;
pub mod error;
pub mod fee;
pub mod genesis_currencies;
pub mod helpers;
pub mod key_updater;
pub mod orchestrator;
pub mod registry;
pub mod suffrage_inflation;
#[cfg(test)]
pub(crate) mod testing;
pub mod transfers;

use std::sync::Arc;

pub use create_accounts::CreateAccountsProcessor;
pub use currency_policy_updater::CurrencyPolicyUpdaterProcessor;
pub use currency_register::CurrencyRegisterProcessor;
pub use error::{ProcessError, RejectReason};
pub use fee::FeeProcessor;
pub use genesis_currencies::GenesisCurrenciesProcessor;
pub use key_updater::KeyUpdaterProcessor;
pub use orchestrator::{
    AbortHandle, DuplicationKey, OperationProcessor, ProcessResult, RejectedOperation,
};
pub use registry::{ProcessorFactory, ProcessorRegistry};
pub use suffrage_inflation::SuffrageInflationProcessor;
pub use transfers::TransfersProcessor;

use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{StateReader, StateWriter};

/// Two-phase state transition for one operation kind.
///
/// A processor is reused across operations: [`Processor::close`] must drop
/// everything staged and leave it ready for the next `pre_process`, even
/// if `pre_process` failed halfway or never ran.
pub trait Processor: Send {
    fn kind(&self) -> OperationKind;

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError>;

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError>;

    fn close(&mut self);
}

/// Shared context handed to every processor factory.
#[derive(Clone)]
pub struct ProcessorContext {
    pub currency_pool: Arc<CurrencyPool>,
}

impl ProcessorContext {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self { currency_pool }
    }
}

/// `process` was called without a successful `pre_process`.
pub(crate) fn not_prepared(kind: OperationKind) -> ProcessError {
    ProcessError::Fatal(format!("{kind} processor not prepared"))
}
