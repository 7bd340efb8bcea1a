//! Fee processor: pays the fees collected in a block to each currency's
//! fee receiver. Fees of a policy without a receiver are burned.

use std::sync::Arc;

use tracing::debug;

use super::error::ProcessError;
use super::helpers::{ensure_currency, receiver_balance, wrong_operation};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{AmountState, StateReader, StateUpdate, StateWriter};

const KIND: OperationKind = OperationKind::Fee;

struct Staged {
    op_hash: Hash,
    credits: Vec<AmountState>,
}

pub struct FeeProcessor {
    currency_pool: Arc<CurrencyPool>,
    staged: Option<Staged>,
}

impl FeeProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self {
            currency_pool,
            staged: None,
        }
    }
}

impl Processor for FeeProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::Fee(op) = op else {
            return Err(wrong_operation(KIND, op));
        };

        let mut credits = Vec::new();
        for am in op.fact().amounts() {
            if !am.big().over_zero() {
                continue;
            }
            ensure_currency(KIND, &self.currency_pool, am.currency())?;
            let Some(feeer) = self.currency_pool.feeer(am.currency()) else {
                continue;
            };
            let Some(receiver) = feeer.receiver() else {
                debug!(currency = %am.currency(), fee = %am.big(), "fee burned, no receiver");
                continue;
            };
            let rb = receiver_balance(reader, receiver, am.currency())?;
            credits.push(rb.add(am.big()));
        }

        self.staged = Some(Staged {
            op_hash: op.hash(),
            credits,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        let updates = staged.credits.into_iter().map(StateUpdate::from).collect();
        writer.set_state(&staged.op_hash, updates)?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
