//! Transfers processor.
//!
//! Every receiver must already have an account; its balance in the moved
//! currency may still be blank. The sender is debited once per currency for
//! the sum of everything moved plus fees.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::error::ProcessError;
use super::helpers::{
    check_account_signs, check_enough_balance, check_not_zero_account, debit_sender, exists_state,
    receiver_balance, wrong_operation,
};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::{calculate_items_fee, CurrencyPool, RequiredAmount};
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, AmountState, StateReader, StateUpdate, StateWriter};
use crate::types::CurrencyId;

const KIND: OperationKind = OperationKind::Transfers;

struct Staged {
    op_hash: Hash,
    receivers: Vec<AmountState>,
    sender_balances: BTreeMap<CurrencyId, AmountState>,
    required: BTreeMap<CurrencyId, RequiredAmount>,
}

pub struct TransfersProcessor {
    currency_pool: Arc<CurrencyPool>,
    staged: Option<Staged>,
}

impl TransfersProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self {
            currency_pool,
            staged: None,
        }
    }
}

impl Processor for TransfersProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::Transfers(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        check_account_signs(KIND, reader, fact.sender(), op.signers())?;

        let required = calculate_items_fee(Some(self.currency_pool.as_ref()), fact.amounts())
            .map_err(|e| ProcessError::rejected(KIND, e))?;

        let mut receivers = Vec::new();
        for item in fact.items() {
            exists_state(KIND, reader, &keys::account(item.receiver()), "receiver account")?;
            for am in item.amounts() {
                check_not_zero_account(KIND, item.receiver(), am.currency())?;
                let rb = receiver_balance(reader, item.receiver(), am.currency())?;
                receivers.push(rb.add(am.big()));
            }
        }

        let sender_balances = check_enough_balance(KIND, reader, fact.sender(), &required)?;

        debug!(
            op_hash = %op.hash(),
            sender = %fact.sender(),
            receivers = fact.items().len(),
            "transfers pre-processed"
        );

        self.staged = Some(Staged {
            op_hash: op.hash(),
            receivers,
            sender_balances,
            required,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;

        let mut updates: Vec<StateUpdate> = debit_sender(&staged.sender_balances, &staged.required)?
            .into_iter()
            .map(StateUpdate::from)
            .collect();
        updates.extend(staged.receivers.into_iter().map(StateUpdate::from));

        writer.set_state(&staged.op_hash, updates)?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
