//! Currency policy updater processor. Replaces the policy inside the stored
//! design; amount, genesis account and aggregate supply are kept.

use std::sync::Arc;

use tracing::debug;

use super::error::ProcessError;
use super::helpers::{
    check_not_zero_account, check_suffrage_signs, ensure_currency, exists_state, wrong_operation,
};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, State, StateReader, StateUpdate, StateWriter};
use crate::types::Suffrage;

const KIND: OperationKind = OperationKind::CurrencyPolicyUpdater;

struct Staged {
    op_hash: Hash,
    design: State,
}

pub struct CurrencyPolicyUpdaterProcessor {
    currency_pool: Arc<CurrencyPool>,
    suffrage: Arc<Suffrage>,
    staged: Option<Staged>,
}

impl CurrencyPolicyUpdaterProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>, suffrage: Arc<Suffrage>) -> Self {
        Self {
            currency_pool,
            suffrage,
            staged: None,
        }
    }
}

impl Processor for CurrencyPolicyUpdaterProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::CurrencyPolicyUpdater(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        check_suffrage_signs(KIND, &self.suffrage, op.signers())?;
        ensure_currency(KIND, &self.currency_pool, fact.currency())?;

        if let Some(receiver) = fact.policy().feeer().receiver() {
            check_not_zero_account(KIND, receiver, fact.currency())?;
            exists_state(KIND, reader, &keys::account(receiver), "fee receiver account")?;
        }

        let st = exists_state(
            KIND,
            reader,
            &keys::currency_design(fact.currency()),
            "currency design",
        )?;
        let design = st.currency_design_value()?.with_policy(fact.policy().clone());

        debug!(op_hash = %op.hash(), currency = %fact.currency(), "currency policy updater pre-processed");

        self.staged = Some(Staged {
            op_hash: op.hash(),
            design: st.with_value(design),
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        writer.set_state(&staged.op_hash, vec![StateUpdate::from(staged.design)])?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
