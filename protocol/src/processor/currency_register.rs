//! Currency register processor.
//!
//! Commit writes four states: the currency design, the genesis account's
//! initial balance, and the currency's zero account with its zero balance.

use std::sync::Arc;

use tracing::debug;

use super::error::{ProcessError, RejectReason};
use super::helpers::{check_suffrage_signs, exists_state, not_exists_state, wrong_operation};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, State, StateReader, StateUpdate, StateWriter};
use crate::types::{Account, Address, Amount, Suffrage};

const KIND: OperationKind = OperationKind::CurrencyRegister;

struct Staged {
    op_hash: Hash,
    states: Vec<State>,
}

pub struct CurrencyRegisterProcessor {
    currency_pool: Arc<CurrencyPool>,
    suffrage: Arc<Suffrage>,
    staged: Option<Staged>,
}

impl CurrencyRegisterProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>, suffrage: Arc<Suffrage>) -> Self {
        Self {
            currency_pool,
            suffrage,
            staged: None,
        }
    }
}

impl Processor for CurrencyRegisterProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::CurrencyRegister(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let design = op.fact().currency();
        let cid = design.currency();

        check_suffrage_signs(KIND, &self.suffrage, op.signers())?;
        design
            .check_unminted()
            .map_err(|e| ProcessError::rejected(KIND, e))?;

        if self.currency_pool.exists(cid) {
            return Err(ProcessError::rejected(
                KIND,
                RejectReason::AlreadyExists(format!("currency {cid}")),
            ));
        }

        let genesis = design.genesis_account().ok_or_else(|| {
            ProcessError::rejected(KIND, RejectReason::NotFound(format!("genesis account of {cid}")))
        })?;
        exists_state(KIND, reader, &keys::account(genesis), "genesis account")?;
        if let Some(receiver) = design.policy().feeer().receiver() {
            exists_state(KIND, reader, &keys::account(receiver), "fee receiver account")?;
        }

        let zero = Address::zero(cid);
        let design_st = not_exists_state(KIND, reader, &keys::currency_design(cid), "currency design")?;
        let genesis_balance =
            not_exists_state(KIND, reader, &keys::balance(genesis, cid), "genesis balance")?;
        let zero_account = not_exists_state(KIND, reader, &keys::account(&zero), "zero account")?;
        let zero_balance = not_exists_state(KIND, reader, &keys::balance(&zero, cid), "zero balance")?;

        debug!(op_hash = %op.hash(), currency = %cid, genesis = %genesis, "currency register pre-processed");

        self.staged = Some(Staged {
            op_hash: op.hash(),
            states: vec![
                design_st.with_value(design.clone()),
                genesis_balance.with_value(design.amount().clone()),
                zero_account.with_value(Account::zero(cid)),
                zero_balance.with_value(Amount::zero(cid.clone())),
            ],
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        let updates = staged.states.into_iter().map(StateUpdate::from).collect();
        writer.set_state(&staged.op_hash, updates)?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
