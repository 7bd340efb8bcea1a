//! Genesis currencies processor.
//!
//! Runs once, on an empty store. Writes the genesis account and, for every
//! design in the fact, the design itself (bound to the genesis account), the
//! genesis balance holding the full initial supply, and the currency's zero
//! account and zero balance.

use std::sync::Arc;

use tracing::{debug, info};

use super::error::{ProcessError, RejectReason};
use super::helpers::{exists_state, not_exists_state, wrong_operation};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, State, StateReader, StateUpdate, StateWriter};
use crate::types::{Account, Address, Amount};

const KIND: OperationKind = OperationKind::GenesisCurrencies;

struct Staged {
    op_hash: Hash,
    states: Vec<State>,
}

pub struct GenesisCurrenciesProcessor {
    currency_pool: Arc<CurrencyPool>,
    staged: Option<Staged>,
}

impl GenesisCurrenciesProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self {
            currency_pool,
            staged: None,
        }
    }
}

impl Processor for GenesisCurrenciesProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::GenesisCurrencies(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        match op.signs() {
            [only] if only.signer() == fact.genesis_node_key() => {}
            _ => {
                return Err(ProcessError::rejected(
                    KIND,
                    RejectReason::Unauthorized(
                        "genesis currencies must be signed by the genesis node key alone".into(),
                    ),
                ))
            }
        }

        let genesis = fact.genesis_address();
        let account = not_exists_state(KIND, reader, &keys::account(&genesis), "genesis account")?;
        let mut states = vec![account.with_value(Account::from_keys(fact.keys().clone()))];

        for design in fact.currencies() {
            let cid = design.currency();
            design
                .check_unminted()
                .map_err(|e| ProcessError::rejected(KIND, e))?;
            if self.currency_pool.exists(cid) {
                return Err(ProcessError::rejected(
                    KIND,
                    RejectReason::AlreadyExists(format!("currency {cid}")),
                ));
            }
            if let Some(receiver) = design.policy().feeer().receiver() {
                if receiver != &genesis {
                    exists_state(KIND, reader, &keys::account(receiver), "fee receiver account")?;
                }
            }

            let zero = Address::zero(cid);
            let design_st =
                not_exists_state(KIND, reader, &keys::currency_design(cid), "currency design")?;
            let balance =
                not_exists_state(KIND, reader, &keys::balance(&genesis, cid), "genesis balance")?;
            let zero_account =
                not_exists_state(KIND, reader, &keys::account(&zero), "zero account")?;
            let zero_balance =
                not_exists_state(KIND, reader, &keys::balance(&zero, cid), "zero balance")?;

            states.push(design_st.with_value(design.with_genesis_account(genesis.clone())));
            states.push(balance.with_value(design.amount().clone()));
            states.push(zero_account.with_value(Account::zero(cid)));
            states.push(zero_balance.with_value(Amount::zero(cid.clone())));
        }

        debug!(
            op_hash = %op.hash(),
            genesis = %genesis,
            currencies = fact.currencies().len(),
            "genesis currencies pre-processed"
        );

        self.staged = Some(Staged {
            op_hash: op.hash(),
            states,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        let count = staged.states.len();
        let updates = staged.states.into_iter().map(StateUpdate::from).collect();
        writer.set_state(&staged.op_hash, updates)?;
        info!(op_hash = %staged.op_hash, states = count, "genesis states written");
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
