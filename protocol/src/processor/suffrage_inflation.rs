//! Suffrage inflation processor: mints new supply straight into receiver
//! balances and raises each currency's aggregate by the minted total.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::error::ProcessError;
use super::helpers::{
    check_not_zero_account, check_suffrage_signs, ensure_currency, exists_state, receiver_balance,
    wrong_operation,
};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, AmountState, State, StateReader, StateUpdate, StateWriter};
use crate::types::{Big, CurrencyId, Suffrage};

const KIND: OperationKind = OperationKind::SuffrageInflation;

struct Staged {
    op_hash: Hash,
    receivers: Vec<AmountState>,
    designs: Vec<State>,
}

pub struct SuffrageInflationProcessor {
    currency_pool: Arc<CurrencyPool>,
    suffrage: Arc<Suffrage>,
    staged: Option<Staged>,
}

impl SuffrageInflationProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>, suffrage: Arc<Suffrage>) -> Self {
        Self {
            currency_pool,
            suffrage,
            staged: None,
        }
    }
}

impl Processor for SuffrageInflationProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::SuffrageInflation(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        check_suffrage_signs(KIND, &self.suffrage, op.signers())?;

        let mut minted: BTreeMap<CurrencyId, Big> = BTreeMap::new();
        let mut receivers = Vec::with_capacity(fact.items().len());
        for item in fact.items() {
            let am = item.amount();
            ensure_currency(KIND, &self.currency_pool, am.currency())?;
            check_not_zero_account(KIND, item.receiver(), am.currency())?;
            exists_state(KIND, reader, &keys::account(item.receiver()), "receiver account")?;

            let rb = receiver_balance(reader, item.receiver(), am.currency())?;
            receivers.push(rb.add(am.big()));

            let total = minted.entry(am.currency().clone()).or_insert_with(Big::zero);
            *total = total.add(am.big());
        }

        let mut designs = Vec::with_capacity(minted.len());
        for (cid, total) in &minted {
            let st = exists_state(KIND, reader, &keys::currency_design(cid), "currency design")?;
            let design = st.currency_design_value()?.add_aggregate(total);
            designs.push(st.with_value(design));
        }

        debug!(
            op_hash = %op.hash(),
            items = fact.items().len(),
            currencies = minted.len(),
            "suffrage inflation pre-processed"
        );

        self.staged = Some(Staged {
            op_hash: op.hash(),
            receivers,
            designs,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        let mut updates: Vec<StateUpdate> =
            staged.receivers.into_iter().map(StateUpdate::from).collect();
        updates.extend(staged.designs.into_iter().map(StateUpdate::from));
        writer.set_state(&staged.op_hash, updates)?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
